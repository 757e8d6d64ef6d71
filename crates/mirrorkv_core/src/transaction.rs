//! Mutation transactions.
//!
//! Every change to a store's mirror runs as a [`Mutation`]:
//! 1. `begin` takes a pre-image of the mirror
//! 2. the caller applies its change in place
//! 3. the change is persisted
//! 4. `commit` discards the pre-image, or `rollback` restores it exactly

use crate::store::Mirror;

/// State of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// Change applied in memory, outcome not yet known.
    Pending,
    /// Change persisted.
    Committed,
    /// Change reverted.
    RolledBack,
}

/// A single logical change to a mirror, with its pre-image.
#[derive(Debug)]
#[must_use = "a mutation must be committed or rolled back"]
pub struct Mutation<V> {
    action: String,
    pre_image: Mirror<V>,
    state: MutationState,
}

impl<V: Clone> Mutation<V> {
    /// Starts a mutation labelled `action`, snapshotting `mirror`.
    pub fn begin(action: impl Into<String>, mirror: &Mirror<V>) -> Self {
        Self {
            action: action.into(),
            pre_image: mirror.clone(),
            state: MutationState::Pending,
        }
    }

    /// Returns the action label.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the mirror as it was before the mutation.
    #[must_use]
    pub fn pre_image(&self) -> &Mirror<V> {
        &self.pre_image
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> MutationState {
        self.state
    }

    /// Marks the mutation as persisted and drops the pre-image.
    pub fn commit(mut self) -> MutationState {
        self.state = MutationState::Committed;
        self.state
    }

    /// Restores `mirror` to the pre-image.
    pub fn rollback(mut self, mirror: &mut Mirror<V>) -> MutationState {
        *mirror = std::mem::take(&mut self.pre_image);
        self.state = MutationState::RolledBack;
        self.state
    }
}
