//! Property-based test generators using proptest.
//!
//! Provides strategies for keys, values, whole mirrors and sequences of
//! store operations.

use mirrorkv_core::Mirror;
use proptest::prelude::*;

/// Strategy for generating store keys.
///
/// Keys come from a small alphabet so generated operations collide often.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-f][a-f0-9]{0,3}").expect("Invalid regex")
}

/// Strategy for generating string values, including the empty string.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,16}").expect("Invalid regex")
}

/// Strategy for generating a mirror with up to `max_len` keys.
pub fn mirror_strategy(max_len: usize) -> impl Strategy<Value = Mirror<String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..=max_len)
}

/// A mutation against a `CachedStore<String, _>`.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Set a key
    Set {
        /// Key
        key: String,
        /// Value
        value: String,
    },
    /// Delete a key
    Delete {
        /// Key
        key: String,
    },
    /// Reconcile with a template
    Reconcile {
        /// Template mirror
        template: Mirror<String>,
    },
    /// Clear the store
    Clear,
}

/// Strategy for generating store operations.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| StoreOperation::Set { key, value }),
        2 => key_strategy().prop_map(|key| StoreOperation::Delete { key }),
        2 => mirror_strategy(6).prop_map(|template| StoreOperation::Reconcile { template }),
        1 => Just(StoreOperation::Clear),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn keys_are_short_and_lowercase(key in key_strategy()) {
            prop_assert!(!key.is_empty() && key.len() <= 4);
            prop_assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn mirrors_respect_size(mirror in mirror_strategy(5)) {
            prop_assert!(mirror.len() <= 5);
        }
    }
}
