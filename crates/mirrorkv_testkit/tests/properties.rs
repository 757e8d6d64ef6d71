//! Property tests for `CachedStore` rollback and bulk-operation semantics.

use mirrorkv_core::{decode_mirror, CoreResult, Mirror, STORE_KEY};
use mirrorkv_testkit::prelude::*;
use proptest::prelude::*;

fn apply(store: &mut MemoryStore, op: &StoreOperation) -> CoreResult<()> {
    match op {
        StoreOperation::Set { key, value } => store.set(key, value.clone()),
        StoreOperation::Delete { key } => store.delete(key),
        StoreOperation::Reconcile { template } => store.reconcile(template).map(|_| ()),
        StoreOperation::Clear => store.clear(),
    }
}

fn apply_model(model: &mut Mirror<String>, op: &StoreOperation) {
    match op {
        StoreOperation::Set { key, value } => {
            model.insert(key.clone(), value.clone());
        }
        StoreOperation::Delete { key } => {
            model.remove(key);
        }
        StoreOperation::Reconcile { template } => {
            for (key, value) in template {
                model.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        StoreOperation::Clear => model.clear(),
    }
}

fn persisted(fixture: &TestStore) -> Option<Mirror<String>> {
    fixture
        .backend
        .record(STORE_KEY)
        .map(|bytes| decode_mirror(&bytes).unwrap())
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn failed_mutations_leave_mirror_unchanged(
        seed in mirror_strategy(8),
        steps in prop::collection::vec((store_operation_strategy(), any::<bool>()), 1..24),
    ) {
        let mut fixture = TestStore::seeded("prop", &seed);
        let mut model = seed;

        for (op, fail) in &steps {
            fixture.backend.fail_writes(*fail);
            let before = fixture.entries().unwrap();
            let result = apply(&mut fixture.store, op);

            match &result {
                Ok(()) => {
                    prop_assert!(!fail);
                    apply_model(&mut model, op);
                }
                Err(err) if err.is_not_found() => {
                    let is_delete = matches!(op, StoreOperation::Delete { .. });
                    prop_assert!(is_delete);
                }
                Err(err) => {
                    prop_assert!(err.is_persistence());
                    prop_assert!(*fail);
                    prop_assert_eq!(&fixture.entries().unwrap(), &before);
                }
            }

            prop_assert_eq!(&fixture.entries().unwrap(), &model);
            prop_assert_eq!(persisted(&fixture), Some(model.clone()));
        }
    }

    #[test]
    fn fallback_get_matches_set_outcome(
        seed in mirror_strategy(6),
        key in key_strategy(),
        fallback in value_strategy(),
        fail in any::<bool>(),
    ) {
        prop_assume!(!seed.contains_key(&key));
        let mut fixture = TestStore::seeded("prop", &seed);
        fixture.backend.fail_writes(fail);

        let result = fixture.get(&key, Some(fallback.clone()));

        if fail {
            prop_assert!(result.unwrap_err().is_not_found());
            prop_assert!(!fixture.has(&key).unwrap());
        } else {
            prop_assert_eq!(result.unwrap(), fallback);
            prop_assert!(fixture.has(&key).unwrap());
        }
    }

    #[test]
    fn reconcile_never_overwrites(
        existing in mirror_strategy(8),
        template in mirror_strategy(8),
        fail in any::<bool>(),
    ) {
        let mut fixture = TestStore::seeded("prop", &existing);
        fixture.backend.fail_writes(fail);

        let result = fixture.reconcile(&template);
        let after = fixture.entries().unwrap();

        if fail {
            prop_assert!(result.unwrap_err().is_persistence());
            prop_assert_eq!(&after, &existing);
        } else {
            let added = result.unwrap();
            prop_assert_eq!(added, template.keys().filter(|k| !existing.contains_key(*k)).count());
            for (key, value) in &existing {
                prop_assert_eq!(after.get(key), Some(value));
            }
            for (key, value) in &template {
                if !existing.contains_key(key) {
                    prop_assert_eq!(after.get(key), Some(value));
                }
            }
        }
    }

    #[test]
    fn disconnected_store_refuses_without_mutating(
        seed in mirror_strategy(6),
        ops in operation_sequence_strategy(1, 12),
    ) {
        let mut fixture = TestStore::seeded("prop", &seed);
        fixture.disconnect().unwrap();
        let writes = fixture.backend.write_count();

        for op in &ops {
            let err = apply(&mut fixture.store, op).unwrap_err();
            prop_assert!(err.is_not_connected());
        }
        prop_assert!(fixture.get("a", Some("x".to_string())).unwrap_err().is_not_connected());
        prop_assert!(fixture.has("a").unwrap_err().is_not_connected());
        prop_assert_eq!(fixture.backend.write_count(), writes);

        fixture.reconnect().unwrap();
        prop_assert_eq!(fixture.entries().unwrap(), seed);
    }

    #[test]
    fn copy_from_with_wipe_is_exact(
        source in mirror_strategy(8),
        target in mirror_strategy(8),
    ) {
        let from = TestStore::seeded("from", &source);
        let mut to = TestStore::seeded("to", &target);

        to.copy_from(&from.store, true).unwrap();

        prop_assert_eq!(to.entries().unwrap(), source.clone());
        prop_assert_eq!(from.entries().unwrap(), source);
    }

    #[test]
    fn copy_from_without_wipe_merges(
        source in mirror_strategy(8),
        target in mirror_strategy(8),
    ) {
        let from = TestStore::seeded("from", &source);
        let mut to = TestStore::seeded("to", &target);

        to.copy_from(&from.store, false).unwrap();

        let mut expected = target;
        expected.extend(source);
        prop_assert_eq!(to.entries().unwrap(), expected);
    }
}
