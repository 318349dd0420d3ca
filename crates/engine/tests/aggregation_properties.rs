use chown_audit_engine::{aggregate, project, IdentityKind, OwnershipEvent};
use proptest::prelude::*;

fn event(key: &str, host: &str, local: &str) -> OwnershipEvent {
    OwnershipEvent {
        workspace_relative_path: format!("xml-data/build-dir/{key}"),
        identity_key: key.to_string(),
        identity_kind: IdentityKind::from_key(key),
        task_local_path: local.to_string(),
        source_host: host.to_string(),
    }
}

fn arb_event() -> impl Strategy<Value = OwnershipEvent> {
    let key = prop_oneof![
        Just("ABC-DEF-123"),
        Just("BEXP-SAFEAUTO-JOB1"),
        Just("DEP-456"),
        Just("121667592-127238147"),
    ];
    let host = prop_oneof![Just("agentA"), Just("agentB"), Just("agentC")];
    let local = "[a-c]{1,2}/[x-z]{1,2}";
    (key, host, local).prop_map(|(key, host, local)| event(key, host, &local))
}

proptest! {
    #[test]
    fn aggregation_ignores_event_order(
        (events, shuffled) in prop::collection::vec(arb_event(), 0..60)
            .prop_flat_map(|events| {
                let shuffled = Just(events.clone()).prop_shuffle();
                (Just(events), shuffled)
            })
    ) {
        let a = aggregate(events).unwrap();
        let b = aggregate(shuffled).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(project(&a, 3), project(&b, 3));
    }

    #[test]
    fn duplicated_events_change_nothing(events in prop::collection::vec(arb_event(), 1..40)) {
        let once = aggregate(events.clone()).unwrap();
        let twice = aggregate(events.iter().cloned().chain(events.clone())).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn capped_rows_account_for_every_path(events in prop::collection::vec(arb_event(), 1..60), max in 1usize..5) {
        let table = aggregate(events).unwrap();
        for (row, record) in project(&table, max).iter().zip(table.records()) {
            prop_assert!(row.local_paths.items.len() <= max);
            prop_assert_eq!(
                row.local_paths.items.len() + row.local_paths.more,
                record.local_paths.len()
            );
            prop_assert_eq!(row.identity_key(), record.identity_key.as_str());
        }
    }
}
