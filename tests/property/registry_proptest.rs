//! Connection registry properties

use chrono::TimeDelta;
use proptest::prelude::*;
use std::collections::HashMap;

use crate::common::{credential_for, MockConnection};
use task_social::backend::realtime::ConnectionRegistry;

const USERS: &[&str] = &["alice", "bob", "carol", "dave"];

fn user() -> impl Strategy<Value = &'static str> {
    prop::sample::select(USERS)
}

proptest! {
    #[test]
    fn last_add_wins_and_replaced_handles_are_closed(users in prop::collection::vec(user(), 1..40)) {
        let registry = ConnectionRegistry::new();
        let mut handles = Vec::new();
        let mut latest: HashMap<&str, u64> = HashMap::new();

        for (label, user_id) in users.iter().enumerate() {
            let handle = MockConnection::labeled(label as u64);
            registry.add(*user_id, handle.clone(), credential_for(user_id, TimeDelta::hours(1)));
            handles.push(handle);
            latest.insert(*user_id, label as u64);
        }

        prop_assert_eq!(registry.len(), latest.len());
        for (user_id, label) in &latest {
            prop_assert_eq!(registry.get(user_id).map(|h| h.label()), Some(*label));
        }
        for handle in &handles {
            let current = latest.values().any(|label| *label == handle.label());
            prop_assert_eq!(handle.is_closed(), !current);
        }
    }

    #[test]
    fn lookup_skips_absent_users_and_dedupes(
        registered in prop::collection::hash_set(user(), 0..4),
        requested in prop::collection::vec(user(), 0..16),
    ) {
        let registry = ConnectionRegistry::new();
        for user_id in &registered {
            registry.add(*user_id, MockConnection::new(), credential_for(user_id, TimeDelta::hours(1)));
        }

        let found: Vec<String> = registry.lookup(requested.as_slice()).into_iter().map(|r| r.user_id).collect();

        let mut expected: Vec<String> = Vec::new();
        for user_id in &requested {
            if registered.contains(user_id) && !expected.iter().any(|u| u == user_id) {
                expected.push(user_id.to_string());
            }
        }
        prop_assert_eq!(found, expected);
    }
}
