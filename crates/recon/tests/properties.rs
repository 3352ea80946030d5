// Property-based tests for join multiplicity and anti-join membership.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use payrecon_recon::keys::UTR_KEYS;
use payrecon_recon::{match_tables, normalize, Cell, Side, Table};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Small key alphabet so collisions and duplicates are common.
fn arb_key() -> impl Strategy<Value = Cell> {
    prop_oneof![
        4 => "[A-C][0-2]".prop_map(Cell::Text),
        1 => (0i64..3).prop_map(Cell::Int),
        1 => Just(Cell::Empty),
    ]
}

fn arb_table(name: &'static str, key: &'static str) -> impl Strategy<Value = Table> {
    prop::collection::vec((arb_key(), "[a-z]{0,3}"), 0..12).prop_map(move |rows| {
        Table::new(
            name,
            vec![key.to_string(), "payload".to_string()],
            rows.into_iter()
                .map(|(k, p)| vec![k, Cell::Text(p)])
                .collect(),
        )
        .unwrap()
    })
}

fn key_counts(t: &Table, col: usize) -> HashMap<Cell, usize> {
    let mut counts = HashMap::new();
    for row in t.rows() {
        *counts.entry(row[col].clone()).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn matched_count_is_sum_of_products(
        left in arb_table("l", "utr no"),
        right in arb_table("r", "utr"),
    ) {
        let out = match_tables(&left, &right, &UTR_KEYS).unwrap();
        let lc = key_counts(&left, 0);
        let rc = key_counts(&right, 0);
        let expected: usize = lc.iter().map(|(k, m)| m * rc.get(k).copied().unwrap_or(0)).sum();
        prop_assert_eq!(out.matched.len(), expected);
    }

    #[test]
    fn unmatched_never_contains_shared_keys(
        left in arb_table("l", "utr no"),
        right in arb_table("r", "utr"),
    ) {
        let out = match_tables(&left, &right, &UTR_KEYS).unwrap();
        let right_keys: HashSet<&Cell> = right.rows().iter().map(|r| &r[0]).collect();
        let left_keys: HashSet<&Cell> = left.rows().iter().map(|r| &r[0]).collect();

        for row in out.unmatched_left.rows() {
            prop_assert!(!right_keys.contains(&row[0]));
        }
        for row in out.unmatched_right.rows() {
            prop_assert!(!left_keys.contains(&row[0]));
        }

        // Every left row is either joined or unmatched, never both
        let joined_left = left.rows().iter().filter(|r| right_keys.contains(&r[0])).count();
        prop_assert_eq!(joined_left + out.unmatched_left.len(), left.len());
    }

    #[test]
    fn normalize_is_idempotent(names in prop::collection::hash_set("[ ]{0,2}[a-zA-Z]{1,4}[ ]{0,2}", 1..6)) {
        let columns: Vec<String> = names.into_iter().collect();
        let table = Table::with_columns("t", columns);
        if let Ok(once) = normalize(table, Side::Left) {
            let twice = normalize(once.clone(), Side::Left).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
