//! Ingestion planning
//!
//! Computes, for one linked resource type, the patient IDs still requiring a
//! fetch: the universe of known patients minus those already represented in
//! persisted batches minus those confirmed to have no data.

use std::collections::HashSet;

/// Patient IDs still requiring a fetch for one resource type
///
/// Returns `universe − fetched − skipped`, sorted ascending. Per-ID fetches
/// are independent and idempotent, so ordering does not affect correctness;
/// a deterministic order keeps logs and tests reproducible.
pub fn missing_ids(
    universe: &HashSet<String>,
    fetched: &HashSet<String>,
    skipped: &HashSet<String>,
) -> Vec<String> {
    let mut missing: Vec<String> = universe
        .iter()
        .filter(|id| !fetched.contains(*id) && !skipped.contains(*id))
        .cloned()
        .collect();
    missing.sort();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fetched_and_skipped_are_both_subtracted() {
        // P1 already has a batch, P2 is on the skip list, only P3 remains
        let universe = ids(&["P1", "P2", "P3"]);
        let fetched = ids(&["P1"]);
        let skipped = ids(&["P2"]);

        assert_eq!(missing_ids(&universe, &fetched, &skipped), vec!["P3"]);
    }

    #[test]
    fn test_missing_is_disjoint_from_both_inputs() {
        let universe = ids(&["a", "b", "c", "d", "e"]);
        let fetched = ids(&["a", "c"]);
        let skipped = ids(&["b"]);

        let missing = missing_ids(&universe, &fetched, &skipped);
        for id in &missing {
            assert!(!fetched.contains(id));
            assert!(!skipped.contains(id));
        }
        assert_eq!(missing, vec!["d", "e"]);
    }

    #[test]
    fn test_empty_universe_yields_no_work() {
        assert!(missing_ids(&HashSet::new(), &ids(&["a"]), &ids(&["b"])).is_empty());
    }

    #[test]
    fn test_fully_covered_universe_yields_no_work() {
        let universe = ids(&["a", "b"]);
        assert!(missing_ids(&universe, &ids(&["a"]), &ids(&["b"])).is_empty());
    }

    #[test]
    fn test_output_is_sorted() {
        let universe = ids(&["z", "m", "a"]);
        assert_eq!(
            missing_ids(&universe, &HashSet::new(), &HashSet::new()),
            vec!["a", "m", "z"]
        );
    }
}
