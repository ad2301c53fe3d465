//! Id-set reconciliation shared by class rosters and group memberships.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::MembershipDiff;

/// De-duplicate while preserving first-seen order.
pub fn dedupe_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Compute added/removed/kept between the current membership and the
/// complete desired set. Order follows the input lists; comparison is
/// pure set membership.
pub fn diff_ids(current: &[Uuid], desired: &[Uuid]) -> MembershipDiff {
    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    let desired_set: HashSet<Uuid> = desired.iter().copied().collect();

    MembershipDiff {
        added: desired
            .iter()
            .copied()
            .filter(|id| !current_set.contains(id))
            .collect(),
        removed: current
            .iter()
            .copied()
            .filter(|id| !desired_set.contains(id))
            .collect(),
        kept: current
            .iter()
            .copied()
            .filter(|id| desired_set.contains(id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_preserves_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let deduped = dedupe_ids(vec![a, b, a, b, a]);
        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn diff_reports_added_removed_kept() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();

        // [A, B, C] -> [B, C, D]
        let diff = diff_ids(&[a, b, c], &[b, c, d]);
        assert_eq!(diff.added, vec![d]);
        assert_eq!(diff.removed, vec![a]);
        assert_eq!(diff.kept, vec![b, c]);
    }

    #[test]
    fn diff_of_identical_sets_is_all_kept() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let diff = diff_ids(&[a, b], &[b, a]);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.kept.len(), 2);
    }

    #[test]
    fn diff_from_empty_is_all_added() {
        let a = Uuid::new_v4();
        let diff = diff_ids(&[], &[a]);
        assert_eq!(diff.added, vec![a]);
        assert!(diff.removed.is_empty());
        assert!(diff.kept.is_empty());
    }
}
