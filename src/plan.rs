use crate::types::{Revision, Run};

/// Pair commits with labels positionally, stopping at the shorter list.
pub fn pair_revisions(commits: &[String], labels: &[String]) -> Vec<Revision> {
    commits
        .iter()
        .zip(labels)
        .map(|(id, label)| Revision {
            id: id.clone(),
            label: label.clone(),
        })
        .collect()
}

/// Enumerate every run: repetition-major, revision order preserved within each repetition.
pub fn plan_runs(revisions: &[Revision], repetitions: usize) -> impl Iterator<Item = Run<'_>> {
    (0..repetitions).flat_map(move |repetition| {
        revisions.iter().map(move |revision| Run {
            repetition,
            revision,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn run_count_is_repetitions_times_revisions() {
        let revisions = pair_revisions(&strings(&["a", "b", "c"]), &strings(&["A", "B", "C"]));
        assert_eq!(plan_runs(&revisions, 10).count(), 30);
    }

    #[test]
    fn order_is_repetition_major() {
        let revisions = pair_revisions(&strings(&["a", "b"]), &strings(&["A", "B"]));
        let labels: Vec<String> = plan_runs(&revisions, 2).map(|r| r.run_label()).collect();
        assert_eq!(labels, ["A0", "B0", "A1", "B1"]);
    }

    #[test]
    fn mismatched_lists_truncate_to_shorter() {
        let revisions = pair_revisions(&strings(&["a", "b", "c"]), &strings(&["A", "B"]));
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[1].id, "b");
        assert_eq!(plan_runs(&revisions, 3).count(), 6);

        let revisions = pair_revisions(&strings(&["a"]), &strings(&["A", "B"]));
        assert_eq!(revisions.len(), 1);
    }

    #[test]
    fn zero_repetitions_yields_nothing() {
        let revisions = pair_revisions(&strings(&["a"]), &strings(&["A"]));
        assert_eq!(plan_runs(&revisions, 0).count(), 0);
    }
}
