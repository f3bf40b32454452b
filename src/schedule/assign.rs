use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::types::{CommitBatch, WorkItem};

/// Largest number of items moved into a single batch at once.
const MAX_SLICE: usize = 5;

/// Fill batch skeletons with work items, keeping related items together.
///
/// Items are grouped by `(kind, category)` in first-seen order. Groups are
/// visited round-robin, and each skeleton in turn receives one slice of
/// `1..=min(5, group_len)` items from the current group, so items from the
/// same logical unit tend to land in the same commit. The slice length is the
/// only random draw, which makes the whole assignment deterministic under a
/// seed.
///
/// Skeletons that would receive zero items are dropped: every returned batch
/// carries at least one item. The grouping is a realism heuristic, not a
/// correctness requirement.
pub fn assign(
    items: &[WorkItem],
    skeletons: Vec<CommitBatch>,
    seed: Option<u64>,
) -> Vec<CommitBatch> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut groups = group_items(items);
    let mut filled = Vec::with_capacity(skeletons.len());
    let mut cursor = 0usize;

    for mut skeleton in skeletons {
        let Some(group_index) = next_non_empty(&groups, cursor) else {
            // All groups exhausted; remaining skeletons stay empty and are
            // dropped.
            break;
        };
        cursor = group_index + 1;

        let group = &mut groups[group_index].1;
        let take = rng.gen_range(1..=group.len().min(MAX_SLICE));
        skeleton.items = group.drain(..take).collect();
        filled.push(skeleton);
    }

    debug!(
        batches = filled.len(),
        leftover = groups.iter().map(|(_, g)| g.len()).sum::<usize>(),
        "work items assigned"
    );
    filled
}

/// Group items by `(kind, category)`, preserving the order in which each
/// group was first seen.
fn group_items(items: &[WorkItem]) -> Vec<((String, String), Vec<WorkItem>)> {
    let mut groups: Vec<((String, String), Vec<WorkItem>)> = Vec::new();
    for item in items {
        let key = (item.kind.clone(), item.category.clone());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(item.clone()),
            None => groups.push((key, vec![item.clone()])),
        }
    }
    groups
}

/// Index of the next non-empty group at or after `cursor`, wrapping around.
fn next_non_empty(
    groups: &[((String, String), Vec<WorkItem>)],
    cursor: usize,
) -> Option<usize> {
    if groups.is_empty() {
        return None;
    }
    (0..groups.len())
        .map(|offset| (cursor + offset) % groups.len())
        .find(|&index| !groups[index].1.is_empty())
}
