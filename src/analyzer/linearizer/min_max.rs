//! Greedy linearization that, within each "first overlap group" of
//! not-yet-placed removes, picks the one whose matching insert has the
//! fewest still-pending inserts unambiguously ahead of it — the same
//! minimal-cost selection the FIFO cost functions in [`super::super::cost`]
//! score after the fact, used here to *construct* a low-cost order instead
//! of just grading one.
//!
//! Unlike a scheme that caches each candidate's cost and decrements it as
//! competing operations are consumed, this recomputes every candidate's
//! cost against the current pending set on every round. It costs more
//! work, but there is no stale cache to invalidate and nothing to get
//! wrong when two removes in the same group are resolved out of order.

use crate::analyzer::operation::{OpType, Operation};

pub fn linearize(ops: &[Operation]) -> Vec<usize> {
    let n = ops.len();
    let mut selected = vec![false; n];
    let mut order = Vec::with_capacity(n);

    loop {
        let mut pending_removes: Vec<usize> =
            (0..n).filter(|&i| !selected[i] && ops[i].op_type == OpType::Remove).collect();
        if pending_removes.is_empty() {
            break;
        }
        pending_removes.sort_by_key(|&i| ops[i].start);

        let mut group_end = ops[pending_removes[0]].end;
        let mut group: Vec<usize> = Vec::new();
        for &i in &pending_removes {
            if ops[i].start > group_end {
                break;
            }
            group_end = group_end.min(ops[i].end);
            group.push(i);
        }

        let best = *group
            .iter()
            .min_by_key(|&&i| (remaining_cost(ops, &selected, i), ops[i].start))
            .expect("group is non-empty");

        select(ops, &mut selected, &mut order, best);
    }

    let mut leftover: Vec<usize> = (0..n).filter(|&i| !selected[i]).collect();
    leftover.sort_by_key(|&i| ops[i].start);
    order.extend(leftover);

    order
}

fn select(ops: &[Operation], selected: &mut [bool], order: &mut Vec<usize>, remove_idx: usize) {
    if let Some(matching_id) = ops[remove_idx].matching {
        if let Some(insert_idx) = ops.iter().position(|o| o.id == matching_id) {
            if !selected[insert_idx] {
                selected[insert_idx] = true;
                order.push(insert_idx);
            }
        }
    }
    selected[remove_idx] = true;
    order.push(remove_idx);
}

fn remaining_cost(ops: &[Operation], selected: &[bool], remove_idx: usize) -> usize {
    let remove = &ops[remove_idx];
    let matching_id = remove.matching;
    let anchor_start = matching_id
        .and_then(|id| ops.iter().find(|o| o.id == id))
        .map(|insert| insert.start)
        .unwrap_or(remove.start);

    ops.iter()
        .enumerate()
        .filter(|&(i, o)| !selected[i] && o.op_type == OpType::Insert && Some(o.id) != matching_id)
        .filter(|&(_, o)| o.end < anchor_start)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(id: u64, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, OpType::Insert, value, start, end, end, false)
    }

    fn remove(id: u64, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, OpType::Remove, value, start, end, end, false)
    }

    #[test]
    fn strict_fifo_round_trip_stays_in_order() {
        let mut ops = vec![insert(0, 1, 0, 10), remove(1, 1, 20, 30)];
        ops[0].matching = Some(1);
        ops[1].matching = Some(0);
        assert_eq!(linearize(&ops), vec![0, 1]);
    }

    #[test]
    fn places_insert_before_its_matching_remove() {
        let mut ops = vec![insert(0, 1, 0, 5), insert(1, 2, 1, 20), remove(2, 2, 21, 25), remove(3, 1, 26, 30)];
        ops[0].matching = Some(3);
        ops[3].matching = Some(0);
        ops[1].matching = Some(2);
        ops[2].matching = Some(1);
        let order = linearize(&ops);
        let pos = |id: u64| order.iter().position(|&i| ops[i].id == id).unwrap();
        assert!(pos(0) < pos(3));
        assert!(pos(1) < pos(2));
    }
}
