//! Age, lateness, element-fairness, and performance-index: metrics computed
//! against one committed linearization order rather than against the raw
//! real-time bounds [`super::cost`] works from.
//!
//! All three are defined relative to an operation's overlap group (from
//! [`super::overlap`]) rather than the whole log: an operation can only be
//! "unfair" to something it could plausibly have been reordered against.
//!
//! - Age(op) counts, among the operations overlapping `op`, how many were
//!   placed earlier in the linearization despite having actually started
//!   later in real time — operations `op` was made to wait behind even
//!   though they arrived after it.
//! - Lateness(op) counts the mirror image: overlapping operations placed
//!   later in the linearization despite starting earlier — operations that
//!   got pushed behind `op` even though they arrived first.
//! - Element fairness charges one matched insert/remove pair for both ends
//!   of that unfairness: the insert's age plus its remove's lateness.

use super::histogram::Histogram;
use super::operation::{OpType, Operation};
use super::overlap::OverlapIndex;

pub struct AgeStats {
    pub total_cost: u64,
    pub max_cost: u64,
    pub num_ops: u64,
}

impl AgeStats {
    pub fn average(&self) -> f64 {
        if self.num_ops == 0 {
            0.0
        } else {
            self.total_cost as f64 / self.num_ops as f64
        }
    }
}

/// `order[pos]` is the operation index placed at rank `pos`; this inverts
/// that into `position[index]`, the rank a given operation index holds.
fn lin_positions(order: &[usize], num_ops: usize) -> Vec<usize> {
    let mut position = vec![0usize; num_ops];
    for (pos, &index) in order.iter().enumerate() {
        position[index] = pos;
    }
    position
}

/// Age(op): the count of operations overlapping `index` that were
/// linearized before it despite starting after it in real time.
fn age_of(ops: &[Operation], position: &[usize], overlap: &OverlapIndex, index: usize) -> u64 {
    overlap
        .of(index)
        .iter()
        .filter(|&&other| position[other] < position[index] && ops[other].real_start > ops[index].real_start)
        .count() as u64
}

/// Lateness(op): the count of operations overlapping `index` that were
/// linearized after it despite starting before it in real time.
fn lateness_of(ops: &[Operation], position: &[usize], overlap: &OverlapIndex, index: usize) -> u64 {
    overlap
        .of(index)
        .iter()
        .filter(|&&other| position[other] > position[index] && ops[other].real_start < ops[index].real_start)
        .count() as u64
}

/// `order` is the linearization under evaluation, as a permutation of
/// operation indices (e.g. from [`super::linearizer::linearize`]).
pub fn calculate_age(ops: &[Operation], order: &[usize], overlap: &OverlapIndex) -> (Histogram, AgeStats) {
    let position = lin_positions(order, ops.len());
    let mut histogram = Histogram::new();
    let mut total = 0u64;
    let mut max = 0u64;

    for index in 0..ops.len() {
        let age = age_of(ops, &position, overlap, index);
        histogram.add(age);
        total += age;
        max = max.max(age);
    }

    (histogram, AgeStats { total_cost: total, max_cost: max, num_ops: ops.len() as u64 })
}

/// Lateness for every operation in `ops`, indexed the same way.
pub fn lateness(ops: &[Operation], order: &[usize], overlap: &OverlapIndex) -> Vec<u64> {
    let position = lin_positions(order, ops.len());
    (0..ops.len()).map(|index| lateness_of(ops, &position, overlap, index)).collect()
}

/// One sample per matched insert/remove pair: the insert's age plus its
/// remove's lateness, i.e. how unfairly that element was treated on both
/// the way in and the way out.
pub fn element_fairness(ops: &[Operation], order: &[usize], overlap: &OverlapIndex) -> Vec<u64> {
    let position = lin_positions(order, ops.len());
    ops.iter()
        .enumerate()
        .filter(|(_, op)| op.op_type == OpType::Remove)
        .filter_map(|(remove_index, remove)| {
            let insert_index = remove.matching.and_then(|id| ops.iter().position(|o| o.id == id))?;
            let age = age_of(ops, &position, overlap, insert_index);
            let late = lateness_of(ops, &position, overlap, remove_index);
            Some(age + late)
        })
        .collect()
}

/// A single scalar folding throughput (operation count) and fairness
/// (average age) into one number suitable for comparing two runs at a
/// glance: more operations and lower average age both push it up.
pub fn performance_index(ops: &[Operation], order: &[usize], overlap: &OverlapIndex) -> f64 {
    let (_, stats) = calculate_age(ops, order, overlap);
    stats.num_ops as f64 / (1.0 + stats.average())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: u64, ty: OpType, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, ty, value, start, end, end, value < 0 && ty == OpType::Remove)
    }

    #[test]
    fn fifo_order_has_zero_age() {
        let ops = vec![
            op(0, OpType::Insert, 1, 0, 1),
            op(1, OpType::Remove, 1, 2, 3),
            op(2, OpType::Insert, 2, 4, 5),
            op(3, OpType::Remove, 2, 6, 7),
        ];
        let overlap = OverlapIndex::build(&ops);
        let order = vec![0, 1, 2, 3];
        let (_, stats) = calculate_age(&ops, &order, &overlap);
        assert_eq!(stats.total_cost, 0);
        assert_eq!(stats.num_ops, 4);
    }

    #[test]
    fn linearizing_a_later_starter_first_charges_age() {
        // Two overlapping inserts; the one that really started later (id 1)
        // gets linearized first, so it should be charged an age of 1 for
        // jumping ahead of id 0.
        let mut ops = vec![op(0, OpType::Insert, 1, 0, 10), op(1, OpType::Insert, 2, 5, 15)];
        ops[0].matching = Some(2);
        ops[1].matching = Some(3);
        let overlap = OverlapIndex::build(&ops);
        let order = vec![1, 0];
        let (_, stats) = calculate_age(&ops, &order, &overlap);
        assert_eq!(stats.total_cost, 1);
        assert_eq!(stats.max_cost, 1);
    }

    #[test]
    fn non_overlapping_ops_never_count_against_each_other() {
        let ops = vec![op(0, OpType::Insert, 1, 0, 5), op(1, OpType::Insert, 2, 100, 105)];
        let overlap = OverlapIndex::build(&ops);
        // Reversing a non-overlapping pair's order should still score zero age.
        let order = vec![1, 0];
        let (_, stats) = calculate_age(&ops, &order, &overlap);
        assert_eq!(stats.total_cost, 0);
    }

    #[test]
    fn element_fairness_sums_insert_age_and_remove_lateness() {
        // Neither operation overlaps the other (the remove starts well
        // after the insert completes), so the pair contributes no fairness
        // charge at all.
        let mut ops = vec![op(0, OpType::Insert, 1, 0, 10), op(1, OpType::Remove, 1, 20, 30)];
        ops[0].matching = Some(1);
        ops[1].matching = Some(0);
        let overlap = OverlapIndex::build(&ops);
        let order = vec![0, 1];
        let fairness = element_fairness(&ops, &order, &overlap);
        assert_eq!(fairness, vec![0]);
    }
}
