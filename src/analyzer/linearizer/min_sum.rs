//! Iterative refinement that tries to minimize the *total* cost across all
//! removes rather than the worst-case cost a single pass of
//! [`super::min_max`] settles for: starting from an initial guess, each
//! round nudges every matched pair toward sitting next to each other in the
//! order, and stops once a round leaves the order unchanged.
//!
//! The original algorithm recurses until two consecutive orders compare
//! equal, with no bound on how many rounds that can take. Fixed points are
//! reached quickly in practice, but an adversarial log could in principle
//! oscillate; `max_iterations` caps the refinement so this always
//! terminates, falling back to its last computed order if the cap is hit.

use crate::analyzer::operation::Operation;

use super::lin_point;

pub fn linearize(ops: &[Operation], max_iterations: usize) -> Vec<usize> {
    let mut order = lin_point::linearize(ops);
    for _ in 0..max_iterations {
        let next = refine(ops, &order);
        if next == order {
            return next;
        }
        order = next;
    }
    order
}

fn refine(ops: &[Operation], order: &[usize]) -> Vec<usize> {
    let n = ops.len();
    let mut position = vec![0usize; n];
    for (pos, &idx) in order.iter().enumerate() {
        position[idx] = pos;
    }

    // Each operation's key pulls it toward the rank of whatever it is
    // matched with, biased by its own start time so unmatched operations
    // (a lone insert with no remove yet) keep their relative order.
    let mut next: Vec<usize> = (0..n).collect();
    next.sort_by_key(|&i| {
        let anchor = ops[i]
            .matching
            .and_then(|id| ops.iter().position(|o| o.id == id))
            .map(|j| position[j])
            .unwrap_or(position[i]);
        (anchor.min(position[i]), ops[i].start, ops[i].id)
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::operation::OpType;

    fn insert(id: u64, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, OpType::Insert, value, start, end, end, false)
    }

    fn remove(id: u64, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, OpType::Remove, value, start, end, end, false)
    }

    #[test]
    fn strict_fifo_converges_immediately() {
        let mut ops = vec![insert(0, 1, 0, 10), remove(1, 1, 20, 30)];
        ops[0].matching = Some(1);
        ops[1].matching = Some(0);
        assert_eq!(linearize(&ops, 8), vec![0, 1]);
    }

    #[test]
    fn converges_within_the_iteration_cap() {
        let mut ops = vec![
            insert(0, 1, 0, 5),
            insert(1, 2, 1, 20),
            remove(2, 2, 21, 25),
            remove(3, 1, 26, 30),
        ];
        ops[0].matching = Some(3);
        ops[3].matching = Some(0);
        ops[1].matching = Some(2);
        ops[2].matching = Some(1);
        let order = linearize(&ops, 8);
        assert_eq!(order.len(), ops.len());
    }
}
