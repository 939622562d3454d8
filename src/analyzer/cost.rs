//! The FIFO semantic-error cost functions: given a REMOVE operation and its
//! matching INSERT (if any), how many other inserts does it "skip over"
//! relative to strict FIFO order?
//!
//! Two bounds are computed. The lower bound only counts inserts that are
//! unambiguously older — ones that had already returned before the matched
//! insert even began — so it never over-counts inserts whose relative order
//! is genuinely ambiguous under the recorded timestamps. The upper bound is
//! more pessimistic: it counts every insert whose invocation overlaps the
//! matched insert's completion, treating any such ambiguity against the
//! structure under test.
//!
//! The `_pending` variants are the same predicates restricted to a caller-
//! supplied subset of still-live inserts, used by `executor.rs`'s greedy
//! execution driver to re-score a remove once an earlier-resolved overlap
//! has taken one of its contributing inserts out of consideration.

use super::operation::{OpType, Operation};

/// For a successful remove, the number of inserts that had already
/// completed before the remove's matching insert was even invoked.
fn finished_before(ops: &[Operation], matching_insert: &Operation) -> usize {
    ops.iter()
        .filter(|op| op.op_type == OpType::Insert && op.id != matching_insert.id)
        .filter(|op| op.end < matching_insert.start)
        .count()
}

/// For a successful remove, the number of inserts other than its match
/// that were invoked no later than the match's completion.
fn started_through(ops: &[Operation], matching_insert: &Operation) -> usize {
    ops.iter()
        .filter(|op| op.op_type == OpType::Insert && op.id != matching_insert.id)
        .filter(|op| op.start <= matching_insert.end)
        .count()
}

/// For a null-returning remove, the number of inserts that had already
/// completed before the remove was invoked (there is no matching insert to
/// anchor against, so the remove's own start stands in for it).
fn finished_before_null_return(ops: &[Operation], remove: &Operation) -> usize {
    ops.iter()
        .filter(|op| op.op_type == OpType::Insert)
        .filter(|op| op.end < remove.start)
        .count()
}

/// For a null-returning remove, the number of inserts invoked no later than
/// the remove's own completion.
fn started_through_null_return(ops: &[Operation], remove: &Operation) -> usize {
    ops.iter()
        .filter(|op| op.op_type == OpType::Insert)
        .filter(|op| op.start <= remove.end)
        .count()
}

/// The optimistic (lower-bound) semantic error of `remove`, given the
/// operation it matched against via [`super::matcher`] (`None` for a
/// null-return).
pub fn lower_bound(ops: &[Operation], remove: &Operation, matching_insert: Option<&Operation>) -> usize {
    match matching_insert {
        Some(insert) => finished_before(ops, insert),
        None => finished_before_null_return(ops, remove),
    }
}

/// The pessimistic (upper-bound) semantic error of `remove`.
pub fn upper_bound(ops: &[Operation], remove: &Operation, matching_insert: Option<&Operation>) -> usize {
    match matching_insert {
        Some(insert) => started_through(ops, insert),
        None => started_through_null_return(ops, remove),
    }
}

/// `lower_bound`, restricted to inserts still marked `pending[i]`. Used by
/// the greedy execution driver in `executor.rs`, which shrinks the pending
/// set as it resolves overlapping removes ahead of `remove`.
pub fn lower_bound_pending(
    ops: &[Operation],
    pending: &[bool],
    remove: &Operation,
    matching_insert: Option<&Operation>,
) -> usize {
    match matching_insert {
        Some(insert) => ops
            .iter()
            .enumerate()
            .filter(|(i, op)| pending[*i] && op.op_type == OpType::Insert && op.id != insert.id)
            .filter(|(_, op)| op.end < insert.start)
            .count(),
        None => ops
            .iter()
            .enumerate()
            .filter(|(i, op)| pending[*i] && op.op_type == OpType::Insert)
            .filter(|(_, op)| op.end < remove.start)
            .count(),
    }
}

/// `upper_bound`, restricted to inserts still marked `pending[i]`.
pub fn upper_bound_pending(
    ops: &[Operation],
    pending: &[bool],
    remove: &Operation,
    matching_insert: Option<&Operation>,
) -> usize {
    match matching_insert {
        Some(insert) => ops
            .iter()
            .enumerate()
            .filter(|(i, op)| pending[*i] && op.op_type == OpType::Insert && op.id != insert.id)
            .filter(|(_, op)| op.start <= insert.end)
            .count(),
        None => ops
            .iter()
            .enumerate()
            .filter(|(i, op)| pending[*i] && op.op_type == OpType::Insert)
            .filter(|(_, op)| op.start <= remove.end)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: u64, ty: OpType, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, ty, value, start, end, end, false)
    }

    #[test]
    fn strict_fifo_has_zero_cost() {
        let insert = op(0, OpType::Insert, 1, 0, 10);
        let remove = op(1, OpType::Remove, 1, 20, 30);
        let ops = vec![insert.clone(), remove.clone()];
        assert_eq!(lower_bound(&ops, &remove, Some(&insert)), 0);
        assert_eq!(upper_bound(&ops, &remove, Some(&insert)), 0);
    }

    #[test]
    fn out_of_order_remove_costs_one() {
        let older_insert = op(0, OpType::Insert, 1, 0, 5);
        let matched_insert = op(1, OpType::Insert, 2, 10, 20);
        let remove = op(2, OpType::Remove, 2, 25, 30);
        let ops = vec![older_insert.clone(), matched_insert.clone(), remove.clone()];
        assert_eq!(lower_bound(&ops, &remove, Some(&matched_insert)), 1);
    }

    #[test]
    fn null_return_counts_all_finished_inserts() {
        let insert = op(0, OpType::Insert, 1, 0, 5);
        let remove = op(1, OpType::Remove, -1, 10, 20);
        let ops = vec![insert, remove.clone()];
        assert_eq!(lower_bound(&ops, &remove, None), 1);
    }
}
