//! Pairs every successful REMOVE with the INSERT of the same value and
//! tightens each pair's adjusted `start`/`end` so a remove can never be
//! considered to have linearized before the value it returned existed.
//!
//! Null-returning removes (see [`super::parser`]) already carry a unique
//! negative value and are left unmatched; every other value must appear
//! exactly once as an INSERT and once as a REMOVE, or the log itself is
//! evidence of a contract violation (the pool returned a value it never
//! received, or lost one it received) and analysis cannot proceed.

use std::collections::HashMap;

use super::error::LogError;
use super::operation::{OpType, Operation};

pub fn match_operations(ops: &mut [Operation]) -> Result<(), LogError> {
    let mut inserts_by_value: HashMap<i64, Vec<usize>> = HashMap::new();
    let mut removes_by_value: HashMap<i64, Vec<usize>> = HashMap::new();

    for (i, op) in ops.iter().enumerate() {
        if op.is_null_return {
            continue;
        }
        match op.op_type {
            OpType::Insert => inserts_by_value.entry(op.value).or_default().push(i),
            OpType::Remove => removes_by_value.entry(op.value).or_default().push(i),
        }
    }

    let total_inserts: usize = inserts_by_value.values().map(Vec::len).sum();
    let total_removes: usize = removes_by_value.values().map(Vec::len).sum();

    let mut values: Vec<i64> = inserts_by_value.keys().copied().collect();
    values.extend(removes_by_value.keys().copied().filter(|v| !inserts_by_value.contains_key(v)));

    for value in values {
        let inserts = inserts_by_value.get(&value).map(Vec::as_slice).unwrap_or(&[]);
        let removes = removes_by_value.get(&value).map(Vec::as_slice).unwrap_or(&[]);
        if inserts.len() != removes.len() {
            return Err(LogError::DuplicateValue {
                value,
                insert_count: inserts.len(),
                remove_count: removes.len(),
            });
        }
        for (&insert_idx, &remove_idx) in inserts.iter().zip(removes.iter()) {
            ops[insert_idx].matching = Some(ops[remove_idx].id);
            ops[remove_idx].matching = Some(ops[insert_idx].id);

            let insert_real_start = ops[insert_idx].real_start;
            let remove = &mut ops[remove_idx];
            if remove.start < insert_real_start {
                remove.start = insert_real_start;
            }
            if remove.end < remove.start {
                remove.end = remove.start;
            }
        }
    }

    if total_inserts != total_removes {
        return Err(LogError::UnmatchedRemove {
            inserts: total_inserts,
            removes: total_removes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::operation::OpType;

    fn op(id: u64, ty: OpType, value: i64, start: u64, end: u64) -> Operation {
        Operation::new(id, ty, value, start, end, end, false)
    }

    #[test]
    fn matches_insert_and_remove_by_value() {
        let mut ops = vec![
            op(0, OpType::Insert, 7, 0, 10),
            op(1, OpType::Remove, 7, 20, 30),
        ];
        match_operations(&mut ops).unwrap();
        assert_eq!(ops[0].matching, Some(1));
        assert_eq!(ops[1].matching, Some(0));
    }

    #[test]
    fn remove_start_is_clamped_to_insert_start() {
        let mut ops = vec![
            op(0, OpType::Insert, 1, 50, 60),
            op(1, OpType::Remove, 1, 10, 70),
        ];
        match_operations(&mut ops).unwrap();
        assert_eq!(ops[1].start, 50);
    }

    #[test]
    fn detects_unmatched_value() {
        let mut ops = vec![op(0, OpType::Remove, 9, 0, 10)];
        assert!(match_operations(&mut ops).is_err());
    }

    #[test]
    fn null_returns_are_left_unmatched() {
        let mut ops = vec![Operation::new(0, OpType::Remove, -1, 0, 0, 10, true)];
        match_operations(&mut ops).unwrap();
        assert_eq!(ops[0].matching, None);
    }
}
