//! Precomputes, for every operation, the set of other operations whose
//! adjusted `[start, end]` interval overlaps it. The linearizers consult
//! this instead of re-scanning the whole log on every comparison: an
//! operation can only be reordered relative to operations it overlaps.

use super::operation::{OpType, Operation};

pub struct OverlapIndex {
    /// `overlaps[i]` holds the indices of every operation overlapping
    /// operation `i`, excluding `i` itself.
    overlaps: Vec<Vec<usize>>,
}

impl OverlapIndex {
    pub fn build(ops: &[Operation]) -> Self {
        let n = ops.len();
        let mut overlaps = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if ops[i].overlaps(&ops[j]) {
                    overlaps[i].push(j);
                    overlaps[j].push(i);
                }
            }
        }
        OverlapIndex { overlaps }
    }

    pub fn of(&self, index: usize) -> &[usize] {
        &self.overlaps[index]
    }

    /// The subset of `of(index)` whose operation type matches `op_type`,
    /// used by linearizers that only reorder within a type (e.g. two
    /// inserts can swap order freely; an insert and a remove generally
    /// cannot).
    pub fn of_type(&self, ops: &[Operation], index: usize, op_type: OpType) -> Vec<usize> {
        self.overlaps[index].iter().copied().filter(|&j| ops[j].op_type == op_type).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::operation::OpType;

    fn op(id: u64, ty: OpType, start: u64, end: u64) -> Operation {
        Operation::new(id, ty, id as i64, start, end, end, false)
    }

    #[test]
    fn overlap_is_mutual() {
        let ops = vec![
            op(0, OpType::Insert, 0, 10),
            op(1, OpType::Remove, 5, 15),
            op(2, OpType::Insert, 20, 30),
        ];
        let idx = OverlapIndex::build(&ops);
        assert_eq!(idx.of(0), &[1]);
        assert_eq!(idx.of(1), &[0]);
        assert!(idx.of(2).is_empty());
    }

    #[test]
    fn of_type_filters_by_op_type() {
        let ops = vec![
            op(0, OpType::Insert, 0, 10),
            op(1, OpType::Remove, 0, 10),
            op(2, OpType::Insert, 0, 10),
        ];
        let idx = OverlapIndex::build(&ops);
        assert_eq!(idx.of_type(&ops, 0, OpType::Insert), vec![2]);
        assert_eq!(idx.of_type(&ops, 0, OpType::Remove), vec![1]);
    }
}
