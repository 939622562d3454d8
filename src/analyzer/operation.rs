//! The analyzer's operation record: a parsed log line plus the bookkeeping
//! fields the matcher, overlap pass, and linearizers attach to it as
//! analysis proceeds.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Insert,
    Remove,
}

/// One recorded invocation/response pair.
///
/// `start`/`end` are the times used for ordering during analysis; they may
/// be adjusted away from `real_start`/`real_end` by the matcher (e.g. a
/// null-returning remove's real end is moved earlier than a same-valued
/// insert that raced it). `value` holds the log's original field for an
/// insert or a successful remove; a null-returning remove is remapped by
/// the parser to a unique negative id so every remove still has a distinct
/// matching partner.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: u64,
    pub op_type: OpType,
    pub value: i64,
    pub real_start: u64,
    pub real_end: u64,
    pub start: u64,
    pub end: u64,
    pub lin_time: u64,
    pub is_null_return: bool,
    pub matching: Option<u64>,
}

impl Operation {
    pub fn new(id: u64, op_type: OpType, value: i64, start: u64, lin_time: u64, end: u64, is_null_return: bool) -> Self {
        let lin_time = if lin_time == 0 { end } else { lin_time };
        Operation {
            id,
            op_type,
            value,
            real_start: start,
            real_end: end,
            start,
            end,
            lin_time,
            is_null_return,
            matching: None,
        }
    }

    pub fn overlaps(&self, other: &Operation) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lin_time_falls_back_to_end() {
        let op = Operation::new(1, OpType::Insert, 5, 10, 0, 20, false);
        assert_eq!(op.lin_time, 20);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Operation::new(1, OpType::Insert, 1, 0, 5, 10, false);
        let b = Operation::new(2, OpType::Remove, 1, 5, 8, 15, false);
        let c = Operation::new(3, OpType::Remove, 2, 20, 25, 30, false);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }
}
