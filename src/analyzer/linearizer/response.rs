//! Order operations by response (`end`) time.

use crate::analyzer::operation::Operation;

pub fn linearize(ops: &[Operation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ops.len()).collect();
    order.sort_by_key(|&i| (ops[i].end, ops[i].id));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::operation::OpType;

    #[test]
    fn orders_by_end_time() {
        let ops = vec![
            Operation::new(0, OpType::Insert, 1, 0, 25, 30, false),
            Operation::new(1, OpType::Remove, 1, 5, 15, 20, false),
        ];
        assert_eq!(linearize(&ops), vec![1, 0]);
    }
}
