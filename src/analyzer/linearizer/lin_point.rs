//! Order operations by their recorded linearization point (`lin_time`),
//! the order an implementation under test claims each operation actually
//! took effect.

use crate::analyzer::operation::Operation;

pub fn linearize(ops: &[Operation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ops.len()).collect();
    order.sort_by_key(|&i| (ops[i].lin_time, ops[i].id));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::operation::OpType;

    #[test]
    fn orders_by_lin_time() {
        let ops = vec![
            Operation::new(0, OpType::Insert, 1, 0, 30, 10, false),
            Operation::new(1, OpType::Insert, 2, 0, 5, 10, false),
        ];
        assert_eq!(linearize(&ops), vec![1, 0]);
    }
}
