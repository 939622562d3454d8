//! The cheapest possible linearization: order operations by invocation
//! (`start`) time. Useful as a baseline and as the seed order for
//! [`super::min_sum`]'s iterative refinement.

use crate::analyzer::operation::Operation;

pub fn linearize(ops: &[Operation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ops.len()).collect();
    order.sort_by_key(|&i| (ops[i].start, ops[i].id));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::operation::OpType;

    #[test]
    fn orders_by_start_time() {
        let ops = vec![
            Operation::new(0, OpType::Insert, 1, 10, 15, 20, false),
            Operation::new(1, OpType::Insert, 2, 0, 5, 10, false),
        ];
        assert_eq!(linearize(&ops), vec![1, 0]);
    }
}
