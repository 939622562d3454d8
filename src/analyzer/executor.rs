//! Ties the pipeline together: parse a log, match inserts to removes,
//! linearize it, then score every remove against the FIFO cost functions
//! and the order-dependent age metric, bucketing both into histograms.

use super::cost;
use super::error::LogError;
use super::fairness::{self, AgeStats};
use super::histogram::Histogram;
use super::linearizer::{self, LinearizerKind};
use super::matcher;
use super::operation::{OpType, Operation};
use super::overlap::OverlapIndex;
use super::parser;

pub struct AnalysisResult {
    pub num_operations: usize,
    pub lower_bound: Histogram,
    pub upper_bound: Histogram,
    pub age: Histogram,
    pub age_stats: AgeStats,
    pub lateness: Vec<u64>,
    pub mean_overlap_group_size: f64,
}

pub fn analyze(log: &str, linearizer_kind: LinearizerKind) -> Result<AnalysisResult, LogError> {
    analyze_with_histogram_size(log, linearizer_kind, None)
}

pub fn analyze_with_histogram_size(
    log: &str,
    linearizer_kind: LinearizerKind,
    histogram_size: Option<usize>,
) -> Result<AnalysisResult, LogError> {
    let mut ops = parser::parse(log)?;
    matcher::match_operations(&mut ops)?;
    let overlap = OverlapIndex::build(&ops);

    let order_indices = linearizer::linearize(linearizer_kind, &ops);

    let lower_bound = execute_with_overlaps(&ops, &order_indices, &overlap, true, histogram_size);
    let upper_bound = execute_with_overlaps(&ops, &order_indices, &overlap, false, histogram_size);

    let (age, age_stats) = fairness::calculate_age(&ops, &order_indices, &overlap);
    let lateness = fairness::lateness(&ops, &order_indices, &overlap);

    let mean_overlap_group_size = if ops.is_empty() {
        0.0
    } else {
        ops.iter().enumerate().map(|(i, _)| overlap.of(i).len()).sum::<usize>() as f64 / ops.len() as f64
    };

    Ok(AnalysisResult {
        num_operations: ops.len(),
        lower_bound,
        upper_bound,
        age,
        age_stats,
        lateness,
        mean_overlap_group_size,
    })
}

fn find_by_id(ops: &[Operation], id: u64) -> Option<&Operation> {
    ops.iter().find(|op| op.id == id)
}

/// The still-pending inserts (per the `pending` mask) that count toward
/// `remove`'s cost under the given bound, mirroring
/// [`cost::lower_bound_pending`]/[`cost::upper_bound_pending`] but
/// returning *which* inserts contribute rather than just how many.
fn contributing_inserts(
    ops: &[Operation],
    pending: &[bool],
    remove: &Operation,
    matching_insert: Option<&Operation>,
    lower: bool,
) -> Vec<usize> {
    let exclude_id = matching_insert.map(|insert| insert.id);
    ops.iter()
        .enumerate()
        .filter(|(i, op)| pending[*i] && op.op_type == OpType::Insert && Some(op.id) != exclude_id)
        .filter(|(_, op)| {
            if lower {
                match matching_insert {
                    Some(insert) => op.end < insert.start,
                    None => op.end < remove.start,
                }
            } else {
                match matching_insert {
                    Some(insert) => op.start <= insert.end,
                    None => op.start <= remove.end,
                }
            }
        })
        .map(|(i, _)| i)
        .collect()
}

fn pending_cost(ops: &[Operation], pending: &[bool], remove: &Operation, matching_insert: Option<&Operation>, lower: bool) -> usize {
    if lower {
        cost::lower_bound_pending(ops, pending, remove, matching_insert)
    } else {
        cost::upper_bound_pending(ops, pending, remove, matching_insert)
    }
}

/// The greedy execution driver: walks the removes in the chosen
/// linearization's order, and for each one whose cost against the current
/// pending set is still positive, first resolves whichever pending,
/// overlapping remove would free up one of the inserts it's being charged
/// for — shrinking the pending set — before finalizing its own cost. This
/// means a remove's recorded error reflects what's left once every
/// earlier-settled overlap has been taken out of consideration, rather than
/// a single score computed against the full, unresolved operation set.
fn execute_with_overlaps(
    ops: &[Operation],
    order: &[usize],
    overlap: &OverlapIndex,
    lower: bool,
    histogram_size: Option<usize>,
) -> Histogram {
    let n = ops.len();
    let mut pending = vec![true; n];
    let mut executed = vec![false; n];
    let mut histogram = histogram_size.map(Histogram::with_size).unwrap_or_else(Histogram::new);

    let removes_in_order: Vec<usize> = order.iter().copied().filter(|&i| ops[i].op_type == OpType::Remove).collect();

    for idx in removes_in_order {
        if !executed[idx] {
            resolve(ops, overlap, lower, idx, &mut pending, &mut executed, &mut histogram);
        }
    }

    histogram
}

fn resolve(
    ops: &[Operation],
    overlap: &OverlapIndex,
    lower: bool,
    idx: usize,
    pending: &mut [bool],
    executed: &mut [bool],
    histogram: &mut Histogram,
) {
    let remove = ops[idx].clone();
    let matching_insert = remove.matching.and_then(|id| find_by_id(ops, id)).cloned();
    // Marked here, not after resolution, so a candidate search triggered by
    // one of `idx`'s own candidates can never loop back and re-enter `idx`
    // while it's still on the call stack.
    executed[idx] = true;

    loop {
        let contributors = contributing_inserts(ops, pending, &remove, matching_insert.as_ref(), lower);
        if contributors.is_empty() {
            break;
        }

        let candidate = overlap
            .of_type(ops, idx, OpType::Remove)
            .into_iter()
            .filter(|&j| !executed[j])
            .filter(|&j| {
                ops[j]
                    .matching
                    .map(|insert_id| contributors.iter().any(|&ci| ops[ci].id == insert_id))
                    .unwrap_or(false)
            })
            .min_by_key(|&j| {
                let j_remove = ops[j].clone();
                let j_insert = j_remove.matching.and_then(|id| find_by_id(ops, id)).cloned();
                let j_cost = pending_cost(ops, pending, &j_remove, j_insert.as_ref(), lower);
                (j_cost, ops[j].start, ops[j].id)
            });

        match candidate {
            Some(j) => resolve(ops, overlap, lower, j, pending, executed, histogram),
            None => break,
        }
    }

    let final_cost = pending_cost(ops, pending, &remove, matching_insert.as_ref(), lower);
    histogram.add(final_cost as u64);
    if let Some(insert) = &matching_insert {
        if let Some(i) = ops.iter().position(|o| o.id == insert.id) {
            pending[i] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_fifo_log_has_zero_cost() {
        let log = "0 5 0 0 10\n1 5 20 0 30\n0 6 31 0 40\n1 6 50 0 60\n";
        let result = analyze(log, LinearizerKind::LinPoint).unwrap();
        assert_eq!(result.num_operations, 4);
        assert_eq!(result.lower_bound.num_samples(), 2);
        assert_eq!(result.lower_bound.cumulative_error(), 0);
        assert_eq!(result.upper_bound.cumulative_error(), 0);
    }

    #[test]
    fn resolving_an_overlapping_remove_first_clears_a_contributing_insert() {
        // insert(1) finishes well before insert(2) starts, so a naive,
        // static scan would always charge remove(2) for it. But insert(1)'s
        // own remove is invoked *after* remove(2) (so the Invocation
        // linearizer would visit remove(2) first) while still overlapping
        // remove(2)'s execution window — so the driver should resolve it
        // first anyway, consuming insert(1) before remove(2)'s cost is
        // finalized and leaving both removes with zero residual error.
        let log = "0 1 0 0 5\n0 2 10 0 10\n1 2 11 0 60\n1 1 50 0 55\n";
        let result = analyze(log, LinearizerKind::Invocation).unwrap();
        assert_eq!(result.num_operations, 4);
        assert_eq!(result.lower_bound.num_samples(), 2);
        assert_eq!(result.lower_bound.cumulative_error(), 0);

        // Confirm this genuinely depends on overlap-aware resolution: the
        // naive per-op cost function, run against the full static set,
        // would have charged remove(2) for insert(1).
        let mut ops = parser::parse(log).unwrap();
        matcher::match_operations(&mut ops).unwrap();
        let remove2 = ops.iter().find(|op| op.op_type == OpType::Remove && op.value == 2).unwrap();
        let insert2 = ops.iter().find(|op| op.id == remove2.matching.unwrap()).unwrap();
        assert_eq!(cost::lower_bound(&ops, remove2, Some(insert2)), 1);
    }

    #[test]
    fn null_return_is_counted() {
        let log = "1 0 0 0 5\n";
        let result = analyze(log, LinearizerKind::Invocation).unwrap();
        assert_eq!(result.num_operations, 1);
    }

    #[test]
    fn unmatched_value_surfaces_as_error() {
        let log = "1 7 0 0 5\n";
        assert!(analyze(log, LinearizerKind::Invocation).is_err());
    }
}
