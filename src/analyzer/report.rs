//! Renders an [`AnalysisResult`](super::executor::AnalysisResult) as the
//! summary line the CLI prints, plus the optional per-metric breakdown.

use std::fmt::Write as _;

use super::executor::AnalysisResult;
use super::histogram::Histogram;

fn summary_line(name: &str, h: &Histogram) -> String {
    format!(
        "{name}: max: {}; num_ops: {}; total: {}; average: {:.4}",
        h.max().unwrap_or(0),
        h.num_samples(),
        h.cumulative_error(),
        h.mean(),
    )
}

pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "operations: {}", result.num_operations);
    let _ = writeln!(out, "{}", summary_line("lower_bound", &result.lower_bound));
    let _ = writeln!(out, "{}", summary_line("upper_bound", &result.upper_bound));
    let _ = writeln!(out, "{}", summary_line("age", &result.age));
    let _ = writeln!(
        out,
        "age: worst: {}; mean: {:.4}",
        result.age_stats.max_cost,
        result.age_stats.average(),
    );
    let mean_lateness = if result.lateness.is_empty() {
        0.0
    } else {
        result.lateness.iter().sum::<u64>() as f64 / result.lateness.len() as f64
    };
    let _ = writeln!(out, "lateness: mean: {mean_lateness:.4}");
    let _ = writeln!(out, "contention: mean_overlap_group: {:.4}", result.mean_overlap_group_size);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::linearizer::LinearizerKind;

    #[test]
    fn renders_every_summary_line() {
        let log = "0 5 0 0 10\n1 5 20 0 30\n";
        let result = crate::analyzer::executor::analyze(log, LinearizerKind::LinPoint).unwrap();
        let rendered = render(&result);
        assert!(rendered.contains("lower_bound: max:"));
        assert!(rendered.contains("upper_bound: max:"));
        assert!(rendered.contains("age: max:"));
        assert!(rendered.contains("lateness: mean:"));
    }
}
