//! Cross-module properties that don't belong to any single unit: no value
//! is lost or duplicated under concurrent access, the DDS's total count
//! balances, and a recorded log survives the full analyzer pipeline.

use std::sync::Arc;
use std::thread;

use scal::backend::MsQueue;
use scal::dds::balancer::OneRandom;
use scal::dds::DistributedDataStructure;
use scal::kfifo::UnboundedKFifo;
use scal::logger::OperationLogger;
use scal::Pool;

#[test]
fn kfifo_loses_and_duplicates_nothing_under_contention() {
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 2_000;

    let pool = Arc::new(UnboundedKFifo::<u64>::new(4));
    let mut handles = Vec::new();
    for p in 0..PRODUCERS {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                // Values are globally unique: producer id in the high bits,
                // sequence number in the low bits, and never zero (the
                // Payload::EMPTY sentinel).
                let value = (p << 32) | (i + 1);
                assert!(pool.put(value));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut seen = std::collections::HashSet::new();
    while let Some(value) = pool.get() {
        assert!(seen.insert(value), "value {value} was dequeued more than once");
    }
    assert_eq!(seen.len() as u64, PRODUCERS * PER_PRODUCER);
}

#[test]
fn dds_total_count_balances_across_shards() {
    const SHARDS: usize = 4;
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 500;

    let backends: Vec<MsQueue<u64>> = (0..SHARDS).map(|_| MsQueue::new()).collect();
    let dds = Arc::new(DistributedDataStructure::new(backends, Box::new(OneRandom::new(false)), true));

    let mut handles = Vec::new();
    for p in 0..PRODUCERS {
        let dds = Arc::clone(&dds);
        handles.push(thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                let value = (p << 32) | (i + 1);
                assert!(dds.put(value));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut removed = 0u64;
    while dds.get().is_some() {
        removed += 1;
    }
    assert_eq!(removed, PRODUCERS * PER_PRODUCER);
    assert!(dds.empty());
}

#[test]
fn operation_logger_output_survives_the_analyzer_pipeline() {
    let logger = OperationLogger::new();
    for value in 1..=20u64 {
        let token = logger.start();
        logger.finish_insert(token, value);
        let token = logger.start();
        logger.finish_remove(token, Some(value));
    }

    let log = logger.render();
    let result = scal::analyzer::analyze(&log, scal::analyzer::LinearizerKind::LinPoint).unwrap();
    assert_eq!(result.num_operations, 40);
    assert_eq!(result.lower_bound.errors(), 0);
}
