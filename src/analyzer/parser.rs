//! Parses the analyzer's line-oriented log format:
//! `<type> <value> <start> <lin_time> <end>` with `type` 0=INSERT,
//! 1=REMOVE, all times `u64`. A REMOVE with `value == 0` denotes a
//! null-return (the pool was observed empty); each is remapped here to a
//! unique negative id so every operation still has a distinct identity to
//! match against in the matcher.

use super::error::LogError;
use super::operation::{OpType, Operation};

pub fn parse(log: &str) -> Result<Vec<Operation>, LogError> {
    let mut operations = Vec::new();
    let mut next_null_id: i64 = -1;

    for (line_no, raw_line) in log.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(LogError::Malformed {
                line: line_no + 1,
                text: line.to_string(),
            });
        }
        let parse_u64 = |s: &str| -> Result<u64, LogError> {
            s.parse().map_err(|_| LogError::Malformed {
                line: line_no + 1,
                text: line.to_string(),
            })
        };

        let raw_type: u64 = parse_u64(fields[0])?;
        let value: u64 = parse_u64(fields[1])?;
        let start = parse_u64(fields[2])?;
        let lin_time = parse_u64(fields[3])?;
        let end = parse_u64(fields[4])?;

        let op_type = match raw_type {
            0 => OpType::Insert,
            1 => OpType::Remove,
            other => {
                return Err(LogError::UnknownOpType {
                    line: line_no + 1,
                    raw: other,
                })
            }
        };

        let is_null_return = op_type == OpType::Remove && value == 0;
        let signed_value = if is_null_return {
            let id = next_null_id;
            next_null_id -= 1;
            id
        } else {
            value as i64
        };

        operations.push(Operation::new(
            operations.len() as u64,
            op_type,
            signed_value,
            start,
            lin_time,
            end,
            is_null_return,
        ));
    }

    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_records() {
        let log = "0 5 10 15 20\n1 5 25 30 35\n";
        let ops = parse(log).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].op_type, OpType::Insert);
        assert_eq!(ops[0].value, 5);
        assert_eq!(ops[1].op_type, OpType::Remove);
        assert_eq!(ops[1].value, 5);
    }

    #[test]
    fn null_returns_get_unique_negative_ids() {
        let log = "1 0 1 2 3\n1 0 4 5 6\n";
        let ops = parse(log).unwrap();
        assert!(ops[0].is_null_return);
        assert!(ops[1].is_null_return);
        assert_ne!(ops[0].value, ops[1].value);
        assert!(ops[0].value < 0 && ops[1].value < 0);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse("not a log line").is_err());
        assert!(parse("2 0 1 2 3").is_err());
    }

    #[test]
    fn zero_lin_time_is_substituted_by_end() {
        let log = "0 1 10 0 20\n";
        let ops = parse(log).unwrap();
        assert_eq!(ops[0].lin_time, 20);
    }
}
