//! Parse the detail turn of an advanced extraction into a record

use crate::repair::{parse_record, repair, RepairError};
use crate::types::Record;
use tracing::{debug, warn};

/// Parse a JSON reply, falling back to truncation repair
///
/// The reply is first parsed as-is. Only when that fails is it handed to
/// [`repair`], whose own fast paths run before the general scan.
pub fn parse_details(reply: &str) -> Result<Record, RepairError> {
    match parse_record(reply) {
        Ok(record) => Ok(record),
        Err(e) => {
            warn!(error = %e, reply_len = reply.len(), "detail reply is not valid JSON, attempting repair");
            let record = repair(reply)?;
            debug!(keys = record.len(), "repaired truncated detail reply");
            Ok(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_json() {
        let record = parse_details(r#"{"refs": ["line 1: John Doe"]}"#).unwrap();
        assert_eq!(record.get("refs"), Some(&json!(["line 1: John Doe"])));
    }

    #[test]
    fn test_parse_truncated_json() {
        let record = parse_details(r#"{"refs": ["p.1"#).unwrap();
        assert_eq!(record.get("refs"), Some(&json!(["p.1"])));
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        let record = parse_details("\n{\"a\": 1}\n").unwrap();
        assert_eq!(record.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_details("This is not JSON");
        assert!(matches!(result, Err(RepairError::Unrepairable(_))));
    }

    #[test]
    fn test_parse_unbalanced() {
        let result = parse_details(r#"{"refs": ["p.1"}]"#);
        assert!(matches!(result, Err(RepairError::UnbalancedBrackets { .. })));
    }
}
