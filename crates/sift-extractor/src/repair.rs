//! Recovery of JSON records cut off by an exhausted token budget
//!
//! When generation stops mid-record the reply is a prefix of valid JSON:
//! some objects, arrays and possibly a string are still open. Repair tries,
//! in order:
//!
//! 1. the text as-is, if it already ends with `}`
//! 2. the text with one `}` appended (the outer brace is the usual casualty)
//! 3. a scan that tracks the open scopes and appends their closers,
//!    innermost first
//!
//! The scan only looks at `{`, `}`, `[`, `]` and `"`. A character preceded by
//! an unescaped backslash is skipped, and inside a string only the closing
//! quote is significant. A closer that does not match the innermost open
//! scope is an error rather than something to skip over.

use crate::types::Record;
use thiserror::Error;

/// Why a reply could not be turned into a record
#[derive(Error, Debug)]
pub enum RepairError {
    /// A closing quote did not close a string scope
    #[error("unbalanced quoting at byte {offset}")]
    UnbalancedQuoting {
        /// Byte offset of the offending quote
        offset: usize,
    },

    /// A `}` or `]` did not match the innermost open scope
    #[error("unbalanced brackets at byte {offset}")]
    UnbalancedBrackets {
        /// Byte offset of the offending closer
        offset: usize,
    },

    /// The text with all scopes closed still is not a JSON object
    #[error("unrepairable output: {0}")]
    Unrepairable(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Quote,
    Object,
    Array,
}

impl Scope {
    fn closer(self) -> char {
        match self {
            Scope::Quote => '"',
            Scope::Object => '}',
            Scope::Array => ']',
        }
    }
}

#[derive(Debug, Default)]
struct RepairState {
    stack: Vec<Scope>,
    in_quotes: bool,
}

impl RepairState {
    fn quote(&mut self, offset: usize) -> Result<(), RepairError> {
        self.in_quotes = !self.in_quotes;
        if self.in_quotes {
            self.stack.push(Scope::Quote);
            return Ok(());
        }
        match self.stack.pop() {
            Some(Scope::Quote) => Ok(()),
            _ => Err(RepairError::UnbalancedQuoting { offset }),
        }
    }

    fn close(&mut self, expected: Scope, offset: usize) -> Result<(), RepairError> {
        match self.stack.pop() {
            Some(scope) if scope == expected => Ok(()),
            _ => Err(RepairError::UnbalancedBrackets { offset }),
        }
    }

    fn suffix(&self) -> String {
        self.stack.iter().rev().map(|scope| scope.closer()).collect()
    }
}

/// Parse `text` as a JSON object
pub fn parse_record(text: &str) -> Result<Record, serde_json::Error> {
    serde_json::from_str(text)
}

/// Closers for every scope still open at the end of `text`, innermost first
///
/// Returns an empty string for text with no open scopes.
pub fn closing_suffix(text: &str) -> Result<String, RepairError> {
    let mut state = RepairState::default();
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => state.quote(offset)?,
            _ if state.in_quotes => {}
            '{' => state.stack.push(Scope::Object),
            '[' => state.stack.push(Scope::Array),
            '}' => state.close(Scope::Object, offset)?,
            ']' => state.close(Scope::Array, offset)?,
            _ => {}
        }
    }

    Ok(state.suffix())
}

/// Reconstruct a record from a possibly truncated JSON reply
pub fn repair(text: &str) -> Result<Record, RepairError> {
    if text.ends_with('}') {
        if let Ok(record) = parse_record(text) {
            return Ok(record);
        }
    }

    if let Ok(record) = parse_record(&format!("{}}}", text)) {
        return Ok(record);
    }

    let mut repaired = text.to_string();
    repaired.push_str(&closing_suffix(text)?);
    parse_record(&repaired).map_err(RepairError::Unrepairable)
}
