mod error;
mod grammar;

pub use error::ParseError;
pub use grammar::{MAX_CLAUSES, MAX_NESTING};

use crate::ConditionExpression;

/// Parse condition text into a [`ConditionExpression`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid condition. Groups
/// nested deeper than [`MAX_NESTING`] and conditions with more than
/// [`MAX_CLAUSES`] clauses are rejected the same way. No partial expression
/// is ever returned.
pub fn parse(input: &str) -> Result<ConditionExpression, ParseError> {
    use winnow::Parser;
    grammar::condition.parse(input).map_err(|e| {
        let message = e.inner().to_string().replace('\n', "; ");
        let message = if message.is_empty() {
            "unexpected input".to_owned()
        } else {
            message
        };
        ParseError::new(message, input, e.offset())
    })
}
