use std::fmt;

/// Errors produced when parsing condition text.
///
/// `offset` is a byte offset into the condition; `fragment` is the text
/// found there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    fragment: String,
    offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, input: &str, offset: usize) -> Self {
        Self {
            message: message.into(),
            fragment: fragment_at(input, offset),
            offset,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

fn fragment_at(input: &str, offset: usize) -> String {
    input
        .get(offset..)
        .unwrap_or_default()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .take(24)
        .collect()
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.is_empty() {
            write!(
                f,
                "parse error at offset {} (end of input): {}",
                self.offset, self.message
            )
        } else {
            write!(
                f,
                "parse error at offset {} near '{}': {}",
                self.offset, self.fragment, self.message
            )
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new("unknown domain", "gradle.dep is 'x'", 0);
        assert_eq!(
            err.to_string(),
            "parse error at offset 0 near 'gradle.dep': unknown domain"
        );
    }

    #[test]
    fn error_at_end_of_input() {
        let err = ParseError::new("expected clause", "java.class is 'x' AND", 21);
        assert_eq!(err.fragment(), "");
        assert_eq!(
            err.to_string(),
            "parse error at offset 21 (end of input): expected clause"
        );
    }
}
