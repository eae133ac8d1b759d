//! Topic error types

use thiserror::Error;

/// Errors raised while parsing, matching or registering topics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
    /// Pattern or concrete topic was empty
    #[error("Invalid topic: topic must not be empty")]
    Empty,

    /// A segment between two delimiters was empty (e.g. `a//b`)
    #[error("Invalid topic '{0}': empty segment")]
    EmptySegment(String),

    /// Multi-level wildcards are not supported
    #[error("Invalid topic pattern '{0}': multi-level wildcard '#' is not supported")]
    MultiLevelWildcard(String),

    /// A concrete topic (publish target) contained a wildcard
    #[error("Invalid topic '{0}': wildcards are only allowed in patterns")]
    WildcardInTopic(String),

    /// Two registered patterns can match the same concrete topic
    #[error("Overlapping topic patterns: '{first}' and '{second}'")]
    Overlap { first: String, second: String },
}

/// Result type alias for topic operations
pub type TopicResult<T> = Result<T, TopicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TopicError::Empty.to_string(),
            "Invalid topic: topic must not be empty"
        );

        let err = TopicError::Overlap {
            first: "a/+".to_string(),
            second: "a/b".to_string(),
        };
        assert_eq!(err.to_string(), "Overlapping topic patterns: 'a/+' and 'a/b'");
    }
}
