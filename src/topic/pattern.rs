//! Topic Patterns
//!
//! A pattern is a `/`-delimited sequence of literal segments and single-level
//! wildcards (`+`). A wildcard matches exactly one concrete segment, never zero
//! and never several.

use serde::{Serialize, Serializer};
use std::fmt;

use super::error::{TopicError, TopicResult};

/// Segment delimiter for hierarchical topics
pub const DELIMITER: char = '/';

/// Single-level wildcard marker
pub const WILDCARD: &str = "+";

const MULTI_LEVEL_WILDCARD: &str = "#";

/// One position of a topic pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the concrete segment exactly
    Literal(String),
    /// Matches any single concrete segment
    Wildcard,
}

/// A parsed, immutable topic pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl TopicPattern {
    /// Parse a pattern such as `university/lab/printer/+/telemetry`
    pub fn parse(pattern: &str) -> TopicResult<Self> {
        if pattern.is_empty() {
            return Err(TopicError::Empty);
        }

        let mut segments = Vec::new();
        for part in pattern.split(DELIMITER) {
            let segment = match part {
                "" => return Err(TopicError::EmptySegment(pattern.to_string())),
                WILDCARD => Segment::Wildcard,
                MULTI_LEVEL_WILDCARD => {
                    return Err(TopicError::MultiLevelWildcard(pattern.to_string()))
                }
                literal => Segment::Literal(literal.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as it was registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Index of the first wildcard segment, if any
    pub fn wildcard_index(&self) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| matches!(s, Segment::Wildcard))
    }

    /// Check whether a concrete topic matches this pattern
    pub fn matches(&self, topic: &str) -> bool {
        if topic.is_empty() {
            return false;
        }

        let mut parts = topic.split(DELIMITER);
        for segment in &self.segments {
            match (segment, parts.next()) {
                (_, None) => return false,
                (_, Some("")) => return false,
                (Segment::Wildcard, Some(_)) => {}
                (Segment::Literal(lit), Some(part)) => {
                    if lit != part {
                        return false;
                    }
                }
            }
        }

        // Concrete topic must not have trailing segments
        parts.next().is_none()
    }

    /// Return the concrete segment bound by the wildcard, if the topic matches
    ///
    /// For `university/lab/printer/+/telemetry` and
    /// `university/lab/printer/printer-7/telemetry` this yields `printer-7`.
    pub fn extract<'t>(&self, topic: &'t str) -> Option<&'t str> {
        if !self.matches(topic) {
            return None;
        }
        let index = self.wildcard_index()?;
        topic.split(DELIMITER).nth(index)
    }

    /// Fill every wildcard with `value` to produce a concrete topic
    pub fn render(&self, value: &str) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Wildcard => value,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Whether some concrete topic could match both patterns
    pub fn overlaps(&self, other: &TopicPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|pair| match pair {
                    (Segment::Wildcard, _) | (_, Segment::Wildcard) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                })
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TopicPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Match a concrete topic against a pattern string
///
/// Both inputs must be non-empty.
pub fn matches(pattern: &str, topic: &str) -> TopicResult<bool> {
    if topic.is_empty() {
        return Err(TopicError::Empty);
    }
    Ok(TopicPattern::parse(pattern)?.matches(topic))
}

/// Check that `topic` is concrete: non-empty segments and no wildcards
pub fn validate_topic(topic: &str) -> TopicResult<()> {
    let parsed = TopicPattern::parse(topic)?;
    if parsed.wildcard_index().is_some() {
        return Err(TopicError::WildcardInTopic(topic.to_string()));
    }
    Ok(())
}
