//! Dotted member access paths
//!
//! Provides [`MemberPath`] for addressing storage through record members,
//! e.g. `this.Count` or `this.Settings.Name`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Member access path
///
/// Used for backing-field expressions: the first segment names a module
/// field, each following segment a record member.
///
/// # Examples
/// - `["count1"]` → `count1`
/// - `["this", "Count"]` → `this.Count`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MemberPath(Vec<String>);

impl MemberPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the path goes through at least one record member
    #[inline]
    #[must_use]
    pub fn is_member_access(&self) -> bool {
        self.0.len() > 1
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Prefix with a root segment, returning new path
    #[inline]
    #[must_use]
    pub fn rooted_at(&self, root: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(root.into());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }
}

impl Display for MemberPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for MemberPath {
    fn from(segment: &str) -> Self {
        Self::single(segment)
    }
}

impl FromStr for MemberPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Errors parsing a member path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty input
    #[error("empty member path")]
    Empty,

    /// Empty segment (e.g. `a..b`)
    #[error("empty path segment")]
    EmptySegment,

    /// Segment contains characters that are not identifier characters
    #[error("invalid path segment: {0}")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_with_dots() {
        let path = MemberPath::single("this").child("Count");
        assert_eq!(path.to_string(), "this.Count");
        assert!(path.is_member_access());
    }

    #[test]
    fn rooted_at_prefixes() {
        let path = MemberPath::single("Settings").child("Name").rooted_at("this");
        assert_eq!(path.to_string(), "this.Settings.Name");
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some("Name"));
    }

    #[test]
    fn parse_rejects_bad_segments() {
        assert_eq!("a..b".parse::<MemberPath>(), Err(PathError::EmptySegment));
        assert!(matches!(
            "a.b c".parse::<MemberPath>(),
            Err(PathError::InvalidSegment(_))
        ));
        assert_eq!("".parse::<MemberPath>(), Err(PathError::Empty));
    }

    #[test]
    fn parse_round_trips_display() {
        let path: MemberPath = "this.Items".parse().unwrap();
        assert_eq!(path.segments(), &["this".to_string(), "Items".to_string()]);
    }
}
