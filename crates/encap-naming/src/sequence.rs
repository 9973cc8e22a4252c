//! Deterministic name disambiguation
//!
//! A desired name expands into the sequence `name, name1, name2, ...`; a
//! name that already ends in a number continues from it (`item2, item3, ...`).
//! The first element that is legal and unclaimed wins.

use crate::validator::NameValidator;
use crate::NamingError;

/// Default bound on how many sequence elements are tried
pub const DEFAULT_DISAMBIGUATION_LIMIT: usize = 1000;

/// Next identifier in the sequence: `count` → `count1`, `count9` → `count10`
#[must_use]
pub fn increment_identifier(name: &str) -> String {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[stem.len()..];
    match digits.parse::<u64>() {
        Ok(n) => format!("{stem}{}", n.saturating_add(1)),
        Err(_) => format!("{name}1"),
    }
}

/// Infinite iterator over `name` and its increments
#[derive(Debug, Clone)]
pub struct NameSequence {
    next: String,
}

impl NameSequence {
    /// Start the sequence at `name`
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { next: name.into() }
    }
}

impl Iterator for NameSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let following = increment_identifier(&self.next);
        Some(std::mem::replace(&mut self.next, following))
    }
}

/// First element of `desired`'s sequence that `validator` accepts and
/// `is_taken` rejects, trying at most `limit` elements
///
/// # Errors
/// - [`NamingError::Invalid`] as soon as an element breaks a syntax rule,
///   since suffixing cannot repair it
/// - [`NamingError::Exhausted`] when `limit` elements were tried
pub fn disambiguate(
    desired: &str,
    validator: NameValidator,
    limit: usize,
    mut is_taken: impl FnMut(&str) -> bool,
) -> Result<String, NamingError> {
    for candidate in NameSequence::new(desired).take(limit) {
        match validator.validate(&candidate) {
            Ok(()) if !is_taken(&candidate) => return Ok(candidate),
            Ok(()) => {}
            Err(violation) if violation.is_recoverable() => {}
            Err(violation) => return Err(NamingError::Invalid(violation)),
        }
    }
    Err(NamingError::Exhausted {
        name: desired.to_string(),
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn increments_trailing_numbers() {
        assert_eq!(increment_identifier("count"), "count1");
        assert_eq!(increment_identifier("count1"), "count2");
        assert_eq!(increment_identifier("item09"), "item10");
        assert_eq!(increment_identifier("x99"), "x100");
    }

    #[test]
    fn sequence_starts_with_the_name() {
        let names: Vec<_> = NameSequence::new("Count").take(3).collect();
        assert_eq!(names, vec!["Count", "Count1", "Count2"]);
    }

    #[test]
    fn desired_name_wins_when_free() {
        let name = disambiguate("Count", NameValidator::Default, 10, |_| false).unwrap();
        assert_eq!(name, "Count");
    }

    #[test]
    fn skips_taken_and_reserved_names() {
        let taken: HashSet<&str> = ["count", "count1"].into_iter().collect();
        let name = disambiguate("Count", NameValidator::Default, 10, |n| {
            taken.contains(n.to_ascii_lowercase().as_str())
        })
        .unwrap();
        assert_eq!(name, "Count2");

        let name = disambiguate("End", NameValidator::Default, 10, |_| false).unwrap();
        assert_eq!(name, "End1");
    }

    #[test]
    fn syntax_violations_fail_fast() {
        let err = disambiguate("1st", NameValidator::Default, 10, |_| false).unwrap_err();
        assert!(matches!(err, NamingError::Invalid(_)));
    }

    #[test]
    fn exhaustion_is_reported() {
        let err = disambiguate("Count", NameValidator::Default, 3, |_| true).unwrap_err();
        assert!(matches!(err, NamingError::Exhausted { limit: 3, .. }));
    }

    proptest! {
        #[test]
        fn sequence_is_unique_and_deterministic(stem in "[a-z]{1,8}", n in 1usize..50) {
            let first: Vec<_> = NameSequence::new(stem.clone()).take(n).collect();
            let second: Vec<_> = NameSequence::new(stem).take(n).collect();
            let unique: HashSet<_> = first.iter().collect();
            prop_assert_eq!(unique.len(), n);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn result_is_legal_and_unclaimed(
            stem in "[a-z]{1,8}",
            taken in proptest::collection::hash_set("[a-z]{1,8}[0-9]{0,2}", 0..20),
        ) {
            let name = disambiguate(&stem, NameValidator::Default, 1000, |n| taken.contains(n)).unwrap();
            prop_assert!(!taken.contains(&name));
            prop_assert!(NameValidator::Default.is_valid_name(&name));
        }
    }
}
