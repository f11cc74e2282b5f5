//! In-memory author name filter.
//!
//! Author person patterns use SQL `LIKE` wildcards (`%` any run, `_` one
//! character). The backend cannot search on them, so candidates are matched
//! after retrieval against the plain rendering of each author's name
//! (`FAMILY GIVEN`).

use regex::Regex;
use xdsfhir_core::Author;

use crate::error::QueryError;

#[derive(Debug, Clone, Default)]
pub struct AuthorMatcher {
    patterns: Vec<Regex>,
}

impl AuthorMatcher {
    /// Compiles every pattern. No pattern matches every candidate.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, QueryError> {
        let patterns = patterns
            .iter()
            .map(|pattern| like_to_regex(pattern.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every pattern must match at least one of the authors.
    pub fn matches(&self, authors: &[Author]) -> bool {
        self.patterns.iter().all(|pattern| {
            authors
                .iter()
                .filter_map(|author| author.author_person.as_ref()?.name.as_ref())
                .any(|name| pattern.is_match(&name.render_plain()))
        })
    }
}

fn like_to_regex(pattern: &str) -> Result<Regex, QueryError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut literal = String::new();
    for c in pattern.chars() {
        let wildcard = match c {
            '%' => ".*",
            '_' => ".",
            _ => {
                literal.push(c);
                continue;
            }
        };
        expr.push_str(&regex::escape(&literal));
        literal.clear();
        expr.push_str(wildcard);
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');

    Regex::new(&expr).map_err(|e| QueryError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdsfhir_core::{Person, PersonName};

    fn author(family: &str, given: &str) -> Author {
        Author {
            author_person: Some(Person {
                id: None,
                name: Some(PersonName {
                    family_name: Some(family.into()),
                    given_name: Some(given.into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_percent_matches_any_suffix() {
        let matcher = AuthorMatcher::new(&["SMITH%"]).unwrap();
        assert!(matcher.matches(&[author("SMITH", "JOHN")]));
        assert!(!matcher.matches(&[author("JONES", "SMITH")]));
    }

    #[test]
    fn test_underscore_matches_one_character() {
        let matcher = AuthorMatcher::new(&["SM_TH JOHN"]).unwrap();
        assert!(matcher.matches(&[author("SMYTH", "JOHN")]));
        assert!(!matcher.matches(&[author("SMITTH", "JOHN")]));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let matcher = AuthorMatcher::new(&["O.BRIEN%"]).unwrap();
        assert!(matcher.matches(&[author("O.BRIEN", "PAT")]));
        assert!(!matcher.matches(&[author("OXBRIEN", "PAT")]));
    }

    #[test]
    fn test_all_patterns_must_match() {
        let matcher = AuthorMatcher::new(&["SMITH%", "%JONES%"]).unwrap();
        let authors = [author("SMITH", "JOHN"), author("JONES", "ANN")];
        assert!(matcher.matches(&authors));
        assert!(!matcher.matches(&authors[..1]));
    }

    #[test]
    fn test_empty_matcher_accepts_everything() {
        let matcher = AuthorMatcher::new::<&str>(&[]).unwrap();
        assert!(matcher.is_empty());
        assert!(matcher.matches(&[]));
    }

    #[test]
    fn test_author_without_person_never_matches() {
        let matcher = AuthorMatcher::new(&["%"]).unwrap();
        assert!(!matcher.matches(&[Author::default()]));
    }
}
