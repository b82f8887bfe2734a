//! Component identifiers and dependency collections.
//!
//! Identifier grammar: `[@<scope>/][<box>/]<name>[::<version>]`. A bare name
//! lives in the default box; a scope can only be introduced with `@`.

use crate::constants::DEFAULT_BOX_NAME;
use crate::types::{BitName, BoxName, ScopeName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const VERSION_DELIMITER: &str = "::";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("component id must not be empty")]
    Empty,
    #[error("invalid component id '{0}': empty segment")]
    EmptySegment(String),
    #[error("invalid component id '{0}': too many segments, expected [@scope/][box/]name")]
    TooManySegments(String),
    #[error("invalid component id '{0}': empty version after '::'")]
    EmptyVersion(String),
    #[error("invalid component id '{0}': segments must not be '.', '..' or contain path separators")]
    InvalidSegment(String),
}

/// Whether `segment` can name a scope, box, name or environment on disk:
/// non-empty, not `.` or `..`, and free of path separators.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

/// A parsed component identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BitId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeName>,
    #[serde(rename = "box")]
    pub box_name: BoxName,
    pub name: BitName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl BitId {
    pub fn new(box_name: impl Into<BoxName>, name: impl Into<BitName>) -> Self {
        Self {
            scope: None,
            box_name: box_name.into(),
            name: name.into(),
            version: None,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<ScopeName>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }

        let (path, version) = match trimmed.split_once(VERSION_DELIMITER) {
            Some((_, v)) if v.is_empty() => return Err(IdError::EmptyVersion(input.to_owned())),
            Some((p, v)) => (p, Some(v.to_owned())),
            None => (trimmed, None),
        };

        let (scope, rest) = match path.strip_prefix('@') {
            Some(scoped) => match scoped.split_once('/') {
                Some((scope, rest)) => (Some(scope), rest),
                None => return Err(IdError::EmptySegment(input.to_owned())),
            },
            None => (None, path),
        };

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) || scope.is_some_and(str::is_empty) {
            return Err(IdError::EmptySegment(input.to_owned()));
        }

        let (box_name, name) = match segments.as_slice() {
            [name] => (DEFAULT_BOX_NAME, *name),
            [box_name, name] => (*box_name, *name),
            _ => return Err(IdError::TooManySegments(input.to_owned())),
        };
        if ![box_name, name]
            .into_iter()
            .chain(scope)
            .all(is_valid_segment)
        {
            return Err(IdError::InvalidSegment(input.to_owned()));
        }

        Ok(Self {
            scope: scope.map(ScopeName::from),
            box_name: BoxName::from(box_name),
            name: BitName::from(name),
            version,
        })
    }

    /// `box/name`, the key used for local lookup and the scope index.
    pub fn box_and_name(&self) -> String {
        format!("{}/{}", self.box_name, self.name)
    }

    /// Same component ignoring scope and version.
    pub fn same_component(&self, other: &BitId) -> bool {
        self.box_name == other.box_name && self.name == other.name
    }

    /// Rendering without the version suffix, as used for dependency keys.
    pub fn to_string_without_version(&self) -> String {
        match &self.scope {
            Some(scope) => format!("@{scope}/{}", self.box_and_name()),
            None => self.box_and_name(),
        }
    }
}

impl fmt::Display for BitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_without_version())?;
        if let Some(version) = &self.version {
            write!(f, "{VERSION_DELIMITER}{version}")?;
        }
        Ok(())
    }
}

impl FromStr for BitId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An ordered collection of component identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitIds(Vec<BitId>);

impl BitIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a manifest dependency map: keys are identifiers, values
    /// become each identifier's version constraint.
    pub fn from_dependencies(dependencies: &BTreeMap<String, String>) -> Result<Self, IdError> {
        dependencies
            .iter()
            .map(|(id, version)| Ok(BitId::parse(id)?.with_version(version.clone())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BitId> {
        self.0.iter()
    }

    /// Find an entry by box/name, ignoring scope and version.
    pub fn search_without_scope_and_version(&self, id: &BitId) -> Option<&BitId> {
        self.0.iter().find(|candidate| candidate.same_component(id))
    }
}

impl FromIterator<BitId> for BitIds {
    fn from_iter<I: IntoIterator<Item = BitId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BitIds {
    type Item = BitId;
    type IntoIter = std::vec::IntoIter<BitId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BitIds {
    type Item = &'a BitId;
    type IntoIter = std::slice::Iter<'a, BitId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_name_into_default_box() {
        let id = BitId::parse("is-string").unwrap();
        assert_eq!(id.box_name, DEFAULT_BOX_NAME);
        assert_eq!(id.name, "is-string");
        assert!(id.scope.is_none());
        assert!(id.version.is_none());
    }

    #[test]
    fn parses_box_and_name() {
        let id = BitId::parse("utils/string").unwrap();
        assert_eq!(id.box_name, "utils");
        assert_eq!(id.name, "string");
    }

    #[test]
    fn parses_scope_box_name_and_version() {
        let id = BitId::parse("@acme/utils/string::3").unwrap();
        assert_eq!(id.scope.as_ref().map(ScopeName::as_str), Some("acme"));
        assert_eq!(id.box_name, "utils");
        assert_eq!(id.name, "string");
        assert_eq!(id.version.as_deref(), Some("3"));
    }

    #[test]
    fn scope_without_box_uses_default_box() {
        let id = BitId::parse("@acme/string").unwrap();
        assert_eq!(id.box_name, DEFAULT_BOX_NAME);
        assert_eq!(id.name, "string");
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for input in ["global/a", "@s/utils/b", "@s/utils/b::1.0.0", "utils/c::2"] {
            let id = BitId::parse(input).unwrap();
            assert_eq!(id.to_string(), input);
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(BitId::parse(""), Err(IdError::Empty));
        assert_eq!(BitId::parse("   "), Err(IdError::Empty));
        assert!(matches!(
            BitId::parse("utils//a"),
            Err(IdError::EmptySegment(_))
        ));
        assert!(matches!(
            BitId::parse("@/utils/a"),
            Err(IdError::EmptySegment(_))
        ));
        assert!(matches!(BitId::parse("@acme"), Err(IdError::EmptySegment(_))));
        assert!(matches!(
            BitId::parse("a/b/c"),
            Err(IdError::TooManySegments(_))
        ));
        assert!(matches!(
            BitId::parse("utils/a::"),
            Err(IdError::EmptyVersion(_))
        ));
    }

    #[test]
    fn rejects_path_like_segments() {
        for input in ["..", "../..", "./a", "utils/.", "@../utils/a", "utils/a\\b", "..::1"] {
            assert!(
                matches!(BitId::parse(input), Err(IdError::InvalidSegment(_))),
                "{input} should be rejected"
            );
        }
        assert!(BitId::parse("utils/.hidden").is_ok());
        assert!(BitId::parse("utils/a..b").is_ok());
    }

    #[test]
    fn valid_segments() {
        assert!(is_valid_segment("babel"));
        assert!(!is_valid_segment(""));
        assert!(!is_valid_segment(".."));
        assert!(!is_valid_segment("a/b"));
        assert!(!is_valid_segment("a\\b"));
    }

    #[test]
    fn from_dependencies_attaches_versions() {
        let mut deps = BTreeMap::new();
        deps.insert("utils/string".to_owned(), "1.0.0".to_owned());
        deps.insert("@acme/math/add".to_owned(), "2".to_owned());

        let ids = BitIds::from_dependencies(&deps).unwrap();
        assert_eq!(ids.len(), 2);
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["@acme/math/add::2", "utils/string::1.0.0"]);
    }

    #[test]
    fn from_dependencies_fails_on_invalid_key() {
        let mut deps = BTreeMap::new();
        deps.insert("a/b/c".to_owned(), "1".to_owned());
        assert!(BitIds::from_dependencies(&deps).is_err());
    }

    #[test]
    fn search_ignores_scope_and_version() {
        let ids: BitIds = [BitId::parse("@acme/utils/string::1").unwrap()]
            .into_iter()
            .collect();
        let wanted = BitId::parse("utils/string").unwrap();
        assert!(ids.search_without_scope_and_version(&wanted).is_some());
        let other = BitId::parse("utils/number").unwrap();
        assert!(ids.search_without_scope_and_version(&other).is_none());
    }
}
