use std::fmt::Display;

use glob::Pattern;

use crate::model::GroupArtifact;

/// `*` matches any run of characters, including the `.` and `:` separators
/// of Maven coordinates.
pub fn matches_glob(text: &str, pattern: &str) -> bool {
    Segment::new(pattern).matches(text)
}

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(&['*', '?', '['][..])
}

/// One side of a matcher, compiled once. Malformed globs compare literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Glob(Pattern),
}

impl Segment {
    fn new(pattern: &str) -> Self {
        if is_glob(pattern) {
            if let Ok(compiled) = Pattern::new(pattern) {
                return Segment::Glob(compiled);
            }
        }
        Segment::Literal(pattern.to_owned())
    }

    fn as_str(&self) -> &str {
        match self {
            Segment::Literal(literal) => literal,
            Segment::Glob(pattern) => pattern.as_str(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Segment::Literal(literal) => text == literal,
            Segment::Glob(pattern) => pattern.matches(text),
        }
    }
}

/// Selects dependencies by group and artifact, either of which may be a glob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyMatcher {
    group: Segment,
    artifact: Segment,
}

impl DependencyMatcher {
    pub fn new(group_pattern: impl AsRef<str>, artifact_pattern: impl AsRef<str>) -> Self {
        DependencyMatcher {
            group: Segment::new(group_pattern.as_ref()),
            artifact: Segment::new(artifact_pattern.as_ref()),
        }
    }

    pub fn group_pattern(&self) -> &str {
        self.group.as_str()
    }

    pub fn artifact_pattern(&self) -> &str {
        self.artifact.as_str()
    }

    pub fn matches(&self, group_artifact: &GroupArtifact) -> bool {
        self.group.matches(&group_artifact.group) && self.artifact.matches(&group_artifact.artifact)
    }

    /// The single coordinate this matcher selects, when neither side is a glob.
    pub fn as_literal(&self) -> Option<GroupArtifact> {
        if is_glob(self.group_pattern()) || is_glob(self.artifact_pattern()) {
            return None;
        }
        Some(GroupArtifact::new(self.group_pattern(), self.artifact_pattern()))
    }
}

impl From<&GroupArtifact> for DependencyMatcher {
    fn from(group_artifact: &GroupArtifact) -> Self {
        DependencyMatcher::new(&group_artifact.group, &group_artifact.artifact)
    }
}

impl Display for DependencyMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_pattern(), self.artifact_pattern())
    }
}
