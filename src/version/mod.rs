mod ordering;
mod range;

use std::{cmp::Ordering, fmt::Display, sync::OnceLock};

use log::trace;
use regex_lite::Regex;
use thiserror::Error;

pub use ordering::{compare_versions, Version};
pub use range::VersionRange;

pub const LATEST_RELEASE: &str = "latest.release";
pub const LATEST_PATCH: &str = "latest.patch";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version selector `{selector}`: {reason}")]
pub struct InvalidSelector {
    pub selector: String,
    pub reason: String,
}

impl InvalidSelector {
    fn new(selector: &str, reason: impl Into<String>) -> Self {
        InvalidSelector {
            selector: selector.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Strategy for picking a version out of published metadata, chosen once from
/// a selector expression and reused across every candidate coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionComparator {
    Exact(String),
    LatestRelease { pattern: Option<String> },
    LatestPatch { pattern: Option<String> },
    Range {
        range: VersionRange,
        pattern: Option<String>,
    },
}

impl VersionComparator {
    /// Parses `selector`, optionally paired with a pattern that candidate
    /// versions must contain (for example `-jre`).
    pub fn parse(selector: &str, pattern: Option<&str>) -> Result<Self, InvalidSelector> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(InvalidSelector::new(selector, "selector is empty"));
        }
        let pattern = pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        let comparator = match selector {
            LATEST_RELEASE => VersionComparator::LatestRelease { pattern },
            LATEST_PATCH => VersionComparator::LatestPatch { pattern },
            _ => match VersionRange::parse(selector) {
                Some(range) => VersionComparator::Range { range, pattern },
                // a pattern has nothing to filter once the version is fixed
                None if is_exact_version(selector) => VersionComparator::Exact(selector.to_owned()),
                None => {
                    return Err(InvalidSelector::new(
                        selector,
                        "expected an exact version, latest.release, latest.patch or a version range",
                    ))
                }
            },
        };
        Ok(comparator)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, VersionComparator::Exact(_))
    }

    /// Whether `candidate` is acceptable given the version currently in use.
    pub fn is_valid(&self, current: Option<&str>, candidate: &str) -> bool {
        match self {
            VersionComparator::Exact(version) => version == candidate,
            VersionComparator::LatestRelease { pattern } => {
                release_matching(candidate, pattern.as_deref()).is_some()
            }
            VersionComparator::LatestPatch { pattern } => {
                let Some(current) = current.and_then(Version::parse) else {
                    return false;
                };
                release_matching(candidate, pattern.as_deref()).is_some_and(|candidate| {
                    candidate.major() == current.major() && candidate.minor() == current.minor()
                })
            }
            VersionComparator::Range { range, pattern } => {
                release_matching(candidate, pattern.as_deref())
                    .is_some_and(|candidate| range.contains(&candidate))
            }
        }
    }

    /// Picks the best candidate, or `None` when nothing acceptable is newer
    /// than `current`. Unparseable candidates are ignored.
    pub fn upgrade<'a, I>(&self, current: Option<&str>, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<&str> = candidates.into_iter().collect();

        let best = match self {
            VersionComparator::Exact(version) => {
                return candidates
                    .iter()
                    .any(|candidate| candidate == version)
                    .then(|| version.clone());
            }
            VersionComparator::LatestPatch { .. } => {
                let current = current?;
                if !self.is_valid(Some(current), current) {
                    trace!("{current} does not look like a release, cannot select a patch");
                    return None;
                }
                self.max_valid(Some(current), &candidates)
            }
            VersionComparator::LatestRelease { pattern } => {
                self.max_valid(current, &candidates).or_else(|| {
                    // libraries that only ever published pre-releases
                    let any_release = candidates
                        .iter()
                        .any(|c| Version::parse(c).is_some_and(|v| !v.is_prerelease()));
                    if any_release {
                        return None;
                    }
                    candidates
                        .iter()
                        .copied()
                        .filter(|c| {
                            Version::parse(c).is_some()
                                && pattern.as_deref().map_or(true, |p| c.contains(p))
                        })
                        .max_by(|a, b| self.compare(current, a, b))
                })
            }
            VersionComparator::Range { .. } => self.max_valid(current, &candidates),
        }?;

        match current {
            Some(current)
                if Version::parse(current).is_some()
                    && self.compare(Some(current), best, current) != Ordering::Greater =>
            {
                None
            }
            _ => Some(best.to_owned()),
        }
    }

    /// Orders `a` and `b`. The anchor is the version in use and does not
    /// change the order for any of the current strategies.
    pub fn compare(&self, _anchor: Option<&str>, a: &str, b: &str) -> Ordering {
        compare_versions(a, b)
    }

    fn max_valid<'a>(&self, current: Option<&str>, candidates: &[&'a str]) -> Option<&'a str> {
        candidates
            .iter()
            .copied()
            .filter(|candidate| self.is_valid(current, candidate))
            .max_by(|a, b| self.compare(current, a, b))
    }

    /// `latest.patch` has no meaning without a version in use.
    pub fn for_new_dependency(self) -> Self {
        match self {
            VersionComparator::LatestPatch { pattern } => {
                VersionComparator::LatestRelease { pattern }
            }
            other => other,
        }
    }
}

impl Display for VersionComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (selector, pattern) = match self {
            VersionComparator::Exact(version) => (version.clone(), None),
            VersionComparator::LatestRelease { pattern } => {
                (LATEST_RELEASE.to_owned(), pattern.as_ref())
            }
            VersionComparator::LatestPatch { pattern } => (LATEST_PATCH.to_owned(), pattern.as_ref()),
            VersionComparator::Range { range, pattern } => (range.to_string(), pattern.as_ref()),
        };
        match pattern {
            Some(pattern) => write!(f, "{selector} ({pattern})"),
            None => f.write_str(&selector),
        }
    }
}

/// Parses `candidate` as a release, i.e. containing `pattern` when one is set
/// and carrying no pre-release marker once the pattern is removed.
fn release_matching(candidate: &str, pattern: Option<&str>) -> Option<Version> {
    let stripped = match pattern {
        Some(pattern) if !candidate.contains(pattern) => return None,
        Some(pattern) => candidate.replacen(pattern, "", 1),
        None => candidate.to_owned(),
    };
    Version::parse(candidate)
        .filter(|_| Version::parse(&stripped).is_some_and(|v| !v.is_prerelease()))
}

fn is_exact_version(selector: &str) -> bool {
    static EXACT: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&EXACT, || r"^\d[\w.+\-]*$".to_owned())
        .is_some_and(|re| re.is_match(selector))
}

/// Compiles `pattern` on first use and hands out the same regex afterwards.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: impl FnOnce() -> String,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(&pattern()).ok()).as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn upgrade(selector: &str, pattern: Option<&str>, current: Option<&str>, candidates: &[&str]) -> Option<String> {
        VersionComparator::parse(selector, pattern)
            .unwrap()
            .upgrade(current, candidates.iter().copied())
    }

    #[test]
    fn parse_selectors() {
        assert_eq!(
            VersionComparator::parse("1.2.5", None).unwrap(),
            VersionComparator::Exact("1.2.5".to_owned())
        );
        assert_eq!(
            VersionComparator::parse("latest.release", Some("-jre")).unwrap(),
            VersionComparator::LatestRelease {
                pattern: Some("-jre".to_owned())
            }
        );
        assert!(matches!(
            VersionComparator::parse("latest.patch", None).unwrap(),
            VersionComparator::LatestPatch { pattern: None }
        ));
        assert!(matches!(
            VersionComparator::parse("[1.0,2.0)", None).unwrap(),
            VersionComparator::Range { .. }
        ));
    }

    #[test]
    fn reject_malformed_selectors() {
        for selector in ["", "latest", "latest.snapshot", "$guavaVersion", "1.0 2.0", "[1.0,2.0"] {
            let error = VersionComparator::parse(selector, None).unwrap_err();
            assert_eq!(error.selector, selector.trim());
        }
        assert!(VersionComparator::parse("1.2.3", Some("-jre")).unwrap().is_exact());
    }

    #[test]
    fn exact_version_with_numeric_suffix() {
        let comparator = VersionComparator::parse("3.3.7-1", None).unwrap();
        assert!(comparator.is_exact());
        assert_eq!(
            comparator.upgrade(Some("3.3.6"), ["3.3.6", "3.3.7-1"]),
            Some("3.3.7-1".to_owned())
        );
    }

    #[test]
    fn regex_is_compiled_once() {
        static CELL: OnceLock<Option<Regex>> = OnceLock::new();
        let first = cached_regex(&CELL, || r"^\d+$".to_owned()).unwrap();
        let second = cached_regex(&CELL, || r"^[a-z]+$".to_owned()).unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(second.is_match("42"));

        static BROKEN: OnceLock<Option<Regex>> = OnceLock::new();
        assert!(cached_regex(&BROKEN, || "(".to_owned()).is_none());
        assert!(is_exact_version("3.3.7-1"));
        assert!(!is_exact_version("latest.release"));
    }

    #[test]
    fn exact_upgrade() {
        assert_eq!(
            upgrade("1.2.5", None, Some("1.2.3"), &["1.2.3", "1.2.5", "1.3.0"]),
            Some("1.2.5".to_owned())
        );
        assert_eq!(upgrade("1.2.6", None, Some("1.2.3"), &["1.2.3", "1.2.5"]), None);
    }

    #[test]
    fn latest_release_with_pattern() {
        assert_eq!(
            upgrade("latest.release", Some("-jre"), None, &["29.0", "29.0-jre", "30.0-android"]),
            Some("29.0-jre".to_owned())
        );
        assert_eq!(
            upgrade("latest.release", None, None, &["29.0", "29.0-jre", "30.0-android"]),
            Some("30.0-android".to_owned())
        );
    }

    #[test]
    fn latest_release_skips_prereleases() {
        assert_eq!(
            upgrade("latest.release", None, Some("1.0"), &["1.1", "2.0-rc1", "2.0-SNAPSHOT", "garbage"]),
            Some("1.1".to_owned())
        );
        assert_eq!(
            upgrade("latest.release", None, Some("1.1"), &["1.0", "1.1", "2.0-rc1"]),
            None
        );
        assert_eq!(
            upgrade("latest.release", None, None, &["0.1.0-M1", "0.1.0-M2"]),
            Some("0.1.0-M2".to_owned())
        );
    }

    #[test]
    fn latest_patch_stays_on_minor_line() {
        assert_eq!(
            upgrade("latest.patch", None, Some("1.2.3"), &["1.2.4", "1.3.0", "2.0.0"]),
            Some("1.2.4".to_owned())
        );
        assert_eq!(upgrade("latest.patch", None, Some("1.2.4"), &["1.2.4", "1.3.0"]), None);
        assert_eq!(upgrade("latest.patch", None, Some("$version"), &["1.2.4"]), None);
        assert_eq!(upgrade("latest.patch", None, None, &["1.2.4"]), None);
    }

    #[test]
    fn range_without_match_is_absent() {
        assert_eq!(upgrade("[5.0,6.0)", None, None, &["6.1.0", "7.0.0"]), None);
        assert_eq!(
            upgrade("25-29", Some("-jre"), Some("25.0-jre"), &["28.2-jre", "29.0-jre", "29.0-android", "30.0-jre"]),
            Some("29.0-jre".to_owned())
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let comparator = VersionComparator::parse("latest.release", None).unwrap();
        let forward = ["1.0", "1.0.0", "0.9"];
        let backward = ["0.9", "1.0.0", "1.0"];
        for _ in 0..3 {
            assert_eq!(comparator.upgrade(None, forward), Some("1.0.0".to_owned()));
            assert_eq!(comparator.upgrade(None, backward), Some("1.0.0".to_owned()));
        }
    }

    #[test]
    fn latest_patch_for_new_dependency_is_latest_release() {
        let comparator = VersionComparator::parse("latest.patch", Some("-jre"))
            .unwrap()
            .for_new_dependency();
        assert_eq!(
            comparator,
            VersionComparator::LatestRelease {
                pattern: Some("-jre".to_owned())
            }
        );
    }
}
