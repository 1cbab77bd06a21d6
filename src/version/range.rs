use std::{cmp::Ordering, fmt::Display, sync::OnceLock};

use regex_lite::Regex;

use super::{cached_regex, ordering::Version};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: Version,
    inclusive: bool,
}

/// A version interval parsed from node-semver (`1.x`, `~1.2`, `^1.2.3`,
/// `25-29`, `>=1.0 <2.0`) or Maven (`[1.0,2.0)`) notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    source: String,
    lower: Option<Bound>,
    upper: Option<Bound>,
}

const NUMERIC: &str = r"\d+(?:\.\d+)*";

impl VersionRange {
    /// Returns `None` when `selector` is not written in any range notation.
    pub fn parse(selector: &str) -> Option<VersionRange> {
        let selector = selector.trim();
        parse_maven(selector)
            .or_else(|| parse_hyphen(selector))
            .or_else(|| parse_x_range(selector))
            .or_else(|| parse_tilde(selector))
            .or_else(|| parse_caret(selector))
            .or_else(|| parse_comparators(selector))
            .filter(|(lower, upper)| !is_empty(lower.as_ref(), upper.as_ref()))
            .map(|(lower, upper)| VersionRange {
                source: selector.to_owned(),
                lower,
                upper,
            })
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(Bound { version: bound, inclusive }) => match version.cmp(bound) {
                Ordering::Greater => true,
                Ordering::Equal => *inclusive,
                Ordering::Less => false,
            },
        };
        let below_upper = match &self.upper {
            None => true,
            Some(Bound { version: bound, inclusive }) => match version.cmp(bound) {
                Ordering::Less => true,
                Ordering::Equal => *inclusive,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

type Bounds = (Option<Bound>, Option<Bound>);

/// An interval no version can fall into. `3.3.7-1` reads as the hyphen range
/// `3.3.7 - 1`, which is empty; such selectors are exact versions instead.
fn is_empty(lower: Option<&Bound>, upper: Option<&Bound>) -> bool {
    match (lower, upper) {
        (Some(lower), Some(upper)) => match lower.version.cmp(&upper.version) {
            Ordering::Greater => true,
            Ordering::Equal => !(lower.inclusive && upper.inclusive),
            Ordering::Less => false,
        },
        _ => false,
    }
}

fn bound(raw: &str, inclusive: bool) -> Option<Bound> {
    Version::parse(raw).map(|version| Bound { version, inclusive })
}

/// Numeric components of a partial version such as `1.2`.
fn components(raw: &str) -> Option<Vec<u64>> {
    raw.split('.').map(|c| c.parse::<u64>().ok()).collect()
}

fn join(components: &[u64]) -> String {
    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Exclusive upper bound obtained by bumping the last given component:
/// `1.2` becomes `1.3`, `4` becomes `5`.
fn bump_last(components: &[u64]) -> Option<Bound> {
    let mut bumped = components.to_vec();
    let last = bumped.last_mut()?;
    *last += 1;
    bound(&join(&bumped), false)
}

fn parse_maven(selector: &str) -> Option<Bounds> {
    static MAVEN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&MAVEN, || {
        r"^([\[(])\s*([^,\s\])]*)\s*(?:,\s*([^,\s\])]*)\s*)?([\])])$".to_owned()
    })?;
    let captures = re.captures(selector)?;
    let lower_inclusive = &captures[1] == "[";
    let upper_inclusive = &captures[4] == "]";
    let lower_raw = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    match captures.get(3) {
        // `[1.0]` pins a single version
        None => {
            if !(lower_inclusive && upper_inclusive) || lower_raw.is_empty() {
                return None;
            }
            Some((Some(bound(lower_raw, true)?), Some(bound(lower_raw, true)?)))
        }
        Some(upper) => {
            let upper_raw = upper.as_str();
            let lower = if lower_raw.is_empty() {
                None
            } else {
                Some(bound(lower_raw, lower_inclusive)?)
            };
            let upper = if upper_raw.is_empty() {
                None
            } else {
                Some(bound(upper_raw, upper_inclusive)?)
            };
            if lower.is_none() && upper.is_none() {
                return None;
            }
            Some((lower, upper))
        }
    }
}

fn parse_hyphen(selector: &str) -> Option<Bounds> {
    static HYPHEN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&HYPHEN, || format!(r"^({NUMERIC})\s*-\s*({NUMERIC})$"))?;
    let captures = re.captures(selector)?;
    let lower = bound(&captures[1], true)?;
    // a partial upper bound covers everything it prefixes: `25-29` allows `29.9`
    let upper_components = components(&captures[2])?;
    let upper = if upper_components.len() >= 3 {
        bound(&captures[2], true)?
    } else {
        bump_last(&upper_components)?
    };
    Some((Some(lower), Some(upper)))
}

fn parse_x_range(selector: &str) -> Option<Bounds> {
    if matches!(selector, "*" | "x" | "X") {
        return Some((None, None));
    }
    static X_RANGE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&X_RANGE, || r"^(\d+(?:\.\d+)*)\.[xX*]$".to_owned())?;
    let captures = re.captures(selector)?;
    let prefix = components(&captures[1])?;
    Some((Some(bound(&captures[1], true)?), Some(bump_last(&prefix)?)))
}

fn parse_tilde(selector: &str) -> Option<Bounds> {
    static TILDE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&TILDE, || format!(r"^~\s*({NUMERIC})$"))?;
    let captures = re.captures(selector)?;
    let given = components(&captures[1])?;
    let stem = if given.len() == 1 { &given[..1] } else { &given[..2] };
    Some((Some(bound(&captures[1], true)?), Some(bump_last(stem)?)))
}

fn parse_caret(selector: &str) -> Option<Bounds> {
    static CARET: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&CARET, || format!(r"^\^\s*({NUMERIC})$"))?;
    let captures = re.captures(selector)?;
    let given = components(&captures[1])?;
    // bump the left-most non-zero component, or the last one given
    let pivot = given
        .iter()
        .position(|c| *c != 0)
        .unwrap_or(given.len() - 1);
    Some((
        Some(bound(&captures[1], true)?),
        Some(bump_last(&given[..=pivot])?),
    ))
}

fn parse_comparators(selector: &str) -> Option<Bounds> {
    static COMPARATOR: OnceLock<Option<Regex>> = OnceLock::new();
    let re = cached_regex(&COMPARATOR, || format!(r"^(>=|<=|>|<|=)\s*({NUMERIC})$"))?;
    let mut lower = None;
    let mut upper = None;
    for part in selector.split_whitespace() {
        let captures = re.captures(part)?;
        let raw = &captures[2];
        match &captures[1] {
            ">=" => lower = Some(bound(raw, true)?),
            ">" => lower = Some(bound(raw, false)?),
            "<=" => upper = Some(bound(raw, true)?),
            "<" => upper = Some(bound(raw, false)?),
            _ => {
                lower = Some(bound(raw, true)?);
                upper = Some(bound(raw, true)?);
            }
        }
    }
    if lower.is_none() && upper.is_none() {
        return None;
    }
    Some((lower, upper))
}
