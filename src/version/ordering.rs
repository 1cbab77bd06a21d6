use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(u64),
    Text(String),
}

impl Token {
    fn compare(&self, other: &Token) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.cmp(b),
            (Token::Number(_), Token::Text(_)) => Ordering::Greater,
            (Token::Text(_), Token::Number(_)) => Ordering::Less,
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
        }
    }
}

/// Relative precedence of a qualifier. Pre-release markers sort below a bare
/// release, unknown qualifiers (`jre`, `android`, ...) above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum QualifierRank {
    Development,
    Alpha,
    Beta,
    Milestone,
    ReleaseCandidate,
    Snapshot,
    Release,
    Other,
}

impl QualifierRank {
    fn of(tokens: &[Token]) -> QualifierRank {
        let marker = match tokens.first() {
            None => return QualifierRank::Release,
            Some(Token::Number(_)) => return QualifierRank::Other,
            Some(Token::Text(text)) => text.as_str(),
        };
        let numbered = matches!(tokens.get(1), Some(Token::Number(_)));
        match marker {
            "dev" | "pre" | "preview" | "ea" | "nightly" | "incubating" => {
                QualifierRank::Development
            }
            "alpha" => QualifierRank::Alpha,
            "a" if numbered => QualifierRank::Alpha,
            "beta" => QualifierRank::Beta,
            "b" if numbered => QualifierRank::Beta,
            "milestone" => QualifierRank::Milestone,
            "m" if numbered => QualifierRank::Milestone,
            "rc" | "cr" => QualifierRank::ReleaseCandidate,
            "snapshot" => QualifierRank::Snapshot,
            "ga" | "final" | "release" => QualifierRank::Release,
            _ => QualifierRank::Other,
        }
    }
}

/// A parsed version: numeric release components followed by an optional
/// qualifier that is compared as a separate, lower-precedence tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    release: Vec<u64>,
    qualifier: Vec<Token>,
    rank: QualifierRank,
}

impl Version {
    /// Returns `None` for anything that does not start with a digit; such
    /// strings appear in real repository metadata and are simply skipped.
    pub fn parse(raw: &str) -> Option<Version> {
        let raw = raw.trim();
        if !raw.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let mut release = Vec::new();
        let mut rest = raw;
        loop {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                break;
            }
            release.push(rest[..digits].parse::<u64>().ok()?);
            rest = &rest[digits..];
            match rest.strip_prefix('.') {
                Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
                _ => break,
            }
        }

        let qualifier = tokenize(rest);
        let rank = QualifierRank::of(&qualifier);
        Some(Version {
            release,
            qualifier,
            rank,
        })
    }

    pub fn major(&self) -> u64 {
        self.component(0)
    }

    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    pub fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    pub fn release_len(&self) -> usize {
        self.release.len()
    }

    pub fn is_prerelease(&self) -> bool {
        self.rank < QualifierRank::Release
    }

    fn compare(&self, other: &Version) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for index in 0..len {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        match self.rank.cmp(&other.rank) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        for (a, b) in self.qualifier.iter().zip(other.qualifier.iter()) {
            match a.compare(b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        self.qualifier.len().cmp(&other.qualifier.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

fn tokenize(qualifier: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut digits = false;

    let flush = |current: &mut String, digits: bool, tokens: &mut Vec<Token>| {
        if current.is_empty() {
            return;
        }
        let token = if digits {
            current
                .parse::<u64>()
                .map(Token::Number)
                .unwrap_or_else(|_| Token::Text(current.clone()))
        } else {
            Token::Text(current.to_ascii_lowercase())
        };
        tokens.push(token);
        current.clear();
    };

    for c in qualifier.chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            flush(&mut current, digits, &mut tokens);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != digits {
            flush(&mut current, digits, &mut tokens);
        }
        digits = is_digit;
        current.push(c);
    }
    flush(&mut current, digits, &mut tokens);
    tokens
}

/// Total order over version strings. Unparseable strings sort below every
/// parseable one, and strings that compare equal as versions (`1.0` vs
/// `1.0.0`) fall back to plain string order so the result is deterministic.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let primary = match (Version::parse(a), Version::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    primary.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn sorted(versions: &[&str]) -> Vec<String> {
        let mut versions: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert_eq!(
            sorted(&["1.10.0", "1.9.2", "1.2", "10.0", "2.0"]),
            vec!["1.2", "1.9.2", "1.10.0", "2.0", "10.0"]
        );
    }

    #[test]
    fn qualifiers_form_a_lower_tier() {
        assert_eq!(
            sorted(&["29.0-jre", "29.0", "29.0-rc1", "29.0-rc2", "29.0-alpha", "28.2-android"]),
            vec!["28.2-android", "29.0-alpha", "29.0-rc1", "29.0-rc2", "29.0", "29.0-jre"]
        );
    }

    #[test]
    fn equal_versions_break_ties_by_string() {
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
    }

    #[test]
    fn parse_release_markers() {
        assert!(Version::parse("1.0-SNAPSHOT").unwrap().is_prerelease());
        assert!(Version::parse("5.0.0-M1").unwrap().is_prerelease());
        assert!(Version::parse("2.0.0.Beta3").unwrap().is_prerelease());
        assert!(!Version::parse("5.3.30.RELEASE").unwrap().is_prerelease());
        assert!(!Version::parse("29.0-jre").unwrap().is_prerelease());
        assert!(!Version::parse("1.2.3").unwrap().is_prerelease());
    }

    #[test]
    fn skip_unparseable_versions() {
        assert!(Version::parse("latest").is_none());
        assert!(Version::parse("").is_none());
        assert!(Version::parse("${guava.version}").is_none());
        assert_eq!(compare_versions("garbage", "0.0.1"), Ordering::Less);
    }

    #[test]
    fn release_components() {
        let version = Version::parse("3.12.1-jre").unwrap();
        assert_eq!(version.major(), 3);
        assert_eq!(version.minor(), 12);
        assert_eq!(version.component(2), 1);
        assert_eq!(version.component(5), 0);
        assert_eq!(version.release_len(), 3);
    }
}
