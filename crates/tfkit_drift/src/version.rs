//! Constraint-aware comparison of version strings.
//!
//! Only major/minor granularity matters. Operators such as `~>` or `>=` are
//! stripped before the numbers are read, so `~> 1.5` and `>= 1.5` compare as
//! minor drift rather than a match.

use crate::types::DriftStatus;

const OPERATOR_CHARS: &[char] = &['~', '>', '<', '=', '!'];

/// Compare the core tool constraint. An empty actual value is `missing`.
pub fn compare_core(expected: &str, actual: &str) -> DriftStatus {
    if actual.is_empty() {
        return DriftStatus::Missing;
    }
    if expected == actual {
        return DriftStatus::InSync;
    }
    compare_constraints(expected, actual)
}

/// Compare a provider constraint. An empty expected value is `not-managed`
/// and takes precedence over an empty actual value.
pub fn compare_provider(expected: &str, actual: &str) -> DriftStatus {
    if expected.is_empty() {
        return DriftStatus::NotManaged;
    }
    if actual.is_empty() {
        return DriftStatus::Missing;
    }
    if expected == actual {
        return DriftStatus::InSync;
    }
    compare_constraints(expected, actual)
}

/// Classify two differing constraints by their leading major and minor numbers.
///
/// Unparseable majors resolve to `major-drift`.
pub fn compare_constraints(expected: &str, actual: &str) -> DriftStatus {
    let expected = VersionParts::parse(expected);
    let actual = VersionParts::parse(actual);

    let (Some(expected_major), Some(actual_major)) = (expected.major, actual.major) else {
        return DriftStatus::MajorDrift;
    };

    if expected_major != actual_major {
        DriftStatus::MajorDrift
    } else {
        // Same major: either the minor or only the operator differs.
        DriftStatus::MinorDrift
    }
}

/// Strip leading comparison operators and whitespace from a constraint.
pub fn strip_operators(constraint: &str) -> &str {
    constraint.trim_start_matches(|c: char| OPERATOR_CHARS.contains(&c) || c.is_whitespace())
}

/// Leading numeric components of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionParts {
    pub major: Option<u64>,
    pub minor: Option<u64>,
}

impl VersionParts {
    pub fn parse(constraint: &str) -> Self {
        let mut parts = strip_operators(constraint).trim_end().split('.');
        let major = parts.next().and_then(|p| p.parse().ok());
        let minor = parts.next().and_then(|p| p.parse().ok());
        Self { major, minor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_in_sync() {
        for value in ["~> 1.13", ">= 5.0", "1.2.3", "weird"] {
            assert_eq!(compare_core(value, value), DriftStatus::InSync);
            assert_eq!(compare_provider(value, value), DriftStatus::InSync);
        }
    }

    #[test]
    fn test_minor_drift() {
        assert_eq!(compare_core("~> 1.16", "~> 1.15"), DriftStatus::MinorDrift);
        assert_eq!(compare_provider("~> 6.0", "~> 6.2"), DriftStatus::MinorDrift);
    }

    #[test]
    fn test_major_drift() {
        assert_eq!(compare_provider("~> 6.0", "~> 4.0"), DriftStatus::MajorDrift);
        assert_eq!(compare_core(">= 1.0", "0.15.4"), DriftStatus::MajorDrift);
    }

    #[test]
    fn test_operator_only_difference_is_minor() {
        assert_eq!(compare_core("~> 1.5", ">= 1.5"), DriftStatus::MinorDrift);
        assert_eq!(compare_core("1.5.0", "= 1.5.2"), DriftStatus::MinorDrift);
    }

    #[test]
    fn test_unparseable_is_major() {
        assert_eq!(compare_core("~> 1.5", "latest"), DriftStatus::MajorDrift);
        assert_eq!(compare_provider("abc", "~> 1.0"), DriftStatus::MajorDrift);
    }

    #[test]
    fn test_missing_and_not_managed() {
        assert_eq!(compare_core("~> 1.5", ""), DriftStatus::Missing);
        assert_eq!(compare_provider("~> 6.0", ""), DriftStatus::Missing);
        assert_eq!(compare_provider("", "~> 3.0"), DriftStatus::NotManaged);
        assert_eq!(compare_provider("", ""), DriftStatus::NotManaged);
    }

    #[test]
    fn test_version_parts() {
        let parts = VersionParts::parse(" ~>  1.13.2");
        assert_eq!(parts.major, Some(1));
        assert_eq!(parts.minor, Some(13));

        let parts = VersionParts::parse("!= 4");
        assert_eq!(parts.major, Some(4));
        assert_eq!(parts.minor, None);
    }
}
