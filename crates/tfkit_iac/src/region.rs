//! AWS region naming.

/// Compact form of an AWS region name.
///
/// Numeric and short (two letters or fewer) segments are kept, longer
/// segments collapse to their first letter: `eu-central-1` becomes `euc1`,
/// `us-west-2` becomes `usw2`.
pub fn short_region(region: &str) -> String {
    region
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let first = part.chars().next().unwrap_or_default();
            if first.is_ascii_digit() || part.chars().count() <= 2 {
                part.to_string()
            } else {
                first.to_string()
            }
        })
        .collect()
}
