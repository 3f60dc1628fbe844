use std::fmt;

/// Popularity tier derived from an exercise's view count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Popularity {
    High,
    Medium,
    Low,
}

impl Popularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Popularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a human-readable view count such as `31.2K`, `1.4M` or `2,500`
///
/// Thousands separators are stripped before the suffix is applied. Anything
/// that does not parse yields `None`, never zero, so an unknown count stays
/// distinguishable from an exercise nobody has viewed.
pub fn parse_view_count(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let (number, multiplier) = if let Some(base) = cleaned.strip_suffix('K') {
        (base.trim(), 1_000.0)
    } else if let Some(base) = cleaned.strip_suffix('M') {
        (base.trim(), 1_000_000.0)
    } else {
        return cleaned.parse::<u64>().ok();
    };

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Classifies a normalized view count; an unknown count is never guessed
pub fn classify_popularity(view_count: Option<u64>) -> Option<Popularity> {
    view_count.map(|views| {
        if views > 1_000_000 {
            Popularity::High
        } else if views > 100_000 {
            Popularity::Medium
        } else {
            Popularity::Low
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_count_suffixes() {
        assert_eq!(parse_view_count("31.2K"), Some(31_200));
        assert_eq!(parse_view_count("1.4M"), Some(1_400_000));
        assert_eq!(parse_view_count("2,500"), Some(2_500));
        assert_eq!(parse_view_count(" 12K "), Some(12_000));
        assert_eq!(parse_view_count("1,234.5K"), Some(1_234_500));
    }

    #[test]
    fn test_parse_view_count_unknown_is_none() {
        assert_eq!(parse_view_count(""), None);
        assert_eq!(parse_view_count("   "), None);
        assert_eq!(parse_view_count("lots"), None);
        assert_eq!(parse_view_count("K"), None);
        assert_eq!(parse_view_count("-5K"), None);
    }

    #[test]
    fn test_parse_view_count_zero_is_zero() {
        assert_eq!(parse_view_count("0"), Some(0));
    }

    #[test]
    fn test_classify_popularity() {
        assert_eq!(classify_popularity(Some(1_500_000)), Some(Popularity::High));
        assert_eq!(classify_popularity(Some(250_000)), Some(Popularity::Medium));
        assert_eq!(classify_popularity(Some(5_000)), Some(Popularity::Low));
        assert_eq!(classify_popularity(None), None);
    }

    #[test]
    fn test_classify_popularity_boundaries() {
        assert_eq!(classify_popularity(Some(1_000_000)), Some(Popularity::Medium));
        assert_eq!(classify_popularity(Some(100_000)), Some(Popularity::Low));
        assert_eq!(classify_popularity(Some(0)), Some(Popularity::Low));
    }
}
