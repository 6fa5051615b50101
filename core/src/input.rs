use crate::error::ValidationError;

/// Resolves `key` against `candidates`: exact match first, then a unique prefix.
pub fn expand_key(key: &str, candidates: &[&'static str]) -> Result<&'static str, ValidationError> {
    let key = key.trim().to_lowercase();

    // 1. Exact match
    if let Some(exact) = candidates.iter().find(|&&c| c == key) {
        return Ok(*exact);
    }

    // 2. Prefix match
    let matches: Vec<&'static str> = candidates
        .iter()
        .filter(|&&c| !key.is_empty() && c.starts_with(key.as_str()))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0]),
        0 => Err(ValidationError::UnknownDay { input: key }),
        _ => Err(ValidationError::AmbiguousDay {
            input: key,
            candidates: matches,
        }),
    }
}

/// Strict count parsing for subject creation: a non-negative whole number or a rejection.
pub fn parse_count(field: &str, input: &str) -> Result<u32, ValidationError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::invalid_count(field, input))
}

/// Lenient count parsing for free-form counters: malformed text reads as 0
/// and negatives clamp to 0.
pub fn parse_count_or_zero(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(n) => clamp_count(n),
        Err(_) => 0,
    }
}

pub fn clamp_count(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Goal parsing: must be a whole number; range is checked by the engine.
pub fn parse_goal(input: &str) -> Result<i64, ValidationError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidGoal {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAYS: [&str; 6] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

    #[test]
    fn test_expand_key() {
        assert_eq!(expand_key("monday", &DAYS).unwrap(), "monday");
        assert_eq!(expand_key("Mon", &DAYS).unwrap(), "monday");
        assert_eq!(expand_key("w", &DAYS).unwrap(), "wednesday");
        assert_eq!(expand_key("sa", &DAYS).unwrap(), "saturday");

        // Ambiguous
        assert!(matches!(
            expand_key("t", &DAYS),
            Err(ValidationError::AmbiguousDay { .. })
        ));

        // Unknown
        assert!(matches!(
            expand_key("sunday", &DAYS),
            Err(ValidationError::UnknownDay { .. })
        ));
        assert!(expand_key("", &DAYS).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("total", " 12 "), Ok(12));
        assert!(parse_count("total", "-1").is_err());
        assert!(parse_count("total", "ten").is_err());
        assert!(parse_count("total", "").is_err());
    }

    #[test]
    fn test_parse_count_or_zero() {
        assert_eq!(parse_count_or_zero("7"), 7);
        assert_eq!(parse_count_or_zero("-3"), 0);
        assert_eq!(parse_count_or_zero("abc"), 0);
    }

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("80"), Ok(80));
        assert_eq!(parse_goal("150"), Ok(150));
        assert!(parse_goal("eighty").is_err());
    }
}
