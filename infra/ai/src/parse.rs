//! Pulling structured data out of free-form model replies.

use crate::error::AiError;
use serde::de::DeserializeOwned;

const MAX_TIPS: usize = 3;

/// Numbered list items (`1. text` / `2) text`), 6 to 99 characters long, at most three.
#[must_use]
pub fn parse_tips(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .filter_map(|line| {
            let tip = if let Some((_, rest)) = line.split_once(". ") {
                rest
            } else if let Some((_, rest)) = line.split_once(") ") {
                rest
            } else {
                line.get(1..).unwrap_or_default()
            };
            let tip = tip.trim();
            let len = tip.chars().count();
            (len > 5 && len < 100).then(|| tip.to_owned())
        })
        .take(MAX_TIPS)
        .collect()
}

/// Deserializes the text between the first `{` and the last `}`.
///
/// # Errors
/// [`AiError::InvalidResponse`] when there is no object or it does not match `T`.
pub fn extract_json<T: DeserializeOwned>(reply: &str) -> Result<T, AiError> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        return Err(AiError::InvalidResponse {
            message: "no JSON object in reply".into(),
            context: None,
        });
    };
    if end < start {
        return Err(AiError::InvalidResponse {
            message: "unbalanced JSON object in reply".into(),
            context: None,
        });
    }

    serde_json::from_str(&reply[start..=end]).map_err(|e| AiError::InvalidResponse {
        message: e.to_string().into(),
        context: Some("decoding JSON object".into()),
    })
}

/// Trims whitespace and one pair of surrounding double quotes.
#[must_use]
pub fn strip_quotes(reply: &str) -> String {
    let trimmed = reply.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DishNutrition;

    #[test]
    fn tips_accept_both_numbering_styles() {
        let reply = "Here you go:\n1. Drink water during training\n2) Never skip the warm-up\n3. Watch your posture on every rep\n4. This one is over the limit";
        assert_eq!(
            parse_tips(reply),
            vec![
                "Drink water during training",
                "Never skip the warm-up",
                "Watch your posture on every rep"
            ]
        );
    }

    #[test]
    fn tips_drop_too_short_and_too_long_lines() {
        let long = "x".repeat(100);
        let reply = format!("1. short\n2. {long}\n3. Sleep at least seven hours");
        assert_eq!(parse_tips(&reply), vec!["Sleep at least seven hours"]);
    }

    #[test]
    fn tips_without_separator_keep_rest_of_line() {
        assert_eq!(parse_tips("1Stretch after each session"), vec!["Stretch after each session"]);
    }

    #[test]
    fn json_is_taken_between_outer_braces() -> Result<(), AiError> {
        let reply = "Sure! {\"calories\": 165, \"protein\": 31, \"fat\": 3.6, \"carbs\": 0} enjoy";
        let n: DishNutrition = extract_json(reply)?;
        assert!((n.calories - 165.0).abs() < f64::EPSILON);
        assert!((n.fat - 3.6).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn json_missing_field_is_rejected() {
        let err = extract_json::<DishNutrition>("{\"calories\": 1, \"protein\": 2, \"fat\": 3}")
            .expect_err("carbs missing");
        assert!(matches!(err, AiError::InvalidResponse { .. }));
    }

    #[test]
    fn reply_without_object_is_rejected() {
        assert!(extract_json::<DishNutrition>("no idea").is_err());
        assert!(extract_json::<DishNutrition>("} backwards {").is_err());
    }

    #[test]
    fn quotes_are_stripped_once() {
        assert_eq!(strip_quotes("  \"Hi, Ann!\" "), "Hi, Ann!");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
    }
}
