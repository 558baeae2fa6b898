#![allow(dead_code)]

//! Rough per-call cost accounting, logged alongside every completion.
//! Numbers are USD per million tokens and drift with Anthropic's pricing
//! page; they feed log lines only, never billing.

/// (model prefix, input USD/MTok, output USD/MTok)
const PRICING: &[(&str, f64, f64)] = &[
    ("claude-sonnet-4", 3.0, 15.0),
    ("claude-haiku-3-5", 0.8, 4.0),
    ("claude-opus-4", 15.0, 75.0),
];

const DEFAULT_PRICING: (f64, f64) = (3.0, 15.0);

/// Longest-prefix match against the pricing table, falling back to
/// sonnet-class pricing for unknown models.
pub fn model_pricing(model: &str) -> (f64, f64) {
    PRICING
        .iter()
        .filter(|(prefix, _, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _, _)| prefix.len())
        .map(|(_, input, output)| (*input, *output))
        .unwrap_or(DEFAULT_PRICING)
}

pub fn estimate_cost_usd(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let (input_rate, output_rate) = model_pricing(model);
    (input_tokens as f64 * input_rate + output_tokens as f64 * output_rate) / 1_000_000.0
}

/// Crude 4-chars-per-token estimate, for cache-hit log lines where the
/// API never reported real usage.
pub fn estimate_tokens(text: &str) -> u32 {
    ((text.len() + 3) / 4).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_uses_table_pricing() {
        assert_eq!(model_pricing("claude-sonnet-4-5"), (3.0, 15.0));
        assert_eq!(model_pricing("claude-haiku-3-5-20241022"), (0.8, 4.0));
    }

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        assert_eq!(model_pricing("claude-next-9"), DEFAULT_PRICING);
    }

    #[test]
    fn test_cost_scales_with_tokens() {
        let cost = estimate_cost_usd("claude-sonnet-4-5", 1_000_000, 0);
        assert!((cost - 3.0).abs() < 1e-9);

        let cost = estimate_cost_usd("claude-sonnet-4-5", 0, 1_000_000);
        assert!((cost - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
