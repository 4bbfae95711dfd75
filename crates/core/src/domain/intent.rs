use serde::{Deserialize, Serialize};

/// Coarse category a user message is routed to. Produced once per message
/// and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Greeting,
    General,
    Product,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::General => "general",
            Self::Product => "product",
        }
    }

    /// Parses a classification token, tolerating surrounding whitespace and
    /// any casing. Anything outside the three valid tokens is rejected.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "greeting" => Some(Self::Greeting),
            "general" => Some(Self::General),
            "product" => Some(Self::Product),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Intent;

    #[test]
    fn parses_valid_tokens_ignoring_case_and_whitespace() {
        assert_eq!(Intent::parse_token("greeting"), Some(Intent::Greeting));
        assert_eq!(Intent::parse_token("  General \n"), Some(Intent::General));
        assert_eq!(Intent::parse_token("PRODUCT"), Some(Intent::Product));
    }

    #[test]
    fn rejects_anything_outside_the_three_categories() {
        assert_eq!(Intent::parse_token(""), None);
        assert_eq!(Intent::parse_token("products"), None);
        assert_eq!(Intent::parse_token("I think this is a greeting"), None);
    }
}
