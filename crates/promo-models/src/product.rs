//! Marketing copy extracted from a landing page.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The seven copy elements an ad video is built from.
///
/// Every field is optional on the wire; a missing element is rendered as a
/// bracketed placeholder when the prompt is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProductInfo {
    /// Product or brand name
    #[serde(default)]
    pub product_name: Option<String>,
    /// Main target audience
    #[serde(default)]
    pub target_audience: Option<String>,
    /// Headline copy from the first view of the page
    #[serde(default)]
    pub catchphrase: Option<String>,
    /// Most important benefit
    #[serde(default)]
    pub benefit1: Option<String>,
    /// Second most important benefit
    #[serde(default)]
    pub benefit2: Option<String>,
    /// Offer (free trial, discount, campaign)
    #[serde(default)]
    pub offer: Option<String>,
    /// Main call-to-action button text
    #[serde(default)]
    pub cta_text: Option<String>,
}

impl ProductInfo {
    /// Number of elements that were actually extracted.
    pub fn filled_count(&self) -> usize {
        [
            &self.product_name,
            &self.target_audience,
            &self.catchphrase,
            &self.benefit1,
            &self.benefit2,
            &self.offer,
            &self.cta_text,
        ]
        .iter()
        .filter(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_count_ignores_blank_values() {
        let info = ProductInfo {
            product_name: Some("Acme".to_string()),
            offer: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(info.filled_count(), 1);
        assert!(!info.is_empty());
        assert!(ProductInfo::default().is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let info: ProductInfo =
            serde_json::from_str(r#"{"product_name": "Acme", "cta_text": "Buy now"}"#).unwrap();
        assert_eq!(info.product_name.as_deref(), Some("Acme"));
        assert_eq!(info.cta_text.as_deref(), Some("Buy now"));
        assert!(info.benefit1.is_none());
    }
}
