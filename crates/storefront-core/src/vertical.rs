//! Business Verticals
//!
//! Closed enumeration of the business categories the platform serves.
//! Plans are scoped to a vertical, or to `All` which matches every vertical.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Business category a tenant storefront belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessVertical {
    Restaurant,
    Retail,
    CreativeAgency,
    Wellness,
    /// Plan-side wildcard: applies to every vertical
    All,
}

impl BusinessVertical {
    /// Display label (also the wire label used by the backend)
    pub fn label(&self) -> &'static str {
        match self {
            BusinessVertical::Restaurant => "Restaurant",
            BusinessVertical::Retail => "Retail",
            BusinessVertical::CreativeAgency => "Creative Agency",
            BusinessVertical::Wellness => "Wellness",
            BusinessVertical::All => "All",
        }
    }

    /// Parse a label into a vertical
    ///
    /// Matching is against the explicit mapping table only; no substring
    /// heuristics, so a renamed category fails loudly instead of silently
    /// misclassifying.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_lowercase().as_str() {
            "restaurant" => Ok(BusinessVertical::Restaurant),
            "retail" => Ok(BusinessVertical::Retail),
            "creative agency" | "creative-agency" | "creativeagency" => {
                Ok(BusinessVertical::CreativeAgency)
            }
            "wellness" => Ok(BusinessVertical::Wellness),
            "all" => Ok(BusinessVertical::All),
            other => Err(CoreError::UnknownVertical(other.to_string())),
        }
    }

    /// Whether a plan scoped to `self` is offered to a tenant in `tenant_vertical`
    pub fn offers_to(&self, tenant_vertical: BusinessVertical) -> bool {
        *self == BusinessVertical::All || *self == tenant_vertical
    }
}

impl std::fmt::Display for BusinessVertical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for v in [
            BusinessVertical::Restaurant,
            BusinessVertical::Retail,
            BusinessVertical::CreativeAgency,
            BusinessVertical::Wellness,
            BusinessVertical::All,
        ] {
            assert_eq!(BusinessVertical::from_label(v.label()).unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!(BusinessVertical::from_label("food truck").is_err());
    }

    #[test]
    fn test_all_offers_to_everyone() {
        assert!(BusinessVertical::All.offers_to(BusinessVertical::Retail));
        assert!(!BusinessVertical::Restaurant.offers_to(BusinessVertical::Retail));
        assert!(BusinessVertical::Wellness.offers_to(BusinessVertical::Wellness));
    }
}
