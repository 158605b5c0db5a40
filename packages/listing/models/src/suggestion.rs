//! Location autocomplete suggestions.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which field of a listing a suggestion was derived from.
///
/// Variants are declared in ranking priority order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SuggestionType {
    /// A street address.
    Address,
    /// A city + state pair.
    City,
    /// A ZIP code.
    PostalCode,
}

impl SuggestionType {
    /// Tie-break priority when ranking (lower sorts first).
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Address => 0,
            Self::City => 1,
            Self::PostalCode => 2,
        }
    }
}

/// A single autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Stable identifier (`address-<LIST_NO>`, `city-<TOWN>-<STATE>`,
    /// `zip-<ZIP>`).
    pub id: String,
    /// Kind of suggestion.
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    /// Address line (address suggestions only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    /// State code.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state_code: Option<String>,
    /// ZIP code.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub postal_code: Option<String>,
}

impl Suggestion {
    /// The value the suggestion is ranked on: the address line, else the
    /// city, else the ZIP code. ZIP suggestions carry their city, so they
    /// rank on the city name.
    #[must_use]
    pub fn display_value(&self) -> &str {
        self.line
            .as_deref()
            .or(self.city.as_deref())
            .or(self.postal_code.as_deref())
            .unwrap_or_default()
    }

    /// Key used to suppress duplicate suggestions.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        let city = self.city.as_deref().unwrap_or_default();
        let state = self.state_code.as_deref().unwrap_or_default();
        match self.kind {
            SuggestionType::Address => format!(
                "{}, {city}, {state}",
                self.line.as_deref().unwrap_or_default()
            ),
            SuggestionType::City => format!("{city}, {state}"),
            SuggestionType::PostalCode => self.postal_code.clone().unwrap_or_default(),
        }
    }
}
