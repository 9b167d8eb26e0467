use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::Atom;
use crate::error::CatalogError;

/// Intent of a badge, used for chip color and row ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeIntent {
    Confirmation,
    Information,
    Warning,
}

impl BadgeIntent {
    /// Case-insensitive parse; unknown intents yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CONFIRMATION" => Some(Self::Confirmation),
            "INFORMATION" => Some(Self::Information),
            "WARNING" => Some(Self::Warning),
            _ => None,
        }
    }

    pub fn priority(self) -> u32 {
        match self {
            Self::Confirmation => 1,
            Self::Information => 2,
            Self::Warning => 3,
        }
    }
}

/// Priority given to badges without a recognized intent.
pub const UNRANKED_PRIORITY: u32 = 999;

/// A badge as delivered by the catalog JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: Atom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_intent",
        skip_serializing_if = "Option::is_none"
    )]
    pub intent: Option<BadgeIntent>,
    #[serde(default)]
    pub topics: Vec<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
}

impl Badge {
    pub fn new(id: &str) -> Self {
        Self {
            id: Atom::from(id),
            label: None,
            description: None,
            kind: None,
            badge_type: None,
            intent: None,
            topics: Vec::new(),
            link: None,
            avatar: None,
            badge_name: None,
            description_path: None,
            detailed_description: None,
        }
    }

    /// Label shown on the chip, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn display_priority(&self) -> u32 {
        self.intent.map_or(UNRANKED_PRIORITY, BadgeIntent::priority)
    }
}

fn lenient_intent<'de, D>(deserializer: D) -> Result<Option<BadgeIntent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(BadgeIntent::parse))
}

/// Parses a catalog body that is either a badge array or `{ "badges": [...] }`.
///
/// Entries that do not deserialize (for instance a missing `id`) are skipped
/// with a warning so one bad badge does not empty the whole row.
pub fn parse_catalog(body: &str) -> Result<Vec<Badge>, CatalogError> {
    let value: Value = serde_json::from_str(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("badges") {
            Some(Value::Array(items)) => items,
            _ => return Err(CatalogError::Shape),
        },
        _ => return Err(CatalogError::Shape),
    };

    let mut badges = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Badge>(item) {
            Ok(badge) => badges.push(badge),
            Err(err) => warn!(index, %err, "skipping malformed badge entry"),
        }
    }
    Ok(badges)
}

/// Resolves a catalog location against a deployment prefix.
///
/// Absolute `http` URLs are returned untouched; anything else loses a single
/// leading slash and gets `prefix` prepended.
pub fn resolve_catalog_path(path: &str, prefix: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    let clean = path.strip_prefix('/').unwrap_or(path);
    format!("{prefix}{clean}")
}

/// Sorts badges by intent priority, then by label.
pub fn sort_for_display(badges: &mut [Badge]) {
    badges.sort_by(|a, b| {
        a.display_priority()
            .cmp(&b.display_priority())
            .then_with(|| a.label.as_deref().unwrap_or("").cmp(b.label.as_deref().unwrap_or("")))
    });
}
