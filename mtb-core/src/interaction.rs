use serde::{Deserialize, Serialize};

use crate::Atom;
use crate::badge::Badge;

/// Kinds of badge interaction a stimulus reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    HoverStart,
    HoverEnd,
    Click,
    DrawerOpen,
    DrawerClose,
}

impl InteractionType {
    /// The opening interaction a closing one pairs with.
    pub fn opening(self) -> Option<Self> {
        match self {
            Self::HoverEnd => Some(Self::HoverStart),
            Self::DrawerClose => Some(Self::DrawerOpen),
            _ => None,
        }
    }

    pub fn is_closing(self) -> bool {
        self.opening().is_some()
    }

    /// Action kind written to the provenance log.
    pub fn provenance_kind(self) -> &'static str {
        match self {
            Self::HoverStart => "hover_start",
            Self::HoverEnd => "hover_end",
            Self::Click => "badge_click",
            Self::DrawerOpen => "drawer_open",
            Self::DrawerClose => "drawer_close",
        }
    }
}

/// Pointer position of a click, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub f64, pub f64);

/// Descriptive snapshot of a badge, copied onto every event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeMetadata {
    pub label: String,
    pub badge_type: Option<String>,
    pub category: Option<Atom>,
    pub topics: Vec<Atom>,
}

impl BadgeMetadata {
    /// Metadata for an id the catalog does not (yet) know about.
    pub fn unknown(badge_id: &str) -> Self {
        Self {
            label: badge_id.to_string(),
            ..Self::default()
        }
    }
}

impl From<&Badge> for BadgeMetadata {
    fn from(badge: &Badge) -> Self {
        Self {
            label: badge.display_label().to_string(),
            badge_type: badge.badge_type.clone(),
            category: badge.kind.clone(),
            topics: badge.topics.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub badge_id: Atom,
    pub badge_label: String,
    pub badge_type: Option<String>,
    pub badge_category: Option<Atom>,
    pub badge_topics: Vec<Atom>,
    pub interaction_type: InteractionType,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Only set on `hover_end` and `drawer_close`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Only set on `click`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl InteractionEvent {
    pub fn new(
        badge_id: Atom,
        interaction_type: InteractionType,
        metadata: &BadgeMetadata,
        timestamp: i64,
    ) -> Self {
        Self {
            badge_id,
            badge_label: metadata.label.clone(),
            badge_type: metadata.badge_type.clone(),
            badge_category: metadata.category.clone(),
            badge_topics: metadata.topics.clone(),
            interaction_type,
            timestamp,
            duration: None,
            coordinates: None,
        }
    }

    /// Duration if present, zero otherwise.
    pub fn duration_ms(&self) -> u64 {
        self.duration.unwrap_or(0)
    }
}
