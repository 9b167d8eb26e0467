use mtb_core::{Atom, BadgeMetadata, Coordinates, InteractionEvent, InteractionType};
use serde::Serialize;
use tracing::debug;

/// Running totals for one badge. Always equal to `BadgeTotals::replay` over
/// the badge's event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeTotals {
    pub total_clicks: u64,
    pub total_hover_ends: u64,
    pub total_hover_time: u64,
    pub max_hover_time: u64,
    pub total_drawer_opens: u64,
    pub total_drawer_closes: u64,
    pub total_drawer_time: u64,
    pub first_interaction_time: Option<i64>,
    pub last_interaction_time: Option<i64>,
    pub first_hover_start_time: Option<i64>,
    pub first_click_time: Option<i64>,
}

impl BadgeTotals {
    pub fn apply(&mut self, event: &InteractionEvent) {
        let ts = event.timestamp;
        self.first_interaction_time = Some(earliest(self.first_interaction_time, ts));
        self.last_interaction_time = Some(self.last_interaction_time.map_or(ts, |t| t.max(ts)));

        match event.interaction_type {
            InteractionType::HoverStart => {
                self.first_hover_start_time = Some(earliest(self.first_hover_start_time, ts));
            }
            InteractionType::HoverEnd => {
                let duration = event.duration_ms();
                self.total_hover_ends += 1;
                self.total_hover_time += duration;
                self.max_hover_time = self.max_hover_time.max(duration);
            }
            InteractionType::Click => {
                self.total_clicks += 1;
                self.first_click_time = Some(earliest(self.first_click_time, ts));
            }
            InteractionType::DrawerOpen => self.total_drawer_opens += 1,
            InteractionType::DrawerClose => {
                self.total_drawer_closes += 1;
                self.total_drawer_time += event.duration_ms();
            }
        }
    }

    /// Recomputes totals from scratch.
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a InteractionEvent>) -> Self {
        let mut totals = Self::default();
        for event in events {
            totals.apply(event);
        }
        totals
    }

    /// Hover plus drawer time.
    pub fn time_on_badge(&self) -> u64 {
        self.total_hover_time + self.total_drawer_time
    }
}

fn earliest(current: Option<i64>, ts: i64) -> i64 {
    current.map_or(ts, |t| t.min(ts))
}

/// Event log and cached totals of a single badge within a trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeInteractionEntry {
    pub badge_id: Atom,
    pub badge_label: String,
    pub badge_type: Option<String>,
    pub badge_category: Option<Atom>,
    pub badge_topics: Vec<Atom>,
    interactions: Vec<InteractionEvent>,
    #[serde(flatten)]
    totals: BadgeTotals,
    #[serde(skip)]
    open_hovers: Vec<i64>,
    #[serde(skip)]
    open_drawers: Vec<i64>,
}

impl BadgeInteractionEntry {
    pub fn new(badge_id: Atom, metadata: &BadgeMetadata) -> Self {
        Self {
            badge_id,
            badge_label: metadata.label.clone(),
            badge_type: metadata.badge_type.clone(),
            badge_category: metadata.category.clone(),
            badge_topics: metadata.topics.clone(),
            interactions: Vec::new(),
            totals: BadgeTotals::default(),
            open_hovers: Vec::new(),
            open_drawers: Vec::new(),
        }
    }

    pub fn interactions(&self) -> &[InteractionEvent] {
        &self.interactions
    }

    pub fn totals(&self) -> &BadgeTotals {
        &self.totals
    }

    /// Appends one event and folds it into the totals.
    ///
    /// Timestamps earlier than the previous event are raised to it, so the
    /// log stays non-decreasing. A closing event consumes the most recent
    /// unmatched opening; without one its duration is zero.
    pub fn append(
        &mut self,
        interaction_type: InteractionType,
        metadata: &BadgeMetadata,
        timestamp: i64,
        coordinates: Option<Coordinates>,
    ) -> &InteractionEvent {
        let timestamp = match self.totals.last_interaction_time {
            Some(last) if timestamp < last => last,
            _ => timestamp,
        };
        let mut event =
            InteractionEvent::new(self.badge_id.clone(), interaction_type, metadata, timestamp);

        match interaction_type {
            InteractionType::HoverStart => self.open_hovers.push(timestamp),
            InteractionType::DrawerOpen => self.open_drawers.push(timestamp),
            InteractionType::HoverEnd | InteractionType::DrawerClose => {
                event.duration = Some(self.close(interaction_type, timestamp));
            }
            InteractionType::Click => event.coordinates = coordinates,
        }

        self.totals.apply(&event);
        let index = self.interactions.len();
        self.interactions.push(event);
        &self.interactions[index]
    }

    fn close(&mut self, interaction_type: InteractionType, timestamp: i64) -> u64 {
        let open = match interaction_type {
            InteractionType::DrawerClose => &mut self.open_drawers,
            _ => &mut self.open_hovers,
        };
        match open.pop() {
            Some(started) => timestamp.saturating_sub(started).max(0) as u64,
            None => {
                debug!(
                    badge_id = %self.badge_id,
                    ?interaction_type,
                    "closing interaction without a matching start"
                );
                0
            }
        }
    }
}
