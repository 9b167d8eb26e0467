use indexmap::IndexMap;
use mtb_core::{Atom, BadgeMetadata, Coordinates, InteractionEvent, InteractionType};

use crate::entry::BadgeInteractionEntry;

/// Tracking state of one stimulus presentation.
///
/// Entries keep insertion order: the first badge touched comes first.
#[derive(Debug, Clone)]
pub struct TrialState {
    stimulus_start_time: i64,
    entries: IndexMap<Atom, BadgeInteractionEntry>,
}

impl TrialState {
    pub fn new(stimulus_start_time: i64) -> Self {
        Self {
            stimulus_start_time,
            entries: IndexMap::new(),
        }
    }

    pub fn stimulus_start_time(&self) -> i64 {
        self.stimulus_start_time
    }

    pub fn entries(&self) -> &IndexMap<Atom, BadgeInteractionEntry> {
        &self.entries
    }

    pub fn entry(&self, badge_id: &str) -> Option<&BadgeInteractionEntry> {
        self.entries.get(&Atom::from(badge_id))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn interaction_count(&self) -> usize {
        self.entries.values().map(|e| e.interactions().len()).sum()
    }

    /// Latency of `ts` relative to mount, clamped at zero.
    pub fn latency_ms(&self, ts: i64) -> u64 {
        ts.saturating_sub(self.stimulus_start_time).max(0) as u64
    }

    /// Appends an event stamped at `timestamp`, creating the badge entry on
    /// first use.
    pub fn record_at(
        &mut self,
        badge_id: Atom,
        interaction_type: InteractionType,
        metadata: &BadgeMetadata,
        timestamp: i64,
        coordinates: Option<Coordinates>,
    ) -> &InteractionEvent {
        self.entries
            .entry(badge_id.clone())
            .or_insert_with(|| BadgeInteractionEntry::new(badge_id, metadata))
            .append(interaction_type, metadata, timestamp, coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_created_lazily_and_kept_in_first_touch_order() {
        let mut trial = TrialState::new(0);
        assert!(trial.is_empty());
        let meta = BadgeMetadata::unknown("x");
        trial.record_at(Atom::from("b"), InteractionType::HoverStart, &meta, 5, None);
        trial.record_at(Atom::from("a"), InteractionType::HoverStart, &meta, 6, None);
        trial.record_at(Atom::from("b"), InteractionType::HoverEnd, &meta, 9, None);
        let ids: Vec<&str> = trial.entries().keys().map(|k| &**k).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(trial.interaction_count(), 3);
        assert!(trial.entry("c").is_none());
    }

    #[test]
    fn first_event_metadata_sticks_to_entry() {
        let mut trial = TrialState::new(0);
        let first = BadgeMetadata {
            label: "First".into(),
            ..BadgeMetadata::default()
        };
        let later = BadgeMetadata {
            label: "Renamed".into(),
            ..BadgeMetadata::default()
        };
        trial.record_at(Atom::from("a"), InteractionType::Click, &first, 1, None);
        let event = trial.record_at(Atom::from("a"), InteractionType::Click, &later, 2, None);
        assert_eq!(event.badge_label, "Renamed");
        assert_eq!(trial.entry("a").map(|e| e.badge_label.as_str()), Some("First"));
    }

    #[test]
    fn latency_clamps_before_mount() {
        let trial = TrialState::new(1_000);
        assert_eq!(trial.latency_ms(900), 0);
        assert_eq!(trial.latency_ms(1_250), 250);
    }
}
