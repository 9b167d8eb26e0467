use mtb_core::{Atom, BadgeMetadata, Coordinates, InteractionEvent, InteractionType};
use mtb_timing::Clock;
use serde_json::json;
use tracing::{debug, warn};

use crate::provenance::ProvenancePort;
use crate::trial::TrialState;

/// Stamps interactions with the clock, stores them in the trial and mirrors
/// them to the provenance log.
#[derive(Debug, Clone)]
pub struct EventRecorder<C: Clock> {
    clock: C,
}

impl<C: Clock> EventRecorder<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn record<P: ProvenancePort + ?Sized>(
        &self,
        trial: &mut TrialState,
        provenance: &mut P,
        badge_id: &Atom,
        interaction_type: InteractionType,
        metadata: &BadgeMetadata,
        coordinates: Option<Coordinates>,
    ) -> InteractionEvent {
        let now = self.clock.now_ms();
        let event = trial
            .record_at(badge_id.clone(), interaction_type, metadata, now, coordinates)
            .clone();
        debug!(
            badge_id = %event.badge_id,
            ?interaction_type,
            timestamp = event.timestamp,
            duration = ?event.duration,
            "badge interaction recorded"
        );

        let mut data = json!({ "badgeId": &*event.badge_id, "label": event.badge_label });
        if let Some(Coordinates(x, y)) = event.coordinates {
            data["coordinates"] = json!([x, y]);
        }
        let kind = interaction_type.provenance_kind();
        if let Err(err) = provenance.append(event.timestamp, kind, data) {
            warn!(%err, badge_id = %event.badge_id, "provenance append failed");
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvenanceError;
    use crate::provenance::InMemoryProvenanceLog;
    use mtb_timing::ManualClock;
    use serde_json::Value;

    struct BrokenStore;

    impl ProvenancePort for BrokenStore {
        fn append(&mut self, _: i64, _: &str, _: Value) -> Result<(), ProvenanceError> {
            Err(ProvenanceError::Unavailable("offline".into()))
        }

        fn export(&self) -> Value {
            Value::Null
        }
    }

    #[test]
    fn stamps_with_clock_and_logs_provenance() {
        let clock = ManualClock::at(1_000);
        let recorder = EventRecorder::new(clock.clone());
        let mut trial = TrialState::new(1_000);
        let mut log = InMemoryProvenanceLog::new();
        let id = Atom::from("a");
        let meta = BadgeMetadata::unknown("a");

        clock.advance(40);
        let event = recorder.record(
            &mut trial,
            &mut log,
            &id,
            InteractionType::Click,
            &meta,
            Some(Coordinates(10.0, 20.0)),
        );

        assert_eq!(event.timestamp, 1_040);
        let record = &log.records()[0];
        assert_eq!(record.kind, "badge_click");
        assert_eq!(record.t, 1_040);
        assert_eq!(record.data["badgeId"], "a");
        assert_eq!(record.data["coordinates"], json!([10.0, 20.0]));
    }

    #[test]
    fn provenance_failure_leaves_tracking_intact() {
        let recorder = EventRecorder::new(ManualClock::at(0));
        let mut trial = TrialState::new(0);
        let id = Atom::from("a");
        let meta = BadgeMetadata::unknown("a");
        recorder.record(
            &mut trial,
            &mut BrokenStore,
            &id,
            InteractionType::HoverStart,
            &meta,
            None,
        );
        assert_eq!(trial.interaction_count(), 1);
    }
}
