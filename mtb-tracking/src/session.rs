use mtb_core::{Atom, Badge, BadgeMetadata, Coordinates, InteractionType};
use mtb_timing::{CadenceRecorder, CadenceStats, Clock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::TrialAnalysis;
use crate::config::TrackingConfig;
use crate::error::SinkError;
use crate::provenance::ProvenancePort;
use crate::recorder::EventRecorder;
use crate::sink::AnswerSink;
use crate::snapshot::AnswerPayload;
use crate::trial::TrialState;

/// Pointer-level events the badge row and drawer deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum UiEvent {
    HoverStart {
        badge_id: String,
    },
    HoverEnd {
        badge_id: String,
    },
    /// Clicking a badge also opens its drawer.
    Click {
        badge_id: String,
        #[serde(default)]
        coordinates: Option<Coordinates>,
    },
    /// Closes the drawer of the currently selected badge.
    DrawerClose,
}

/// Trial-scoped tracking context of one mounted stimulus.
///
/// Created at mount, fed UI events, flushed periodically and consumed by
/// [`StimulusSession::unmount`], which performs the final save.
pub struct StimulusSession<C: Clock, P: ProvenancePort> {
    config: TrackingConfig,
    recorder: EventRecorder<C>,
    trial: TrialState,
    provenance: P,
    catalog: Vec<Badge>,
    selected: Option<Atom>,
    cadence: CadenceRecorder,
    flushes: usize,
}

impl<C: Clock, P: ProvenancePort> StimulusSession<C, P> {
    pub fn mount(config: TrackingConfig, clock: C, provenance: P) -> Self {
        let started = clock.now_ms();
        info!(
            stimulus_start_time = started,
            persist_interval_ms = config.persist_interval_ms,
            badge_scale = config.badge_scale,
            "stimulus mounted"
        );
        Self {
            cadence: CadenceRecorder::new(config.cadence_samples),
            config,
            recorder: EventRecorder::new(clock),
            trial: TrialState::new(started),
            provenance,
            catalog: Vec::new(),
            selected: None,
            flushes: 0,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn trial(&self) -> &TrialState {
        &self.trial
    }

    pub fn catalog(&self) -> &[Badge] {
        &self.catalog
    }

    pub fn provenance(&self) -> &P {
        &self.provenance
    }

    pub fn selected_badge(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Number of payloads pushed so far, final save included.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Spacing of the periodic saves that reached the sink.
    pub fn cadence(&self) -> CadenceStats {
        self.cadence.stats()
    }

    pub fn load_catalog(&mut self, badges: Vec<Badge>) {
        if badges.is_empty() {
            warn!("badge row is empty");
        } else {
            info!(count = badges.len(), "badge catalog loaded");
        }
        self.catalog = badges;
    }

    fn metadata_for(&self, badge_id: &Atom) -> BadgeMetadata {
        self.catalog
            .iter()
            .find(|b| &b.id == badge_id)
            .map(BadgeMetadata::from)
            .unwrap_or_else(|| BadgeMetadata::unknown(badge_id))
    }

    fn track(
        &mut self,
        badge_id: &Atom,
        interaction_type: InteractionType,
        coordinates: Option<Coordinates>,
    ) {
        let metadata = self.metadata_for(badge_id);
        self.recorder.record(
            &mut self.trial,
            &mut self.provenance,
            badge_id,
            interaction_type,
            &metadata,
            coordinates,
        );
    }

    /// Applies one UI event. Returns `false` when the event had no effect.
    pub fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::HoverStart { badge_id } => {
                self.track(&Atom::from(badge_id), InteractionType::HoverStart, None);
            }
            UiEvent::HoverEnd { badge_id } => {
                self.track(&Atom::from(badge_id), InteractionType::HoverEnd, None);
            }
            UiEvent::Click {
                badge_id,
                coordinates,
            } => {
                let id = Atom::from(badge_id);
                self.track(&id, InteractionType::Click, coordinates);
                self.track(&id, InteractionType::DrawerOpen, None);
                self.selected = Some(id);
            }
            UiEvent::DrawerClose => match self.selected.take() {
                Some(id) => self.track(&id, InteractionType::DrawerClose, None),
                None => {
                    debug!("drawer close without a selected badge");
                    return false;
                }
            },
        }
        true
    }

    pub fn analyze(&self) -> TrialAnalysis {
        self.trial.analyze(self.recorder.clock().now_ms())
    }

    pub fn snapshot(&self) -> AnswerPayload {
        AnswerPayload::build(
            &self.trial,
            &self.catalog,
            self.provenance.export(),
            self.recorder.clock().now_ms(),
        )
    }

    /// Pushes a full snapshot to `sink`.
    pub fn flush<S: AnswerSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), SinkError> {
        let payload = self.snapshot();
        sink.set_answer(&payload)?;
        self.cadence.record_tick(self.recorder.clock().now_ms());
        self.flushes += 1;
        debug!(
            flushes = self.flushes,
            interactions = payload.answers.trial_engagement.total_badge_interactions,
            "answer saved"
        );
        Ok(())
    }

    /// Final save. Consumes the session so nothing can touch it afterwards.
    pub fn unmount<S: AnswerSink + ?Sized>(
        mut self,
        sink: &mut S,
    ) -> Result<AnswerPayload, SinkError> {
        let payload = self.snapshot();
        sink.set_answer(&payload)?;
        self.flushes += 1;

        let cadence = self.cadence.stats();
        info!(
            flushes = self.flushes,
            time_on_stimulus_ms = payload.answers.trial_engagement.time_on_stimulus_ms,
            badges_seen = payload.answers.badge_coverage.badges_seen_count,
            periodic_saves_avg_ms = cadence.average_interval_ms,
            periodic_saves_jitter_ms = cadence.jitter_ms,
            "stimulus unmounted"
        );
        Ok(payload)
    }
}
