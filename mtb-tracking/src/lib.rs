pub mod analysis;
pub mod config;
pub mod entry;
pub mod error;
pub mod provenance;
pub mod recorder;
pub mod session;
pub mod sink;
pub mod snapshot;
pub mod trial;

pub use analysis::{BadgeAggregate, BadgeCoverage, FirstBadge, TrialAnalysis, TrialEngagement};
pub use config::TrackingConfig;
pub use entry::{BadgeInteractionEntry, BadgeTotals};
pub use error::{ConfigError, ProvenanceError, SinkError};
pub use provenance::{InMemoryProvenanceLog, ProvenancePort, ProvenanceRecord};
pub use recorder::EventRecorder;
pub use session::{StimulusSession, UiEvent};
pub use sink::{AnswerSink, MemorySink};
pub use snapshot::{AnswerPayload, AvailableBadge, StimulusAnswers};
pub use trial::TrialState;
