use std::future::Future;

use mtb_core::Badge;
use mtb_timing::Clock;
use mtb_tracking::{
    AnswerPayload, AnswerSink, ProvenancePort, SinkError, StimulusSession, UiEvent,
};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum TrialCommand {
    Ui(UiEvent),
    Unmount,
}

/// Drives one mounted stimulus until it is unmounted.
///
/// UI commands, the catalog load and the periodic save are handled one at a
/// time on the calling task. The first periodic save fires one interval after
/// mount. A rejected periodic save is logged and the trial keeps running. An
/// `Unmount` command or a closed channel stops the timer and performs the
/// single final save, whose result is returned.
pub async fn run_trial<C, P, S, F>(
    mut session: StimulusSession<C, P>,
    catalog: F,
    mut commands: mpsc::Receiver<TrialCommand>,
    sink: &mut S,
) -> Result<AnswerPayload, SinkError>
where
    C: Clock,
    P: ProvenancePort,
    S: AnswerSink + ?Sized,
    F: Future<Output = Vec<Badge>>,
{
    let period = session.config().persist_interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(catalog);
    let mut catalog_pending = true;

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(TrialCommand::Ui(event)) => {
                    session.handle_event(event);
                }
                Some(TrialCommand::Unmount) | None => break,
            },
            badges = &mut catalog, if catalog_pending => {
                catalog_pending = false;
                session.load_catalog(badges);
            }
            _ = ticker.tick() => {
                if let Err(err) = session.flush(sink) {
                    warn!(%err, "periodic save failed");
                }
            }
        }
    }

    drop(ticker);
    debug!("periodic save stopped");
    session.unmount(sink)
}
