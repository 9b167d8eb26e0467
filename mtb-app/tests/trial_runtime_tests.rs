use std::io::Write;

use mtb_app::{TrialCommand, load_catalog, parse_script, play_script, run_trial};
use mtb_core::parse_catalog;
use mtb_timing::ManualClock;
use mtb_tracking::{
    AnswerPayload, AnswerSink, InMemoryProvenanceLog, MemorySink, SinkError, StimulusSession,
    TrackingConfig, UiEvent,
};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

fn session(clock: &ManualClock) -> StimulusSession<ManualClock, InMemoryProvenanceLog> {
    StimulusSession::mount(
        TrackingConfig::default(),
        clock.clone(),
        InMemoryProvenanceLog::new(),
    )
}

#[tokio::test(start_paused = true)]
async fn immediate_unmount_saves_once() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel(8);
    tx.send(TrialCommand::Unmount).await.unwrap();

    let mut sink = MemorySink::new();
    let payload = run_trial(session(&clock), async { Vec::new() }, rx, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.payloads().len(), 1);
    assert_eq!(payload.answers.trial_engagement.time_on_stimulus_ms, 0);
    assert_eq!(payload.answers.total_badge_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn saves_every_interval_then_once_at_unmount() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        sleep(Duration::from_millis(12_000)).await;
        tx.send(TrialCommand::Unmount).await.unwrap();
    });

    let mut sink = MemorySink::new();
    run_trial(session(&clock), async { Vec::new() }, rx, &mut sink)
        .await
        .unwrap();

    // ticks at 5 s and 10 s, then the final save at 12 s
    assert_eq!(sink.payloads().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn closed_channel_counts_as_unmount() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel::<TrialCommand>(8);
    drop(tx);

    let mut sink = MemorySink::new();
    run_trial(session(&clock), async { Vec::new() }, rx, &mut sink)
        .await
        .unwrap();
    assert_eq!(sink.payloads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_catalog_still_lands_in_final_answer() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel(8);
    let catalog = async {
        sleep(Duration::from_millis(1_500)).await;
        parse_catalog(r#"[{"id":"A","label":"Alpha"},{"id":"B","label":"Beta"}]"#).unwrap()
    };

    let steps = parse_script(
        "{\"atMs\": 100, \"event\": \"hover_start\", \"badgeId\": \"A\"}\n\
         {\"atMs\": 400, \"event\": \"hover_end\", \"badgeId\": \"A\"}\n\
         {\"atMs\": 2000, \"event\": \"click\", \"badgeId\": \"B\"}\n",
    )
    .unwrap();
    tokio::spawn(play_script(steps, tx, Some(3_000)));

    let mut sink = MemorySink::new();
    let payload = run_trial(session(&clock), catalog, rx, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.payloads().len(), 1);
    let answers = &payload.answers;
    assert_eq!(answers.available_badges.len(), 2);
    assert_eq!(answers.badge_interactions[0].badge_label, "A");
    assert_eq!(answers.badge_interactions[1].badge_label, "Beta");
    assert_eq!(answers.badge_coverage.badges_seen_count, 2);
    assert_eq!(answers.badge_coverage.badges_clicked_count, 1);
}

#[tokio::test(start_paused = true)]
async fn ui_events_flow_into_periodic_saves() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        tx.send(TrialCommand::Ui(UiEvent::Click {
            badge_id: "A".into(),
            coordinates: None,
        }))
        .await
        .unwrap();
        sleep(Duration::from_millis(6_000)).await;
        tx.send(TrialCommand::Ui(UiEvent::DrawerClose)).await.unwrap();
        tx.send(TrialCommand::Unmount).await.unwrap();
    });

    let mut sink = MemorySink::new();
    run_trial(session(&clock), async { Vec::new() }, rx, &mut sink)
        .await
        .unwrap();

    let payloads = sink.payloads();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].answers.total_badge_clicks, 1);
    assert_eq!(payloads[0].answers.badge_tracking_summary.total_drawer_opens, 1);
    assert_eq!(payloads[1].answers.badge_tracking_summary.total_interactions, 3);
}

/// Rejects its first save, keeps the rest.
#[derive(Default)]
struct FlakySink {
    calls: usize,
    saved: MemorySink,
}

impl AnswerSink for FlakySink {
    fn set_answer(&mut self, payload: &AnswerPayload) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls == 1 {
            return Err(SinkError::Rejected("storage unavailable".into()));
        }
        self.saved.set_answer(payload)
    }
}

#[tokio::test(start_paused = true)]
async fn failed_periodic_save_keeps_trial_running() {
    let clock = ManualClock::at(0);
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        sleep(Duration::from_millis(6_000)).await;
        tx.send(TrialCommand::Ui(UiEvent::Click {
            badge_id: "A".into(),
            coordinates: None,
        }))
        .await
        .unwrap();
        sleep(Duration::from_millis(1_000)).await;
        tx.send(TrialCommand::Unmount).await.unwrap();
    });

    let mut sink = FlakySink::default();
    let payload = run_trial(session(&clock), async { Vec::new() }, rx, &mut sink)
        .await
        .unwrap();

    // the 5 s tick is rejected, the final save at 7 s lands
    assert_eq!(sink.calls, 2);
    assert_eq!(sink.saved.payloads().len(), 1);
    assert_eq!(payload.answers.total_badge_clicks, 1);
    assert_eq!(sink.saved.payloads()[0].answers.total_badge_clicks, 1);
}

#[tokio::test]
async fn missing_catalog_file_degrades_to_empty() {
    let config = TrackingConfig {
        catalog_path: Some("/definitely/not/here/badges.json".into()),
        ..TrackingConfig::default()
    };
    assert!(load_catalog(config).await.is_empty());
}

#[tokio::test]
async fn unconfigured_catalog_is_empty() {
    assert!(load_catalog(TrackingConfig::default()).await.is_empty());
}

#[tokio::test]
async fn catalog_file_resolves_against_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("badges.json")).unwrap();
    writeln!(file, r#"{{"badges": [{{"id": "A", "intent": "WARNING"}}]}}"#).unwrap();

    let config = TrackingConfig {
        catalog_path: Some("/badges.json".into()),
        catalog_prefix: format!("{}/", dir.path().display()),
        ..TrackingConfig::default()
    };
    let badges = load_catalog(config).await;
    assert_eq!(badges.len(), 1);
    assert_eq!(&*badges[0].id, "A");
}
