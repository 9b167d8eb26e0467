use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, warn};

use mtb_tracking::UiEvent;

use crate::runtime::TrialCommand;

/// One timed UI event, e.g. `{"atMs": 120, "event": "hover_start", "badgeId": "A"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: UiEvent,
}

/// Parses a JSON-lines script. Blank lines and `#` comments are ignored.
pub fn parse_script(body: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Sends each step at its offset from now, then unmounts.
///
/// Without `unmount_at_ms` the unmount follows the last step directly.
pub async fn play_script(
    steps: Vec<ScriptStep>,
    commands: mpsc::Sender<TrialCommand>,
    unmount_at_ms: Option<u64>,
) {
    let start = Instant::now();
    for step in steps {
        time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
        debug!(at_ms = step.at_ms, event = ?step.event, "script step");
        if commands.send(TrialCommand::Ui(step.event)).await.is_err() {
            warn!("trial ended before the script finished");
            return;
        }
    }
    if let Some(at) = unmount_at_ms {
        time::sleep_until(start + Duration::from_millis(at)).await;
    }
    let _ = commands.send(TrialCommand::Unmount).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_skips_comments() {
        let steps = parse_script(
            "# warm-up\n\
             {\"atMs\": 100, \"event\": \"hover_start\", \"badgeId\": \"A\"}\n\
             \n\
             {\"atMs\": 450, \"event\": \"click\", \"badgeId\": \"A\", \"coordinates\": [3, 4]}\n\
             {\"atMs\": 900, \"event\": \"drawer_close\"}\n",
        )
        .unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].at_ms, 100);
        assert_eq!(
            steps[0].event,
            UiEvent::HoverStart {
                badge_id: "A".into()
            }
        );
        assert_eq!(steps[2].event, UiEvent::DrawerClose);
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(parse_script("{\"atMs\": 1, \"event\": \"wave\"}").is_err());
    }
}
