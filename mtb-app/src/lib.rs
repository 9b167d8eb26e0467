pub mod app;
pub mod catalog;
pub mod runtime;
pub mod script;
pub mod sink;
pub mod telemetry;

pub use app::{App, Cli};
pub use catalog::{FetchError, fetch_catalog, load_catalog};
pub use runtime::{TrialCommand, run_trial};
pub use script::{ScriptStep, parse_script, play_script};
pub use sink::JsonLinesSink;
