pub mod cadence;
pub mod clock;

pub use cadence::{CadenceRecorder, CadenceStats};
pub use clock::{Clock, ManualClock, SystemClock};
