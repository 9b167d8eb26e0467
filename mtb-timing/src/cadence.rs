use std::collections::VecDeque;

/// Summary of the spacing between recorded ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceStats {
    pub samples: usize,
    pub average_interval_ms: f64,
    pub jitter_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
}

impl CadenceStats {
    fn empty() -> Self {
        Self {
            samples: 0,
            average_interval_ms: 0.0,
            jitter_ms: 0.0,
            min_interval_ms: 0.0,
            max_interval_ms: 0.0,
        }
    }
}

/// Keeps a bounded window of intervals between successive ticks.
#[derive(Debug, Clone)]
pub struct CadenceRecorder {
    last_tick_ms: Option<i64>,
    intervals: VecDeque<u64>,
    max_samples: usize,
}

impl CadenceRecorder {
    pub fn new(max_samples: usize) -> Self {
        Self {
            last_tick_ms: None,
            intervals: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record_tick(&mut self, at_ms: i64) {
        if let Some(last) = self.last_tick_ms {
            if self.intervals.len() >= self.max_samples {
                self.intervals.pop_front();
            }
            self.intervals.push_back(at_ms.saturating_sub(last).max(0) as u64);
        }
        self.last_tick_ms = Some(at_ms);
    }

    pub fn stats(&self) -> CadenceStats {
        if self.intervals.is_empty() {
            return CadenceStats::empty();
        }
        let times: Vec<f64> = self.intervals.iter().map(|&ms| ms as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        CadenceStats {
            samples: times.len(),
            average_interval_ms: avg,
            jitter_ms: var.sqrt(),
            min_interval_ms: min,
            max_interval_ms: max,
        }
    }
}

impl Default for CadenceRecorder {
    fn default() -> Self {
        Self::new(64)
    }
}
