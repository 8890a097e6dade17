use std::time::{Duration, Instant};

use tracing::info;

/// Wall clock time of each stage of one fusion run, in execution order.
#[derive(Debug, Default, Clone)]
pub struct PipelineTimings {
    stages: Vec<(String, Duration)>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `stage` and records how long it took under `name`.
    pub fn time<T>(&mut self, name: &str, stage: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = stage();
        self.stages.push((name.to_string(), start.elapsed()));
        out
    }

    pub fn stage(&self, name: &str) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(stage, _)| stage == name)
            .map(|&(_, duration)| duration)
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|(name, _)| name.as_str())
    }

    pub fn total(&self) -> Duration {
        self.stages.iter().map(|(_, duration)| *duration).sum()
    }

    /// One info line per stage with its share of the run.
    pub fn log_summary(&self) {
        let total = self.total().as_secs_f64();
        for (name, duration) in &self.stages {
            let share = if total > 0.0 {
                100.0 * duration.as_secs_f64() / total
            } else {
                0.0
            };
            info!("{:<20} {:>10.2}ms {:>5.1}%", name, duration.as_secs_f64() * 1000.0, share);
        }
        info!("{:<20} {:>10.2}ms", "total", total * 1000.0);
    }
}
