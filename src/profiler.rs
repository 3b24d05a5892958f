// profiler.rs
// Scoped timing of the step pipeline, compiled in with the `profiling` feature

use log::info;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionStats {
    pub total: Duration,
    pub calls: u64,
}

impl SectionStats {
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Cumulative time per named section.
#[derive(Default)]
pub struct Profiler {
    sections: HashMap<&'static str, SectionStats>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        let stats = self.sections.entry(name).or_default();
        stats.total += elapsed;
        stats.calls += 1;
    }

    pub fn section(&self, name: &str) -> Option<SectionStats> {
        self.sections.get(name).copied()
    }

    /// Slowest section first.
    pub fn report_sorted(&self) -> Vec<(&'static str, SectionStats)> {
        let mut v: Vec<_> = self.sections.iter().map(|(n, s)| (*n, *s)).collect();
        v.sort_by(|a, b| b.1.total.cmp(&a.1.total));
        v
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    pub fn log_and_clear(&mut self) {
        for (name, stats) in self.report_sorted() {
            info!(
                "[profile] {:<16} {:>10.3?} total, {:>6} calls, {:.3?} mean",
                name,
                stats.total,
                stats.calls,
                stats.mean()
            );
        }
        self.clear();
    }
}

pub struct ProfilerGuard {
    name: &'static str,
    start: Instant,
}

/// Open a section. The guard records into the global profiler when dropped.
pub fn start(name: &'static str) -> ProfilerGuard {
    ProfilerGuard {
        name,
        start: Instant::now(),
    }
}

#[cfg(feature = "profiling")]
impl Drop for ProfilerGuard {
    fn drop(&mut self) {
        crate::PROFILER.lock().record(self.name, self.start.elapsed());
    }
}

/// Time the rest of the enclosing scope when the `profiling` feature is on.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _guard = $crate::profiler::start($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_accumulate() {
        let mut profiler = Profiler::new();
        profiler.record("collision", Duration::from_millis(3));
        profiler.record("collision", Duration::from_millis(5));
        profiler.record("particle_step", Duration::from_millis(1));
        let stats = profiler.section("collision").unwrap();
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.mean(), Duration::from_millis(4));
        assert_eq!(profiler.report_sorted()[0].0, "collision");
        profiler.log_and_clear();
        assert!(profiler.section("collision").is_none());
    }
}
