use serde::Serialize;
use std::sync::Mutex;

/// Counters for navigator activity.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub selections: usize,
    pub empty_selections: usize,
    pub steps: usize,
    pub saturated_steps: usize,
    pub viewport_updates: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_selection(&self, empty: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.selections += 1;
            if empty {
                metrics.empty_selections += 1;
            }
        }
    }

    /// `moved` is false when the cursor was already at the end it stepped toward.
    pub fn record_step(&self, moved: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.steps += 1;
            if !moved {
                metrics.saturated_steps += 1;
            }
        }
    }

    pub fn record_viewport_update(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.viewport_updates += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_selection(false);
        metrics.record_selection(true);
        metrics.record_step(true);
        metrics.record_step(false);
        metrics.record_viewport_update();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                selections: 2,
                empty_selections: 1,
                steps: 2,
                saturated_steps: 1,
                viewport_updates: 1,
            }
        );
    }
}
