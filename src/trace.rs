//! Trace sink - fire-and-forget telemetry
//!
//! The sink is an explicitly constructed, injected dependency. Emission
//! is infallible by construction: `emit` returns nothing, so a broken
//! sink can never propagate an error into or block the scoring path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

/// Install a process-wide `tracing` subscriber honoring `RUST_LOG`.
///
/// Idempotent: if a subscriber is already installed, this is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// One observation forwarded to the telemetry backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    /// Name of the traced operation (e.g. `"judgment"`).
    pub name: String,
    /// Operation input, as JSON.
    pub input: serde_json::Value,
    /// Operation output, as JSON.
    pub output: serde_json::Value,
    /// Free-form tags (`"fallback"` marks degraded-path results).
    pub tags: Vec<String>,
    /// When the traced operation started.
    pub start_time: DateTime<Utc>,
}

impl TraceEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: serde_json::Value::Null,
            output: serde_json::Value::Null,
            tags: Vec::new(),
            start_time: Utc::now(),
        }
    }

    /// Attach the operation input.
    #[must_use]
    pub fn input(mut self, input: serde_json::Value) -> Self {
        self.input = input;
        self
    }

    /// Attach the operation output.
    #[must_use]
    pub fn output(mut self, output: serde_json::Value) -> Self {
        self.output = output;
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A fire-and-forget telemetry sink.
pub trait TraceSink: Send + Sync {
    /// Forward one event. Must not block the caller meaningfully and has
    /// no way to fail.
    fn emit(&self, event: TraceEvent);
}

impl<T: TraceSink + ?Sized> TraceSink for &T {
    fn emit(&self, event: TraceEvent) {
        (**self).emit(event);
    }
}

impl<T: TraceSink + ?Sized> TraceSink for std::sync::Arc<T> {
    fn emit(&self, event: TraceEvent) {
        (**self).emit(event);
    }
}

/// Sink that drops everything; the test and default choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn emit(&self, _event: TraceEvent) {}
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn emit(&self, event: TraceEvent) {
        info!(
            name = %event.name,
            tags = ?event.tags,
            input = %event.input,
            output = %event.output,
            "trace"
        );
    }
}

/// Sink that buffers events in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct MemoryTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTraceSink {
    /// Create an empty buffer sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the captured events.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the buffer lock panicked.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TraceSink for MemoryTraceSink {
    fn emit(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = TraceEvent::new("judgment")
            .input(serde_json::json!({"quest": "q-1"}))
            .output(serde_json::json!({"status": "approved"}))
            .tag("fallback");
        assert_eq!(event.name, "judgment");
        assert_eq!(event.tags, vec!["fallback"]);
        assert!(event.start_time.timestamp() > 0);
    }

    #[test]
    fn test_memory_sink_captures() {
        let sink = MemoryTraceSink::new();
        sink.emit(TraceEvent::new("a"));
        sink.emit(TraceEvent::new("b"));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "a");
    }

    #[test]
    fn test_noop_sink_accepts_anything() {
        NoopTraceSink.emit(TraceEvent::new("ignored"));
    }
}
