use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::core::types::DocId;

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Initialized,
    Closed,
    IndexStart { doc_id: DocId },
    IndexComplete { doc_id: DocId },
    IndexError { doc_id: DocId, message: String },
    BulkUpdateComplete { count: usize },
    RemoveComplete { doc_id: DocId },
    RemoveError { doc_id: DocId, message: String },
    IndexClear,
    IndexClearError { message: String },
    SearchStart { query: String },
    SearchComplete { query: String, result_count: usize },
    SearchError { query: String, message: String },
    StorageError { message: String },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Initialized => "engine:initialized",
            EngineEvent::Closed => "engine:closed",
            EngineEvent::IndexStart { .. } => "index:start",
            EngineEvent::IndexComplete { .. } => "index:complete",
            EngineEvent::IndexError { .. } => "index:error",
            EngineEvent::BulkUpdateComplete { .. } => "bulk:update:complete",
            EngineEvent::RemoveComplete { .. } => "remove:complete",
            EngineEvent::RemoveError { .. } => "remove:error",
            EngineEvent::IndexClear => "index:clear",
            EngineEvent::IndexClearError { .. } => "index:clear:error",
            EngineEvent::SearchStart { .. } => "search:start",
            EngineEvent::SearchComplete { .. } => "search:complete",
            EngineEvent::SearchError { .. } => "search:error",
            EngineEvent::StorageError { .. } => "storage:error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub event: EngineEvent,
    pub timestamp: DateTime<Utc>,
}

type Listener = Box<dyn Fn(&EventEnvelope) + Send + Sync>;

/// In-process, synchronous event bus. Listener panics are caught and logged, never
/// propagated to the emitter.
#[derive(Default)]
pub struct EventEmitter {
    listeners: RwLock<Vec<Listener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        EventEmitter { listeners: RwLock::new(Vec::new()) }
    }

    pub fn on(&self, listener: impl Fn(&EventEnvelope) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    pub fn emit(&self, event: EngineEvent) {
        let envelope = EventEnvelope { event, timestamp: Utc::now() };
        for listener in self.listeners.read().iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| listener(&envelope)));
            if result.is_err() {
                tracing::error!(event = envelope.event.name(), "event listener panicked");
            }
        }
    }
}

pub type SharedEventEmitter = Arc<EventEmitter>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_reaches_registered_listeners() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        emitter.on(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        emitter.emit(EngineEvent::Initialized);
        emitter.emit(EngineEvent::Closed);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_listener_does_not_abort_emit() {
        let emitter = EventEmitter::new();
        emitter.on(|_| panic!("boom"));
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        emitter.on(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        emitter.emit(EngineEvent::Initialized);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
