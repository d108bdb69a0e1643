use std::sync::mpsc;

use crate::EngineEvent;

/// Receives results produced on the engine runtime.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        // The receiver is gone only when the app is shutting down.
        let _ = self.tx.send(event);
    }
}
