use ragdesk_core::{ChatView, UploadView};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Upload widget state changed.
    Upload(UploadView),
    /// An ingestion job reached `completed`; emitted once per job.
    UploadCompleted { file_name: String },
    /// Chat transcript or loading state changed.
    Chat(ChatView),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

pub struct ChannelEventSink {
    tx: UnboundedSender<ClientEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: UnboundedSender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ClientEvent) {}
}
