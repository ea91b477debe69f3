//! Ragdesk engine: backend transport, job polling and chat session runtime.
mod api;
mod chat;
mod error;
mod poller;
mod settings;
mod sink;
mod timer;
mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use api::{
    HttpRagApi, JobTicket, QueryResponse, RagApi, Transcription, UploadFile, DEPARTMENTS_PATH,
    DOCUMENTS_PATH, HEALTH_PATH, INSERT_TEXT_PATH, QUERY_PATH, STATS_PATH, STATUS_PATH,
    TRANSCRIBE_PATH, UPLOAD_PATH,
};
pub use chat::ChatSession;
pub use error::{RequestError, RequestErrorKind, UploadError};
pub use poller::JobPoller;
pub use settings::{ClientSettings, PollSettings, DEFAULT_BASE_URL};
pub use sink::{ChannelEventSink, ClientEvent, EventSink, NullSink};
pub use timer::TimerHandle;
pub use transport::{ApiClient, RequestBody, RequestOptions};

/// State behind these mutexes is replaced wholesale on each update, so a
/// poisoned lock still holds a consistent value.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
