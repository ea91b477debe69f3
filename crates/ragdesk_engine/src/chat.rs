use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use ragdesk_core::{
    update_chat, ChatEffect, ChatMessage, ChatMsg, ChatState, ChatView, QueryOptions, RequestId,
};
use ragdesk_logging::{rag_debug, rag_error};
use serde_json::Value;

use crate::api::RagApi;
use crate::sink::{ClientEvent, EventSink};
use crate::timer::TimerHandle;
use crate::{lock, ClientSettings};

/// Owns the chat transcript and runs one query per `send_message` call.
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<ChatInner>,
}

struct ChatInner {
    api: Arc<dyn RagApi>,
    sink: Arc<dyn EventSink>,
    status_delays: Vec<Duration>,
    state: Mutex<ChatState>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn RagApi>, sink: Arc<dyn EventSink>, settings: &ClientSettings) -> Self {
        Self {
            inner: Arc::new(ChatInner {
                api,
                sink,
                status_delays: settings.status_delays.clone(),
                state: Mutex::new(ChatState::with_default_mode(settings.default_mode.clone())),
            }),
        }
    }

    /// Appends `text` as a user message, queries the backend and appends the
    /// reply or an error message. Blank text is ignored.
    ///
    /// Loading-status timers live as long as this future; dropping it early
    /// cancels them and discards the reply.
    pub async fn send_message(&self, text: &str, options: QueryOptions) {
        let effects = self.inner.dispatch(ChatMsg::SendRequested {
            text: text.to_string(),
            options,
            at: Utc::now(),
        });

        let mut timers = Vec::new();
        let mut query = None;
        for effect in effects {
            match effect {
                ChatEffect::ArmStatusTimers { request_id } => {
                    timers = self.inner.arm_status_timers(request_id);
                }
                ChatEffect::IssueQuery {
                    request_id,
                    request,
                } => query = Some((request_id, request)),
                ChatEffect::CancelStatusTimers { .. } => {}
            }
        }
        let Some((request_id, request)) = query else {
            return;
        };

        let flight = InFlight {
            inner: &self.inner,
            request_id,
            timers,
            settled: false,
        };
        let msg = match self.inner.api.send_query(&request).await {
            Ok(answer) => ChatMsg::QueryAnswered {
                request_id,
                answer,
                at: Utc::now(),
            },
            Err(err) => {
                rag_error!("Failed to send message: {}", err);
                ChatMsg::QueryFailed {
                    request_id,
                    message: err.to_string(),
                    at: Utc::now(),
                }
            }
        };
        flight.settle(msg);
    }

    /// Empties the transcript. Replies still in flight are appended later.
    pub fn clear_messages(&self) {
        self.inner.dispatch(ChatMsg::ClearRequested);
    }

    pub fn notify_upload_complete(&self, file_name: impl Into<String>) {
        self.inner.dispatch(ChatMsg::UploadCompleted {
            file_name: file_name.into(),
            at: Utc::now(),
        });
    }

    pub fn select_department(&self, department: Option<String>) {
        self.inner.dispatch(ChatMsg::DepartmentSelected(department));
    }

    pub async fn load_departments(&self) {
        match self.inner.api.departments().await {
            Ok(departments) => {
                self.inner.dispatch(ChatMsg::DepartmentsLoaded(departments));
            }
            Err(err) => rag_error!("Failed to load departments: {}", err),
        }
    }

    pub async fn load_documents(&self) {
        match self.inner.api.documents().await {
            Ok(documents) => {
                self.inner.dispatch(ChatMsg::DocumentsLoaded(documents));
            }
            Err(err) => rag_error!("Failed to load documents: {}", err),
        }
    }

    pub async fn check_backend_health(&self) -> Option<Value> {
        match self.inner.api.check_health().await {
            Ok(health) => Some(health),
            Err(err) => {
                rag_error!("Backend health check failed: {}", err);
                None
            }
        }
    }

    pub async fn load_stats(&self) -> Option<Value> {
        match self.inner.api.stats().await {
            Ok(stats) => Some(stats),
            Err(err) => {
                rag_error!("Failed to load stats: {}", err);
                None
            }
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.inner.state).messages().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.state).is_loading()
    }

    pub fn view(&self) -> ChatView {
        lock(&self.inner.state).view()
    }
}

impl ChatInner {
    fn dispatch(&self, msg: ChatMsg) -> Vec<ChatEffect> {
        let (effects, view) = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update_chat(state, msg);
            let view = state.consume_dirty().then(|| state.view());
            *guard = state;
            (effects, view)
        };
        if let Some(view) = view {
            self.sink.emit(ClientEvent::Chat(view));
        }
        effects
    }

    fn arm_status_timers(self: &Arc<Self>, request_id: RequestId) -> Vec<TimerHandle> {
        self.status_delays
            .iter()
            .enumerate()
            .map(|(index, delay)| {
                let weak = Arc::downgrade(self);
                TimerHandle::once(*delay, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(ChatMsg::StatusAdvanced {
                            request_id,
                            stage: index + 1,
                        });
                    }
                })
            })
            .collect()
    }
}

/// Status timers of one outstanding query; released on every exit path.
struct InFlight<'a> {
    inner: &'a ChatInner,
    request_id: RequestId,
    timers: Vec<TimerHandle>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, msg: ChatMsg) {
        self.settled = true;
        let effects = self.inner.dispatch(msg);
        self.cancel_timers(effects);
    }

    fn cancel_timers(&mut self, effects: Vec<ChatEffect>) {
        for effect in effects {
            if let ChatEffect::CancelStatusTimers { request_id } = effect {
                if request_id == self.request_id {
                    self.timers.clear();
                }
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            rag_debug!("Query {:?} abandoned before its reply", self.request_id);
            let effects = self.inner.dispatch(ChatMsg::QueryAbandoned {
                request_id: self.request_id,
            });
            self.cancel_timers(effects);
        }
        self.timers.clear();
    }
}
