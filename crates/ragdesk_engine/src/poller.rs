use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ragdesk_core::{
    is_accepted_upload, update_upload, SelectedFile, UploadEffect, UploadMsg, UploadPhase,
    UploadState, UploadView,
};
use ragdesk_logging::{rag_debug, rag_info, rag_warn};

use crate::api::{RagApi, UploadFile};
use crate::sink::{ClientEvent, EventSink};
use crate::timer::TimerHandle;
use crate::{lock, PollSettings};

/// Drives one upload from file selection to a terminal job state.
///
/// Dropping the poller tears it down: the poll timer is cancelled and any
/// status response still in flight is discarded when it arrives.
pub struct JobPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    api: Arc<dyn RagApi>,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    state: Mutex<UploadState>,
    timer: Mutex<Option<TimerHandle>>,
}

impl JobPoller {
    pub fn new(api: Arc<dyn RagApi>, sink: Arc<dyn EventSink>, settings: &PollSettings) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                api,
                sink,
                interval: settings.interval,
                state: Mutex::new(UploadState::with_policy(settings.policy)),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Selects `path` for upload. Returns `false` if it was not accepted.
    pub fn select_file(&self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_accepted_upload(&name) {
            rag_warn!("Ignoring unsupported upload selection {:?}", path);
            return false;
        }
        self.inner.apply(UploadMsg::FileSelected(SelectedFile {
            name,
            path: path.clone(),
        }));
        let selected = self.phase() == UploadPhase::Selected;
        if !selected {
            rag_warn!(
                "Ignoring selection of {:?}: upload already {:?}",
                path,
                self.phase()
            );
        }
        selected
    }

    pub fn clear_file(&self) {
        self.inner.apply(UploadMsg::FileCleared);
    }

    /// Uploads the selected file and, once accepted, starts polling.
    ///
    /// Resolves when the upload request finishes; polling continues in the
    /// background.
    pub async fn upload_file(&self) -> UploadPhase {
        let effects = self.inner.dispatch(UploadMsg::SubmitClicked);
        for effect in effects {
            match effect {
                UploadEffect::Submit { file } => {
                    let msg = self.inner.submit(file).await;
                    self.inner.apply(msg);
                }
                other => self.inner.run_effect(other),
            }
        }
        self.phase()
    }

    /// Stops polling for good. Safe to call more than once.
    pub fn teardown(&self) {
        self.inner.apply(UploadMsg::TornDown);
    }

    pub fn phase(&self) -> UploadPhase {
        lock(&self.inner.state).phase()
    }

    pub fn view(&self) -> UploadView {
        lock(&self.inner.state).view()
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.inner.timer).is_some()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl PollerInner {
    fn dispatch(&self, msg: UploadMsg) -> Vec<UploadEffect> {
        let (effects, view) = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update_upload(state, msg);
            let view = state.consume_dirty().then(|| state.view());
            *guard = state;
            (effects, view)
        };
        if let Some(view) = view {
            self.sink.emit(ClientEvent::Upload(view));
        }
        effects
    }

    fn apply(self: &Arc<Self>, msg: UploadMsg) {
        for effect in self.dispatch(msg) {
            self.run_effect(effect);
        }
    }

    fn run_effect(self: &Arc<Self>, effect: UploadEffect) {
        match effect {
            UploadEffect::Submit { file } => {
                rag_debug!("Submit for {} is only run by upload_file", file.name);
            }
            UploadEffect::ArmPollTimer => {
                let weak = Arc::downgrade(self);
                let timer = TimerHandle::every(self.interval, move || {
                    let Some(inner) = weak.upgrade() else {
                        return ControlFlow::Break(());
                    };
                    inner.apply(UploadMsg::PollTick);
                    ControlFlow::Continue(())
                });
                let previous = lock(&self.timer).replace(timer);
                drop(previous);
                // A teardown racing the arm finds no timer to disarm.
                if lock(&self.state).is_torn_down() {
                    let timer = lock(&self.timer).take();
                    if let Some(mut timer) = timer {
                        timer.cancel();
                    }
                }
            }
            UploadEffect::Poll { job_id, seq } => {
                let weak = Arc::downgrade(self);
                let api = self.api.clone();
                tokio::spawn(async move {
                    let result = api.job_status(&job_id).await;
                    let Some(inner) = weak.upgrade() else {
                        rag_debug!("Dropping status {} for job {}: poller is gone", seq, job_id);
                        return;
                    };
                    let msg = match result {
                        Ok(snapshot) => UploadMsg::PollSucceeded { seq, snapshot },
                        Err(err) => {
                            rag_warn!("Polling error for job {} (poll {}): {}", job_id, seq, err);
                            UploadMsg::PollFailed {
                                seq,
                                message: err.to_string(),
                            }
                        }
                    };
                    inner.apply(msg);
                });
            }
            UploadEffect::DisarmPollTimer => {
                let timer = lock(&self.timer).take();
                if let Some(mut timer) = timer {
                    timer.cancel();
                }
            }
            UploadEffect::NotifyCompleted { file_name } => {
                rag_info!("Ingestion of {} completed", file_name);
                self.sink.emit(ClientEvent::UploadCompleted { file_name });
            }
        }
    }

    async fn submit(&self, file: SelectedFile) -> UploadMsg {
        let upload = match UploadFile::read(&file.path).await {
            Ok(upload) => UploadFile {
                file_name: file.name.clone(),
                ..upload
            },
            Err(err) => {
                rag_warn!("Upload of {} failed: {}", file.name, err);
                return UploadMsg::SubmitFailed {
                    message: err.to_string(),
                };
            }
        };

        match self.api.upload_document(upload).await {
            Ok(ticket) => {
                rag_info!("Upload of {} accepted as job {}", file.name, ticket.job_id);
                UploadMsg::SubmitSucceeded {
                    job_id: ticket.job_id,
                }
            }
            Err(err) => {
                rag_warn!("Upload of {} failed: {}", file.name, err);
                UploadMsg::SubmitFailed {
                    message: err.to_string(),
                }
            }
        }
    }
}
