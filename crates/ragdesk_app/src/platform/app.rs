use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ragdesk_core::{ChatView, MessageId, QueryOptions, UploadView};
use ragdesk_engine::{
    ApiClient, ChannelEventSink, ChatSession, ClientEvent, ClientSettings, EventSink, HttpRagApi,
    JobPoller, RagApi, UploadFile,
};
use ragdesk_logging::{rag_error, rag_info, rag_warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::command::{self, Command, HELP};
use super::render;

pub async fn run(settings: ClientSettings) -> anyhow::Result<()> {
    let client = ApiClient::new(&settings)
        .with_context(|| format!("invalid backend URL {:?}", settings.base_url))?;
    rag_info!("Using backend {}", client.base_url());
    println!("ragdesk connected to {} (/help for commands)", client.base_url());

    let api: Arc<dyn RagApi> = Arc::new(HttpRagApi::new(client));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
    let chat = ChatSession::new(api.clone(), sink.clone(), &settings);

    let mut app = App {
        api,
        sink,
        chat,
        settings,
        uploads: Vec::new(),
        tasks: JoinSet::new(),
        console: Console::default(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if app.handle(command::parse(&line)).await == Flow::Quit {
                    break;
                }
            }
            Some(event) = event_rx.recv() => app.on_event(event),
            Some(joined) = app.tasks.join_next(), if !app.tasks.is_empty() => {
                if let Err(err) = joined {
                    if err.is_panic() {
                        rag_error!("Background task panicked: {}", err);
                    }
                }
            }
        }
    }

    for poller in &app.uploads {
        poller.teardown();
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    api: Arc<dyn RagApi>,
    sink: Arc<dyn EventSink>,
    chat: ChatSession,
    settings: ClientSettings,
    uploads: Vec<Arc<JobPoller>>,
    tasks: JoinSet<()>,
    console: Console,
}

impl App {
    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Ask(text) => self.ask(text),
            Command::Upload(path) => self.upload(path),
            Command::Transcribe(path) => self.transcribe(path),
            Command::Note(text) => self.note(text),
            Command::Departments => {
                self.chat.load_departments().await;
                let view = self.chat.view();
                if view.departments.is_empty() {
                    println!("No departments available.");
                } else {
                    println!("Departments: {}", view.departments.join(", "));
                }
            }
            Command::Department(name) => {
                match &name {
                    Some(name) => println!("Questions now scoped to {name}."),
                    None => println!("Questions now search every department."),
                }
                self.chat.select_department(name);
            }
            Command::Documents => {
                self.chat.load_documents().await;
                println!("{} document(s) indexed.", self.chat.view().document_count);
            }
            Command::Health => match self.chat.check_backend_health().await {
                Some(health) => println!("Backend is up: {health}"),
                None => println!("Backend is unreachable; see the log for details."),
            },
            Command::Stats => match self.chat.load_stats().await {
                Some(stats) => println!("{}", pretty(&stats)),
                None => println!("Statistics unavailable; see the log for details."),
            },
            Command::Clear => {
                self.chat.clear_messages();
                println!("Conversation cleared.");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
            Command::Invalid(reason) => println!("{reason}"),
        }
        Flow::Continue
    }

    fn ask(&mut self, text: String) {
        let chat = self.chat.clone();
        self.tasks.spawn(async move {
            chat.send_message(&text, QueryOptions::default()).await;
        });
    }

    fn upload(&mut self, path: PathBuf) {
        let poller = Arc::new(JobPoller::new(
            self.api.clone(),
            self.sink.clone(),
            &self.settings.poll,
        ));
        if !poller.select_file(&path) {
            println!(
                "Cannot upload {}: supported types are {}.",
                path.display(),
                ragdesk_core::ACCEPTED_EXTENSIONS.join(", ")
            );
            return;
        }
        self.uploads.retain(|poller| !poller.phase().is_terminal());
        self.uploads.push(poller.clone());
        self.tasks.spawn(async move {
            poller.upload_file().await;
        });
    }

    fn transcribe(&mut self, path: PathBuf) {
        let api = self.api.clone();
        let chat = self.chat.clone();
        self.tasks.spawn(async move {
            let file = match UploadFile::read(&path).await {
                Ok(file) => file,
                Err(err) => {
                    rag_warn!("Transcription skipped: {}", err);
                    println!("Cannot read {}: {err}", path.display());
                    return;
                }
            };
            match api.transcribe_audio(file).await {
                Ok(transcription) if !transcription.text.trim().is_empty() => {
                    println!("(transcribed) {}", transcription.text.trim());
                    chat.send_message(&transcription.text, QueryOptions::default())
                        .await;
                }
                Ok(_) => println!("No speech found in {}.", path.display()),
                Err(err) => println!("Transcription failed: {err}"),
            }
        });
    }

    fn note(&mut self, text: String) {
        let api = self.api.clone();
        self.tasks.spawn(async move {
            match api.insert_text(&text).await {
                Ok(_) => println!("Note added to the knowledge base."),
                Err(err) => println!("Could not add note: {err}"),
            }
        });
    }

    fn on_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Upload(view) => self.console.show_upload(&view),
            ClientEvent::UploadCompleted { file_name } => {
                self.chat.notify_upload_complete(file_name);
            }
            ClientEvent::Chat(view) => self.console.show_chat(&view),
        }
    }
}

/// Prints only what changed since the last event.
#[derive(Default)]
struct Console {
    last_upload: Option<String>,
    last_message: Option<MessageId>,
    last_status: Option<String>,
}

impl Console {
    fn show_upload(&mut self, view: &UploadView) {
        let text = render::render_upload(view);
        if self.last_upload.as_deref() != Some(text.as_str()) {
            println!("{text}");
            self.last_upload = Some(text);
        }
    }

    fn show_chat(&mut self, view: &ChatView) {
        for message in &view.messages {
            if self.last_message.is_some_and(|last| message.id <= last) {
                continue;
            }
            println!("{}", render::render_message(message));
            self.last_message = Some(message.id);
        }

        if view.loading_status != self.last_status {
            if let Some(status) = &view.loading_status {
                println!("... {status}");
            }
            self.last_status = view.loading_status.clone();
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
