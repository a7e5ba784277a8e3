//! Session console: action handlers and local state.
//!
//! Each handler follows the same shape: validate the input, optionally append
//! to a local log, dispatch, then reflect the reply into the owning log or
//! region and emit the matching `ConsoleEvent`. Failures arrive as
//! `{"error": ...}` replies and are rendered in place of the expected
//! content; nothing here returns an error to the caller.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::dispatch::{ApiReply, Dispatcher};
use crate::events::{ChatEntry, ConsoleEvent, Presenter};
use crate::identity::SessionIdentity;
use crate::routing::Endpoints;
use crate::upload::{FileSelection, TruncationPolicy, context_wall};

const CHAT_FALLBACK: &str = "Error";
const CODE_FALLBACK: &str = "// No code generated";
pub const UPLOAD_STARTED: &str = "Processing...";
pub const UPLOAD_FINISHED: &str = "Uploaded to session memory! Reload context.";

/// Outcome of one upload batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// add-interaction requests issued
    pub sent: usize,
    /// files that could not be read
    pub skipped: usize,
}

/// Client-side session state plus the routing table for every action.
pub struct SessionConsole<P> {
    identity: SessionIdentity,
    endpoints: Endpoints,
    dispatcher: Dispatcher,
    upload_policy: TruncationPolicy,
    presenter: P,
    chat_log: Vec<ChatEntry>,
    terminal_log: Vec<String>,
    context: Option<Value>,
    code_output: Option<String>,
}

impl<P: Presenter> SessionConsole<P> {
    pub fn new(identity: SessionIdentity, endpoints: Endpoints, presenter: P) -> Self {
        Self {
            identity,
            endpoints,
            dispatcher: Dispatcher::new(),
            upload_policy: TruncationPolicy::default(),
            presenter,
            chat_log: Vec::new(),
            terminal_log: Vec::new(),
            context: None,
            code_output: None,
        }
    }

    #[must_use]
    pub fn with_upload_policy(mut self, policy: TruncationPolicy) -> Self {
        self.upload_policy = policy;
        self
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn session_id(&self) -> &str {
        self.identity.id()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn chat_log(&self) -> &[ChatEntry] {
        &self.chat_log
    }

    pub fn terminal_log(&self) -> &[String] {
        &self.terminal_log
    }

    /// Most recently fetched context snapshot.
    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    pub fn code_output(&self) -> Option<&str> {
        self.code_output.as_deref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    fn emit(&mut self, event: &ConsoleEvent) {
        self.presenter.present(event);
    }

    /// Fetches the matrix worker root as plain text.
    pub async fn load_api_info(&mut self) {
        let url = self.endpoints.api_info();
        let text = match self.dispatcher.get_text(&url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %format!("{e:#}"), "api info request failed");
                format!("Error: {e:#}")
            }
        };
        self.emit(&ConsoleEvent::ApiInfo { text });
    }

    /// Replaces the context snapshot with the session worker's current view.
    pub async fn load_context(&mut self) {
        let url = self.endpoints.context(self.identity.id());
        let snapshot = self.dispatcher.get(&url).await.into_value();
        self.context = Some(snapshot.clone());
        self.emit(&ConsoleEvent::ContextReplaced { snapshot });
    }

    /// Clears server-side session memory, then reloads the context.
    pub async fn clear_session(&mut self) {
        let url = self.endpoints.clear_session();
        let reply = self
            .dispatcher
            .post(&url, &json!({ "sessionId": self.identity.id() }))
            .await;
        if let Some(error) = reply.error() {
            warn!(%error, "clear session failed");
        }
        self.load_context().await;
    }

    /// Sends a chat message. Blank input is ignored.
    pub async fn send_chat(&mut self, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        self.append_chat(ChatEntry::user(message));

        let url = self.endpoints.chat();
        let reply = self
            .dispatcher
            .post(
                &url,
                &json!({ "message": message, "sessionId": self.identity.id() }),
            )
            .await;
        self.append_chat(ChatEntry::assistant(
            reply.field_or_error("response", CHAT_FALLBACK),
        ));
    }

    fn append_chat(&mut self, entry: ChatEntry) {
        self.chat_log.push(entry.clone());
        self.emit(&ConsoleEvent::ChatAppended { entry });
    }

    /// Requests generated code and replaces the code region. Blank prompts are ignored.
    pub async fn generate_code(&mut self, prompt: &str, language: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return;
        }
        let url = self.endpoints.code();
        let reply = self
            .dispatcher
            .post(
                &url,
                &json!({
                    "prompt": prompt,
                    "language": language.trim(),
                    "sessionId": self.identity.id(),
                }),
            )
            .await;
        let code = reply.field_or_error("code", CODE_FALLBACK);
        self.code_output = Some(code.clone());
        self.emit(&ConsoleEvent::CodeReplaced { code });
    }

    /// Runs a sandbox terminal command. Blank input is ignored.
    pub async fn run_command(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        self.append_terminal(format!("$ {command}"));

        let route = self.endpoints.terminal(command);
        debug!(file_action = route.is_file_action(), url = route.url(), "terminal route");
        let reply = self.dispatcher.get(route.url()).await;
        self.append_terminal(reply.pretty());
    }

    fn append_terminal(&mut self, line: String) {
        self.terminal_log.push(line.clone());
        self.emit(&ConsoleEvent::TerminalAppended { line });
    }

    /// Uploads every selected file as one add-interaction, in order, then reloads the context.
    ///
    /// Each request is awaited before the next file is read. There is no
    /// rollback: a failure part-way leaves earlier files applied.
    pub async fn upload(&mut self, selection: &FileSelection) -> UploadSummary {
        let mut summary = UploadSummary::default();
        if selection.is_empty() {
            return summary;
        }
        self.upload_status(UPLOAD_STARTED.to_string());

        let url = self.endpoints.add_interaction();
        for file in selection.files() {
            let text = match file.read_text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.path.display(), error = %format!("{e:#}"), "skipping unreadable file");
                    summary.skipped += 1;
                    self.upload_status(format!("Skipped {}: {e:#}", file.name));
                    continue;
                }
            };

            let payload = json!({
                "sessionId": self.identity.id(),
                "user": context_wall(&file.name, &text, self.upload_policy),
            });
            let reply: ApiReply = self.dispatcher.post(&url, &payload).await;
            if let Some(error) = reply.error() {
                warn!(file = %file.name, %error, "add-interaction failed");
            }
            summary.sent += 1;
        }

        info!(sent = summary.sent, skipped = summary.skipped, "upload batch finished");
        self.upload_status(UPLOAD_FINISHED.to_string());
        self.load_context().await;
        summary
    }

    fn upload_status(&mut self, text: String) {
        self.emit(&ConsoleEvent::UploadStatus { text });
    }
}
