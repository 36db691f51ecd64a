use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use fintech_api::{ApiClient, FilePart};
use fintech_assistant::{
    AnswerService, AssistantSession, Delivery, DeliveryMode, ExchangeEvent, ExchangeTarget,
    ExchangeUpdate, Message, ReplyStatus, SidebarAction, SubmitInput, run_exchange,
};
use snafu::ResultExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};

use super::commands::{Command, HELP_TEXT, parse_line};
use super::error::{AppResult, ReadInputSnafu, WriteOutputSnafu};
use super::settings::SettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

enum ShellEvent {
    Input(Option<String>),
    Reply(ExchangeUpdate),
    Unread(u64),
}

/// Line-oriented front end over one [`AssistantSession`].
///
/// Exchanges run as spawned tasks and report back over a channel, so input stays responsive
/// while replies are pending.
pub struct Shell<W> {
    session: AssistantSession,
    service: Arc<dyn AnswerService>,
    client: ApiClient,
    settings: SettingsStore,
    unread: Option<watch::Receiver<u64>>,
    attachment: Option<FilePart>,
    streaming: Option<ExchangeTarget>,
    updates_tx: mpsc::UnboundedSender<ExchangeUpdate>,
    updates_rx: mpsc::UnboundedReceiver<ExchangeUpdate>,
    output: W,
}

impl<W: Write> Shell<W> {
    pub fn new(
        session: AssistantSession,
        service: Arc<dyn AnswerService>,
        client: ApiClient,
        settings: SettingsStore,
        output: W,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            session,
            service,
            client,
            settings,
            unread: None,
            attachment: None,
            streaming: None,
            updates_tx,
            updates_rx,
            output,
        }
    }

    pub fn with_unread_count(mut self, unread: watch::Receiver<u64>) -> Self {
        self.unread = Some(unread);
        self
    }

    pub fn session(&self) -> &AssistantSession {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads commands until `/quit` or end of input. After end of input, pending replies are
    /// still awaited so piped questions get their answers.
    pub async fn run<R>(&mut self, input: R) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut input_open = true;
        self.render_active()?;

        while input_open || self.session.pending_replies() > 0 {
            let event = tokio::select! {
                line = lines.next_line(), if input_open => {
                    ShellEvent::Input(line.context(ReadInputSnafu { stage: "read-input-line" })?)
                }
                Some(update) = self.updates_rx.recv() => ShellEvent::Reply(update),
                Some(count) = next_unread_count(&mut self.unread) => ShellEvent::Unread(count),
            };

            match event {
                ShellEvent::Input(Some(line)) => {
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                }
                ShellEvent::Input(None) => input_open = false,
                ShellEvent::Reply(update) => self.handle_update(update)?,
                ShellEvent::Unread(count) if count > 0 => {
                    self.say(format!("({count} unread notifications, /notifications to view)"))?;
                }
                ShellEvent::Unread(_) => {}
            }
        }

        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> AppResult<Flow> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(error) => {
                self.say(error.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Ask(text) => self.submit(text)?,
            Command::Send => self.submit(String::new())?,
            Command::New => {
                self.session.new_chat();
                self.render_active()?;
            }
            Command::List => self.render_list()?,
            Command::Switch(index) => match self.conversation_at(index) {
                Some(id) => {
                    self.session.handle_sidebar(SidebarAction::Select(id));
                    self.render_active()?;
                }
                None => self.say(format!("no conversation number {index}, see /list"))?,
            },
            Command::Delete(index) => match self.conversation_at(index) {
                Some(id) => {
                    let was_active = self.session.active_id() == Some(id);
                    self.session.handle_sidebar(SidebarAction::Delete(id));
                    if was_active {
                        self.render_active()?;
                    } else {
                        self.render_list()?;
                    }
                }
                None => self.say(format!("no conversation number {index}, see /list"))?,
            },
            Command::Search(query) => {
                self.session.set_search_query(query);
                self.render_list()?;
            }
            Command::Attach(path) => self.attach(&path).await?,
            Command::Detach => {
                self.attachment = None;
                self.say("attachment dropped")?;
            }
            Command::Clear => {
                if self.session.clear_messages() {
                    self.say("conversation cleared")?;
                } else {
                    self.say("cannot clear while a reply is pending")?;
                }
            }
            Command::Bottom => {
                self.session.jump_to_bottom();
                self.render_tail()?;
            }
            Command::Stream(enabled) => self.set_streaming(enabled)?,
            Command::Notifications => self.show_notifications().await?,
            Command::MarkAllRead => match self.client.mark_all_notifications_read().await {
                Ok(status) => self.say(status.message)?,
                Err(error) => self.say(format!("could not update notifications: {error}"))?,
            },
            Command::Help => self.say(HELP_TEXT)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn submit(&mut self, text: String) -> AppResult<()> {
        let input = SubmitInput {
            text,
            attachment: self.attachment.clone(),
        };

        let pending = match self.session.submit(input) {
            Ok(pending) => pending,
            Err(rejection) => return self.say(format!("(not sent: {rejection})")),
        };

        self.attachment = None;
        let mode = if self.settings.settings().stream_replies {
            DeliveryMode::Streamed
        } else {
            DeliveryMode::Single
        };
        tokio::spawn(run_exchange(
            Arc::clone(&self.service),
            pending,
            mode,
            self.updates_tx.clone(),
        ));

        if let Some(title) = self.active_title() {
            self.say(format!("[{title}] waiting for the assistant..."))?;
        }
        Ok(())
    }

    fn handle_update(&mut self, update: ExchangeUpdate) -> AppResult<()> {
        let target = update.target();
        let (terminal, delta) = match &update {
            ExchangeUpdate::Completed { .. } => (true, None),
            ExchangeUpdate::Event { event, .. } => match event {
                ExchangeEvent::Delta(text) => (false, Some(text.clone())),
                event => (event.is_terminal(), None),
            },
        };

        if self.session.apply_update(update) != Delivery::Applied {
            return Ok(());
        }

        if self.session.active_id() != Some(target.conversation_id) {
            if self.streaming == Some(target) {
                self.streaming = None;
            }
            if terminal {
                let title = self
                    .session
                    .repository()
                    .get(target.conversation_id)
                    .map(|conversation| conversation.title.clone())
                    .unwrap_or_default();
                self.say(format!("(reply ready in \"{title}\")"))?;
            }
            return Ok(());
        }

        let follow = self.session.take_scroll_request();
        if let Some(text) = delta {
            if follow {
                if self.streaming == Some(target) {
                    self.write(&text)?;
                } else {
                    // Joining a reply midway shows the text received so far.
                    self.streaming = Some(target);
                    let so_far = self.reply_text(target).unwrap_or(text);
                    self.write(&format!("assistant: {so_far}"))?;
                }
            }
            return Ok(());
        }

        if !terminal {
            return Ok(());
        }

        let streamed = self.streaming.take() == Some(target);
        let Some(message) = self
            .session
            .messages()
            .iter()
            .find(|message| message.id() == target.placeholder_id)
            .cloned()
        else {
            return Ok(());
        };

        if streamed {
            self.say("")?;
            let failed = message
                .as_assistant()
                .is_some_and(|reply| reply.status == ReplyStatus::Failed);
            if !failed {
                let citations = render_citations(&message);
                return if citations.is_empty() {
                    Ok(())
                } else {
                    self.say(citations)
                };
            }
        }

        self.say(render_message(&message))
    }

    async fn attach(&mut self, path: &Path) -> AppResult<()> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let mime_type = mime_type_for(path);
                self.say(format!("attached {file_name} ({mime_type}, {} bytes)", bytes.len()))?;
                self.attachment = Some(FilePart::new(file_name, mime_type, bytes));
            }
            Err(error) => {
                tracing::debug!(%error, path = %path.display(), "attachment read failed");
                self.say(format!("could not read {}: {error}", path.display()))?;
            }
        }
        Ok(())
    }

    fn set_streaming(&mut self, enabled: bool) -> AppResult<()> {
        let mut settings = (*self.settings.settings()).clone();
        settings.stream_replies = enabled;

        match self.settings.update(settings) {
            Ok(()) => self.say(format!(
                "streaming {}",
                if enabled { "enabled" } else { "disabled" }
            )),
            Err(error) => {
                tracing::warn!(%error, "failed to persist streaming preference");
                self.say(format!("could not save setting: {error}"))
            }
        }
    }

    async fn show_notifications(&mut self) -> AppResult<()> {
        let notifications = match self.client.list_notifications().await {
            Ok(notifications) => notifications,
            Err(error) => return self.say(format!("could not load notifications: {error}")),
        };

        if notifications.is_empty() {
            return self.say("no notifications");
        }
        for notification in notifications {
            let marker = if notification.is_read { " " } else { "*" };
            self.say(format!(
                "{marker} #{} [{}] {}",
                notification.id, notification.kind, notification.message
            ))?;
        }

        match self.client.unread_count().await {
            Ok(count) => self.say(format!("{count} unread")),
            Err(error) => {
                tracing::debug!(%error, "unread count unavailable");
                Ok(())
            }
        }
    }

    fn conversation_at(&self, index: usize) -> Option<fintech_storage::ConversationId> {
        self.session
            .visible_conversations()
            .get(index.checked_sub(1)?)
            .map(|conversation| conversation.id)
    }

    fn active_title(&self) -> Option<String> {
        self.session
            .active_conversation()
            .map(|conversation| conversation.title.clone())
    }

    fn render_list(&mut self) -> AppResult<()> {
        let active_id = self.session.active_id();
        let rows = self
            .session
            .visible_conversations()
            .iter()
            .enumerate()
            .map(|(index, conversation)| {
                let marker = if Some(conversation.id) == active_id { ">" } else { " " };
                format!("{marker} {}. {}", index + 1, conversation.title)
            })
            .collect::<Vec<_>>();

        if rows.is_empty() {
            return self.say("no chats found");
        }
        for row in rows {
            self.say(row)?;
        }
        Ok(())
    }

    fn reply_text(&self, target: ExchangeTarget) -> Option<String> {
        self.session
            .messages()
            .iter()
            .find(|message| message.id() == target.placeholder_id)
            .and_then(Message::as_assistant)
            .map(|reply| reply.text.clone())
    }

    fn render_active(&mut self) -> AppResult<()> {
        self.streaming = None;
        let title = self.active_title().unwrap_or_default();
        self.say(format!("=== {title} ==="))?;
        let lines = self
            .session
            .messages()
            .iter()
            .map(render_message)
            .collect::<Vec<_>>();
        if lines.is_empty() {
            return self.say("(no messages yet, type a question or /help)");
        }
        for line in lines {
            self.say(line)?;
        }
        self.session.take_scroll_request();
        Ok(())
    }

    fn render_tail(&mut self) -> AppResult<()> {
        if !self.session.take_scroll_request() {
            return Ok(());
        }
        let Some(last) = self.session.messages().last().cloned() else {
            return Ok(());
        };
        self.say(render_message(&last))
    }

    fn write(&mut self, text: &str) -> AppResult<()> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush())
            .context(WriteOutputSnafu {
                stage: "write-stream-delta",
            })
    }

    fn say(&mut self, text: impl AsRef<str>) -> AppResult<()> {
        writeln!(self.output, "{}", text.as_ref()).context(WriteOutputSnafu {
            stage: "write-line",
        })
    }
}

async fn next_unread_count(unread: &mut Option<watch::Receiver<u64>>) -> Option<u64> {
    let Some(receiver) = unread.as_mut() else {
        return std::future::pending().await;
    };

    match receiver.changed().await {
        Ok(()) => Some(*receiver.borrow_and_update()),
        Err(_) => {
            *unread = None;
            None
        }
    }
}

fn render_message(message: &Message) -> String {
    match message {
        Message::User(user) => match &user.attachment {
            Some(attachment) if user.text.is_empty() => {
                format!("you: [attachment: {}]", attachment.name)
            }
            Some(attachment) => format!("you: {} [attachment: {}]", user.text, attachment.name),
            None => format!("you: {}", user.text),
        },
        Message::Assistant(reply) if reply.status == ReplyStatus::Pending => {
            "assistant: ...".to_string()
        }
        Message::Assistant(reply) => {
            let citations = render_citations(message);
            if citations.is_empty() {
                format!("assistant: {}", reply.text)
            } else {
                format!("assistant: {}\n{citations}", reply.text)
            }
        }
    }
}

fn render_citations(message: &Message) -> String {
    let Some(reply) = message.as_assistant() else {
        return String::new();
    };

    reply
        .citations
        .iter()
        .enumerate()
        .map(|(index, citation)| {
            let mut line = format!("    [{}] {}", index + 1, citation.title);
            if !citation.filename.is_empty() {
                line.push_str(&format!(" ({})", citation.filename));
            }
            if let Some(page) = &citation.page_number {
                line.push_str(&format!(", p. {page}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
