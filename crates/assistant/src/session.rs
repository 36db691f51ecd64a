use std::collections::HashMap;

use fintech_api::FilePart;
use fintech_storage::{ConversationId, MessageId, SnapshotStore};

use super::conversation::Conversation;
use super::error::{ExchangeResult, SubmitRejection};
use super::exchange::{
    ExchangeEvent, ExchangeReply, ExchangeRequest, ExchangeTarget, ExchangeUpdate,
    PendingExchange,
};
use super::message::{
    AssistantMessage, Attachment, ERROR_REPLY_TEXT, Message, ReplyStatus, UserMessage,
};
use super::projector::ActiveSession;
use super::remote::EMPTY_ANSWER_TEXT;
use super::repository::{ConversationRepository, DeleteOutcome, Persist};
use super::scroll::{ScrollCoordinator, ScrollMetrics};

pub const DEFAULT_NARROW_VIEWPORT_WIDTH: u32 = 768;
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Below this width, selecting a conversation closes the sidebar.
    pub narrow_viewport_width: u32,
    pub viewport_width: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            narrow_viewport_width: DEFAULT_NARROW_VIEWPORT_WIDTH,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }
    }
}

/// Text and optional file of one submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitInput {
    pub text: String,
    pub attachment: Option<FilePart>,
}

impl SubmitInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: FilePart) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// One sidebar gesture. A row click selects and its delete control deletes; never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarAction {
    Select(ConversationId),
    Delete(ConversationId),
}

/// What happened to a reply delivered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// The reply updated its placeholder.
    Applied,
    /// The target is no longer awaiting this reply.
    Stale,
    /// The originating conversation was deleted.
    Dropped,
}

/// Conversation history, active thread, scroll state and in-flight replies of one assistant
/// screen.
#[derive(Debug)]
pub struct AssistantSession {
    repository: ConversationRepository,
    projection: ActiveSession,
    scroll: ScrollCoordinator,
    in_flight: HashMap<ConversationId, MessageId>,
    search_query: String,
    sidebar_open: bool,
    options: SessionOptions,
}

impl AssistantSession {
    pub fn open(snapshots: SnapshotStore, options: SessionOptions) -> Self {
        let repository = ConversationRepository::restore(snapshots);
        let mut projection = ActiveSession::new();
        projection.load_active(&repository);
        let mut scroll = ScrollCoordinator::new();
        scroll.reset();

        Self {
            repository,
            projection,
            scroll,
            in_flight: HashMap::new(),
            search_query: String::new(),
            sidebar_open: true,
            options,
        }
    }

    pub fn repository(&self) -> &ConversationRepository {
        &self.repository
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.repository.active_id()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.repository.active()
    }

    /// Messages of the active conversation, as displayed.
    pub fn messages(&self) -> &[Message] {
        self.projection.messages()
    }

    pub fn is_in_sync(&self) -> bool {
        self.projection.is_in_sync(&self.repository)
    }

    pub fn is_awaiting_reply(&self, conversation_id: ConversationId) -> bool {
        self.in_flight.contains_key(&conversation_id)
    }

    /// Number of conversations still waiting on a reply.
    pub fn pending_replies(&self) -> usize {
        self.in_flight.len()
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn on_user_scroll(&mut self, metrics: ScrollMetrics) {
        self.scroll.update_follow_state(metrics);
    }

    pub fn jump_to_bottom(&mut self) {
        self.scroll.jump_to_bottom();
    }

    /// Returns whether the view should move to the bottom now.
    pub fn take_scroll_request(&mut self) -> bool {
        self.scroll.apply_pending_scroll()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Sidebar rows: conversations whose title matches the search query.
    pub fn visible_conversations(&self) -> Vec<&Conversation> {
        self.repository.search(&self.search_query)
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.options.viewport_width = width;
    }

    pub fn is_narrow_viewport(&self) -> bool {
        self.options.viewport_width < self.options.narrow_viewport_width
    }

    pub fn new_chat(&mut self) -> ConversationId {
        let id = self.repository.create(true);
        self.search_query.clear();
        self.show_active();
        id
    }

    /// Switches to `id`; unknown ids are ignored.
    pub fn select(&mut self, id: ConversationId) -> bool {
        if !self.repository.switch_to(id) {
            return false;
        }

        self.show_active();
        if self.is_narrow_viewport() {
            self.sidebar_open = false;
        }
        true
    }

    pub fn delete(&mut self, id: ConversationId) -> DeleteOutcome {
        let outcome = self.repository.delete(id);
        if let DeleteOutcome::Removed { activated } = outcome {
            if self.in_flight.remove(&id).is_some() {
                tracing::debug!(conversation_id = %id, "deleted conversation had a pending reply");
            }
            if activated.is_some() {
                self.show_active();
            }
        }
        outcome
    }

    pub fn handle_sidebar(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::Select(id) => {
                self.select(id);
            }
            SidebarAction::Delete(id) => {
                self.delete(id);
            }
        }
    }

    /// Empties the active conversation. Refused while its reply is pending.
    pub fn clear_messages(&mut self) -> bool {
        let Some(id) = self.repository.active_id() else {
            return false;
        };
        if self.in_flight.contains_key(&id) {
            return false;
        }

        self.projection
            .edit(&mut self.repository, id, Vec::clear)
            .is_some()
    }

    /// Records the user message and its reply placeholder in the active conversation.
    ///
    /// The returned exchange carries the target every later delivery must name.
    pub fn submit(&mut self, input: SubmitInput) -> Result<PendingExchange, SubmitRejection> {
        let conversation_id = self
            .repository
            .active_id()
            .ok_or(SubmitRejection::NoActiveConversation)?;
        let trimmed = input.text.trim();
        if trimmed.is_empty() && input.attachment.is_none() {
            return Err(SubmitRejection::Empty);
        }
        if self.in_flight.contains_key(&conversation_id) {
            return Err(SubmitRejection::InFlight);
        }

        let user_id = MessageId::new_v7();
        let placeholder_id = MessageId::new_v7();
        let attachment = input
            .attachment
            .as_ref()
            .map(|file| Attachment::for_upload(user_id, &file.file_name, &file.mime_type));
        let title_source = match (&attachment, trimmed.is_empty()) {
            (Some(attachment), true) => attachment.name.clone(),
            _ => trimmed.to_string(),
        };
        let text = input.text;
        let user = Message::User(UserMessage {
            id: user_id,
            text: text.clone(),
            attachment,
        });
        let placeholder = Message::Assistant(AssistantMessage::placeholder(placeholder_id));

        self.projection
            .edit(&mut self.repository, conversation_id, |messages| {
                messages.push(user);
                messages.push(placeholder);
            })
            .ok_or(SubmitRejection::NoActiveConversation)?;
        self.repository
            .rename_if_default(conversation_id, user_id, &title_source);
        self.scroll.request_scroll_to_bottom();
        self.in_flight.insert(conversation_id, placeholder_id);

        let target = ExchangeTarget::new(conversation_id, placeholder_id);
        tracing::debug!(?target, has_attachment = input.attachment.is_some(), "exchange submitted");
        Ok(PendingExchange::new(ExchangeRequest {
            target,
            text,
            attachment: input.attachment,
        }))
    }

    /// Applies the single outcome of a non-streamed exchange.
    pub fn complete(
        &mut self,
        target: ExchangeTarget,
        result: ExchangeResult<ExchangeReply>,
    ) -> Delivery {
        if let Err(delivery) = self.check_target(target) {
            return delivery;
        }

        let applied = self.update_placeholder(target, Persist::Now, |reply| match result {
            Ok(ExchangeReply { text, citations }) => reply.resolve(text, citations),
            Err(error) => {
                tracing::warn!(%error, conversation_id = %target.conversation_id, "exchange failed");
                reply.fail(ERROR_REPLY_TEXT);
            }
        });

        self.in_flight.remove(&target.conversation_id);
        self.finish_delivery(target, applied)
    }

    /// Applies one streamed event. Terminal events release the conversation for new submits.
    pub fn apply_stream_event(&mut self, target: ExchangeTarget, event: ExchangeEvent) -> Delivery {
        if let Err(delivery) = self.check_target(target) {
            return delivery;
        }

        // Partial text stays in memory; the terminal event writes the finished reply.
        let terminal = event.is_terminal();
        let persist = if terminal {
            Persist::Now
        } else {
            Persist::Deferred
        };
        let applied = self.update_placeholder(target, persist, |reply| match event {
            ExchangeEvent::Delta(text) => reply.text.push_str(&text),
            ExchangeEvent::Citations(citations) => reply.citations = citations,
            ExchangeEvent::Done => {
                let text = if reply.text.is_empty() {
                    EMPTY_ANSWER_TEXT.to_string()
                } else {
                    std::mem::take(&mut reply.text)
                };
                let citations = std::mem::take(&mut reply.citations);
                reply.resolve(text, citations);
            }
            ExchangeEvent::Error(message) => {
                tracing::warn!(
                    %message,
                    conversation_id = %target.conversation_id,
                    "answer stream failed"
                );
                reply.fail(ERROR_REPLY_TEXT);
            }
        });

        if terminal {
            self.in_flight.remove(&target.conversation_id);
        }
        self.finish_delivery(target, applied)
    }

    pub fn apply_update(&mut self, update: ExchangeUpdate) -> Delivery {
        match update {
            ExchangeUpdate::Completed { target, result } => self.complete(target, result),
            ExchangeUpdate::Event { target, event } => self.apply_stream_event(target, event),
        }
    }

    fn show_active(&mut self) {
        self.projection.load_active(&self.repository);
        self.scroll.reset();
    }

    fn check_target(&mut self, target: ExchangeTarget) -> Result<(), Delivery> {
        if !self.repository.contains(target.conversation_id) {
            tracing::warn!(
                conversation_id = %target.conversation_id,
                "dropping reply for a deleted conversation"
            );
            return Err(Delivery::Dropped);
        }

        if self.in_flight.get(&target.conversation_id) != Some(&target.placeholder_id) {
            tracing::debug!(?target, "ignoring reply that is no longer awaited");
            return Err(Delivery::Stale);
        }

        Ok(())
    }

    fn update_placeholder(
        &mut self,
        target: ExchangeTarget,
        persist: Persist,
        update: impl FnOnce(&mut AssistantMessage),
    ) -> bool {
        self.projection
            .edit_with(&mut self.repository, target.conversation_id, persist, |messages| {
                let reply = messages
                    .iter_mut()
                    .rev()
                    .find(|message| message.id() == target.placeholder_id)
                    .and_then(Message::as_assistant_mut)
                    .filter(|reply| reply.status == ReplyStatus::Pending);
                match reply {
                    Some(reply) => {
                        update(reply);
                        true
                    }
                    None => false,
                }
            })
            .unwrap_or(false)
    }

    fn finish_delivery(&mut self, target: ExchangeTarget, applied: bool) -> Delivery {
        if !applied {
            tracing::debug!(?target, "reply placeholder is gone");
            return Delivery::Stale;
        }

        if self.repository.active_id() == Some(target.conversation_id) {
            self.scroll.request_scroll_to_bottom_if_following();
        }
        Delivery::Applied
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fintech_storage::{KeyValueStore, MemoryStore};

    use super::*;
    use crate::conversation::SENTINEL_TITLE;
    use crate::error::UnavailableSnafu;
    use crate::message::{Citation, Role};

    fn open() -> (AssistantSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = AssistantSession::open(
            SnapshotStore::new(store.clone()),
            SessionOptions::default(),
        );
        (session, store)
    }

    fn reply(text: &str) -> ExchangeResult<ExchangeReply> {
        Ok(ExchangeReply::new(text, Vec::new()))
    }

    fn assistant(message: &Message) -> &AssistantMessage {
        message.as_assistant().unwrap()
    }

    #[test]
    fn submit_appends_user_message_and_placeholder_together() {
        let (mut session, _) = open();

        let pending = session.submit(SubmitInput::text("What is the repo rate?")).unwrap();

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[0].text(), "What is the repo rate?");
        assert_eq!(messages[1].id(), pending.target().placeholder_id);
        assert!(assistant(&messages[1]).is_pending());
        assert!(assistant(&messages[1]).text.is_empty());
        assert!(session.is_in_sync());
    }

    #[test]
    fn submitted_text_is_kept_verbatim() {
        let (mut session, _) = open();

        let pending = session
            .submit(SubmitInput::text("  Explain   LCR norms\n"))
            .unwrap();

        assert_eq!(pending.request().text, "  Explain   LCR norms\n");
        assert_eq!(session.messages()[0].text(), "  Explain   LCR norms\n");
        assert_eq!(
            session.active_conversation().map(|c| c.title.as_str()),
            Some("Explain LCR norms")
        );
    }

    #[test]
    fn successful_reply_fills_placeholder_in_place() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("repo rate")).unwrap();
        let citations = vec![Citation {
            title: "Monetary policy".to_string(),
            ..Citation::default()
        }];

        let delivery = session.complete(
            pending.target(),
            Ok(ExchangeReply::new("6.5%", citations.clone())),
        );

        assert_eq!(delivery, Delivery::Applied);
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(assistant(&messages[1]).text, "6.5%");
        assert_eq!(assistant(&messages[1]).citations, citations);
        assert_eq!(assistant(&messages[1]).status, ReplyStatus::Done);
        assert!(!session.is_awaiting_reply(pending.target().conversation_id));
        assert!(session.is_in_sync());
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let (mut session, _) = open();
        session.submit(SubmitInput::text("first")).unwrap();

        assert_eq!(
            session.submit(SubmitInput::text("second")),
            Err(SubmitRejection::InFlight)
        );
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn empty_submit_is_rejected_without_mutation() {
        let (mut session, store) = open();
        let before = store.get(fintech_storage::CONVERSATIONS_KEY).unwrap();

        assert_eq!(
            session.submit(SubmitInput::text("   \n")),
            Err(SubmitRejection::Empty)
        );
        assert!(session.messages().is_empty());
        assert_eq!(store.get(fintech_storage::CONVERSATIONS_KEY).unwrap(), before);
    }

    #[test]
    fn failed_reply_shows_inline_error_and_allows_retry() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("hello")).unwrap();
        let failure = UnavailableSnafu {
            stage: "test",
            details: "connection refused".to_string(),
        }
        .fail();

        assert_eq!(session.complete(pending.target(), failure), Delivery::Applied);

        let placeholder = assistant(&session.messages()[1]);
        assert_eq!(placeholder.text, ERROR_REPLY_TEXT);
        assert_eq!(placeholder.status, ReplyStatus::Failed);
        assert!(session.submit(SubmitInput::text("hello again")).is_ok());
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn each_exchange_updates_its_placeholder_once() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("hello")).unwrap();

        assert_eq!(session.complete(pending.target(), reply("first")), Delivery::Applied);
        assert_eq!(session.complete(pending.target(), reply("second")), Delivery::Stale);
        assert_eq!(assistant(&session.messages()[1]).text, "first");
    }

    #[test]
    fn late_reply_lands_in_its_originating_conversation() {
        let (mut session, _) = open();
        let origin = session.active_id().unwrap();
        let pending = session.submit(SubmitInput::text("slow question")).unwrap();
        let other = session.new_chat();
        session.submit(SubmitInput::text("other question")).unwrap();

        let delivery = session.complete(pending.target(), reply("slow answer"));

        assert_eq!(delivery, Delivery::Applied);
        assert_eq!(session.active_id(), Some(other));
        let active = session.messages();
        assert_eq!(active.len(), 2);
        assert!(assistant(&active[1]).is_pending());
        let origin_messages = &session.repository().get(origin).unwrap().messages;
        assert_eq!(assistant(&origin_messages[1]).text, "slow answer");
        assert!(session.is_in_sync());
    }

    #[test]
    fn replies_for_deleted_conversations_are_dropped() {
        let (mut session, _) = open();
        let doomed = session.active_id().unwrap();
        let pending = session.submit(SubmitInput::text("question")).unwrap();
        session.delete(doomed);
        let conversations = session.repository().len();

        assert_eq!(session.complete(pending.target(), reply("answer")), Delivery::Dropped);
        assert_eq!(session.repository().len(), conversations);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn first_user_message_titles_the_conversation_once() {
        let (mut session, _) = open();
        let pending = session
            .submit(SubmitInput::text("What is the latest risk weight for consumer credit today"))
            .unwrap();
        session.complete(pending.target(), reply("125%"));
        session.submit(SubmitInput::text("Another question entirely")).unwrap();

        let conversation = session.active_conversation().unwrap();
        assert_eq!(conversation.title, "What is the latest risk");
    }

    #[test]
    fn attachment_only_submit_titles_with_file_name() {
        let (mut session, _) = open();
        let file = FilePart::new("kyc-circular.pdf", "application/pdf", b"%PDF".to_vec());

        let pending = session.submit(SubmitInput::default().with_attachment(file)).unwrap();

        assert_eq!(session.active_conversation().unwrap().title, "kyc-circular.pdf");
        assert!(pending.request().attachment.is_some());
        let Message::User(user) = &session.messages()[0] else {
            panic!("expected the user message first");
        };
        assert_eq!(user.attachment.as_ref().unwrap().preview_url, None);
    }

    #[test]
    fn reply_does_not_scroll_when_user_reads_history() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("question")).unwrap();
        assert!(session.take_scroll_request());
        session.on_user_scroll(ScrollMetrics::new(3_000.0, 100.0, 600.0));

        session.complete(pending.target(), reply("long answer"));

        assert!(!session.take_scroll_request());
        assert!(session.scroll().shows_jump_control());

        session.submit(SubmitInput::text("follow up")).unwrap();
        assert!(session.take_scroll_request());
        assert!(!session.scroll().shows_jump_control());
    }

    #[test]
    fn background_reply_does_not_scroll_active_view() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("question")).unwrap();
        session.new_chat();
        session.take_scroll_request();

        session.complete(pending.target(), reply("answer"));

        assert!(!session.take_scroll_request());
    }

    #[test]
    fn streamed_reply_accumulates_then_releases_conversation() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("stream please")).unwrap();
        let target = pending.target();

        session.apply_stream_event(target, ExchangeEvent::Delta("Repo ".to_string()));
        session.apply_stream_event(target, ExchangeEvent::Delta("rate".to_string()));
        assert!(session.is_awaiting_reply(target.conversation_id));
        session.apply_stream_event(target, ExchangeEvent::Done);

        let placeholder = assistant(&session.messages()[1]);
        assert_eq!(placeholder.text, "Repo rate");
        assert_eq!(placeholder.status, ReplyStatus::Done);
        assert!(!session.is_awaiting_reply(target.conversation_id));
        assert_eq!(
            session.apply_stream_event(target, ExchangeEvent::Delta("late".to_string())),
            Delivery::Stale
        );
    }

    #[test]
    fn stream_deltas_are_saved_once_the_reply_finishes() {
        let (mut session, store) = open();
        let target = session.submit(SubmitInput::text("repo rate")).unwrap().target();
        let saved = || store.get(fintech_storage::CONVERSATIONS_KEY).unwrap();
        let after_submit = saved();

        session.apply_stream_event(target, ExchangeEvent::Delta("Repo rate ".to_string()));
        session.apply_stream_event(target, ExchangeEvent::Delta("is 6.5%".to_string()));

        assert_eq!(saved(), after_submit);
        assert_eq!(assistant(&session.messages()[1]).text, "Repo rate is 6.5%");
        assert!(session.is_in_sync());

        session.apply_stream_event(target, ExchangeEvent::Done);

        assert!(saved().is_some_and(|snapshot| snapshot.contains("Repo rate is 6.5%")));
    }

    #[test]
    fn background_stream_deltas_are_saved_once_the_reply_finishes() {
        let (mut session, store) = open();
        let target = session.submit(SubmitInput::text("repo rate")).unwrap().target();
        session.new_chat();
        let saved = || store.get(fintech_storage::CONVERSATIONS_KEY).unwrap();
        let after_switch = saved();

        session.apply_stream_event(target, ExchangeEvent::Delta("6.5%".to_string()));
        assert_eq!(saved(), after_switch);

        session.apply_stream_event(target, ExchangeEvent::Done);
        assert!(saved().is_some_and(|snapshot| snapshot.contains("6.5%")));
    }

    #[test]
    fn empty_stream_uses_fallback_text() {
        let (mut session, _) = open();
        let target = session.submit(SubmitInput::text("q")).unwrap().target();

        session.apply_stream_event(target, ExchangeEvent::Done);

        assert_eq!(assistant(&session.messages()[1]).text, EMPTY_ANSWER_TEXT);
    }

    #[test]
    fn narrow_viewport_closes_sidebar_on_select() {
        let (mut session, _) = open();
        let first = session.active_id().unwrap();
        session.new_chat();

        session.handle_sidebar(SidebarAction::Select(first));
        assert!(session.is_sidebar_open());

        session.set_viewport_width(500);
        let second = session.repository().conversations()[0].id;
        session.handle_sidebar(SidebarAction::Select(second));
        assert!(!session.is_sidebar_open());
        assert_eq!(session.active_id(), Some(second));
    }

    #[test]
    fn sidebar_delete_does_not_select() {
        let (mut session, _) = open();
        let kept_active = session.active_id().unwrap();
        let other = session.repository.create(false);

        session.handle_sidebar(SidebarAction::Delete(other));

        assert_eq!(session.active_id(), Some(kept_active));
        assert!(!session.repository().contains(other));
    }

    #[test]
    fn new_chat_clears_search_and_shows_empty_thread() {
        let (mut session, _) = open();
        session.submit(SubmitInput::text("kyc norms")).unwrap();
        session.set_search_query("kyc");
        assert_eq!(session.visible_conversations().len(), 1);

        session.new_chat();

        assert_eq!(session.search_query(), "");
        assert!(session.messages().is_empty());
        assert_eq!(session.active_conversation().unwrap().title, SENTINEL_TITLE);
        assert_eq!(session.visible_conversations().len(), 2);
    }

    #[test]
    fn clearing_is_refused_while_a_reply_is_pending() {
        let (mut session, _) = open();
        let pending = session.submit(SubmitInput::text("q")).unwrap();

        assert!(!session.clear_messages());
        session.complete(pending.target(), reply("a"));
        assert!(session.clear_messages());
        assert!(session.messages().is_empty());
        assert!(session.is_in_sync());
    }
}
