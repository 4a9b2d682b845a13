//! Scripted assistant transcripts, one per conversation.

use crate::{
  schema::{ChatMessage, Sender},
  util,
};
use actix_rt::task::JoinHandle;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

pub const GREETING: &str = "Hello! I'm your CrimeGuard assistant. How can I help you today?";

pub const BOT_REPLIES: [&str; 5] = [
  "I understand you want to report a crime. You can use our 'Report Crime' feature from the main dashboard.",
  "To check the status of your report, visit the 'My Reports' section in your profile.",
  "For emergencies, please call your local emergency number immediately instead of using this platform.",
  "You can upload photo evidence when reporting a crime to help with verification.",
  "Our AI system will analyze your report to verify its accuracy based on similar reports and patterns.",
];

// transcripts untouched for this long are dropped on the next write
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct Conversation {
  messages: Vec<ChatMessage>,
  pending: Vec<JoinHandle<()>>,
  touched: Instant,
}

impl Conversation {
  fn is_pending(&self) -> bool {
    self.pending.iter().any(|h| !h.is_finished())
  }
}

pub struct ChatStore {
  conversations: Mutex<HashMap<String, Conversation>>,
  reply_delay: Duration,
  idle_timeout: Duration,
  seeded_at: DateTime<Utc>,
}

impl ChatStore {
  pub fn new(reply_delay: Duration) -> Self {
    ChatStore {
      conversations: Mutex::new(HashMap::new()),
      reply_delay,
      idle_timeout: IDLE_TIMEOUT,
      seeded_at: Utc::now(),
    }
  }

  pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
    self.idle_timeout = idle_timeout;
    self
  }

  fn seed(&self) -> Vec<ChatMessage> {
    vec![ChatMessage {
      id: "1".into(),
      content: GREETING.into(),
      sender: Sender::Bot,
      timestamp: self.seeded_at,
    }]
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
    self.conversations.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn messages(&self, conversation: &str) -> Vec<ChatMessage> {
    match self.lock().get(conversation) {
      Some(c) => c.messages.clone(),
      None => self.seed(),
    }
  }

  fn append(&self, conversation: &str, content: &str, sender: Sender) -> ChatMessage {
    let message = ChatMessage {
      id: util::gen_id(),
      content: content.to_string(),
      sender,
      timestamp: Utc::now(),
    };
    let mut conversations = self.lock();
    self.evict_idle(&mut conversations);
    let c = conversations
      .entry(conversation.to_string())
      .or_insert_with(|| Conversation {
        messages: self.seed(),
        pending: vec![],
        touched: Instant::now(),
      });
    c.messages.push(message.clone());
    c.touched = Instant::now();
    message
  }

  fn evict_idle(&self, conversations: &mut HashMap<String, Conversation>) {
    let before = conversations.len();
    conversations.retain(|_, c| c.is_pending() || c.touched.elapsed() < self.idle_timeout);
    if conversations.len() < before {
      log::debug!("evicted {} idle conversations", before - conversations.len());
    }
  }

  /// Appends a message. A user message schedules one bot reply after the
  /// reply delay; the reply can be cancelled with `close_conversation`.
  pub fn add_message(self: &Arc<Self>, conversation: &str, content: &str, sender: Sender) -> ChatMessage {
    let message = self.append(conversation, content, sender);

    match sender {
      Sender::User => {
        let handle = actix_rt::spawn({
          let store = Arc::clone(self);
          let conversation = conversation.to_string();
          async move {
            actix_rt::time::sleep(store.reply_delay).await;
            let reply = *BOT_REPLIES.choose(&mut rand::thread_rng()).unwrap_or(&BOT_REPLIES[0]);
            store.append(&conversation, reply, Sender::Bot);
          }
        });
        if let Some(c) = self.lock().get_mut(conversation) {
          c.pending.retain(|h| !h.is_finished());
          c.pending.push(handle);
        }
      }
      Sender::Bot => {}
    }
    message
  }

  pub fn has_pending_reply(&self, conversation: &str) -> bool {
    self
      .lock()
      .get(conversation)
      .map_or(false, Conversation::is_pending)
  }

  /// Back to the greeting. Replies already scheduled still arrive; with
  /// none outstanding the transcript is dropped, since it reads as the
  /// greeting anyway.
  pub fn clear_messages(&self, conversation: &str) {
    let mut conversations = self.lock();
    let pending = match conversations.get_mut(conversation) {
      Some(c) => {
        c.messages = self.seed();
        c.is_pending()
      }
      None => return,
    };
    if !pending {
      conversations.remove(conversation);
    }
  }

  /// Aborts outstanding replies and forgets the transcript.
  pub fn close_conversation(&self, conversation: &str) {
    if let Some(c) = self.lock().remove(conversation) {
      let aborted = c.pending.iter().filter(|h| !h.is_finished()).count();
      c.pending.iter().for_each(|h| h.abort());
      log::debug!("conversation closed, {} pending replies aborted", aborted);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_rt::time::sleep;

  const DELAY: Duration = Duration::from_millis(20);

  fn store() -> Arc<ChatStore> {
    Arc::new(ChatStore::new(DELAY))
  }

  #[test]
  fn unknown_conversation_reads_as_greeting() {
    let messages = store().messages("c1");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, GREETING);
    assert_eq!(messages[0].sender, Sender::Bot);
  }

  #[actix_rt::test]
  async fn user_message_gets_exactly_one_reply() {
    let chat = store();
    chat.add_message("c1", "Someone broke into my car", Sender::User);

    assert_eq!(chat.messages("c1").len(), 2);
    assert!(chat.has_pending_reply("c1"));

    sleep(DELAY * 5).await;

    let messages = chat.messages("c1");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender, Sender::User);
    assert_eq!(messages[2].sender, Sender::Bot);
    assert!(BOT_REPLIES.contains(&messages[2].content.as_str()));
    assert!(!chat.has_pending_reply("c1"));
  }

  #[actix_rt::test]
  async fn bot_message_schedules_nothing() {
    let chat = store();
    chat.add_message("c1", "manual", Sender::Bot);

    sleep(DELAY * 5).await;

    assert_eq!(chat.messages("c1").len(), 2);
  }

  #[actix_rt::test]
  async fn rapid_messages_each_get_a_reply() {
    let chat = store();
    chat.add_message("c1", "one", Sender::User);
    chat.add_message("c1", "two", Sender::User);

    sleep(DELAY * 5).await;

    let messages = chat.messages("c1");
    assert_eq!(messages.len(), 5);
    assert_eq!(messages.iter().filter(|m| m.sender == Sender::Bot).count(), 3);
  }

  #[actix_rt::test]
  async fn conversations_are_isolated() {
    let chat = store();
    chat.add_message("c1", "hello", Sender::User);

    sleep(DELAY * 5).await;

    assert_eq!(chat.messages("c1").len(), 3);
    assert_eq!(chat.messages("c2").len(), 1);
  }

  #[actix_rt::test]
  async fn clear_resets_but_pending_reply_still_lands() {
    let chat = store();
    chat.add_message("c1", "hello", Sender::User);
    chat.clear_messages("c1");

    assert_eq!(chat.messages("c1").len(), 1);

    sleep(DELAY * 5).await;

    let messages = chat.messages("c1");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, Sender::Bot);
  }

  #[actix_rt::test]
  async fn closing_cancels_scheduled_reply() {
    let chat = store();
    chat.add_message("c1", "hello", Sender::User);
    chat.close_conversation("c1");

    sleep(DELAY * 5).await;

    assert_eq!(chat.messages("c1").len(), 1);
    assert!(!chat.has_pending_reply("c1"));
  }

  #[actix_rt::test]
  async fn clearing_a_settled_transcript_frees_it() {
    let chat = store();
    chat.add_message("c1", "hello", Sender::User);
    sleep(DELAY * 5).await;

    chat.clear_messages("c1");

    assert!(chat.lock().is_empty());
    assert_eq!(chat.messages("c1").len(), 1);
  }

  #[actix_rt::test]
  async fn idle_conversations_are_evicted() {
    let chat = Arc::new(ChatStore::new(DELAY * 5).with_idle_timeout(DELAY));
    chat.add_message("quiet", "hello", Sender::Bot);
    chat.add_message("waiting", "anyone there?", Sender::User);

    sleep(DELAY * 3).await;
    chat.add_message("new", "hi", Sender::Bot);

    let conversations = chat.lock();
    assert!(!conversations.contains_key("quiet"));
    assert!(conversations.contains_key("waiting"));
    assert!(conversations.contains_key("new"));
  }
}
