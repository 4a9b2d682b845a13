use crate::{
  chat::ChatStore,
  config::Config,
  error::Result,
  schema::Role,
  session::SessionStore,
  storage::Storage,
  util,
};
use actix_session::Session;

const CONVERSATION_KEY: &str = "conversation";

pub type WebSession = SessionStore<Session>;

/// Session store for the current request, restored from the cookie.
pub fn restore(session: &Session, config: &Config) -> WebSession {
  SessionStore::restored(session.clone(), config.demo.auth_latency())
}

pub fn conversation_id(session: &Session) -> Option<String> {
  session.read(CONVERSATION_KEY)
}

/// Conversation bound to this browser session, created on first use.
pub fn ensure_conversation(session: &Session) -> Result<String> {
  match conversation_id(session) {
    Some(id) => Ok(id),
    None => {
      let id = util::gen_ssid();
      session.write(CONVERSATION_KEY, id.clone())?;
      Ok(id)
    }
  }
}

pub async fn login(store: &mut WebSession, email: &str, password: &str, role: Role) -> Result<()> {
  store.login(email, password, role).await?;
  Ok(())
}

pub async fn register(store: &mut WebSession, name: &str, email: &str, password: &str, role: Role) -> Result<()> {
  store.register(name, email, password, role).await?;
  Ok(())
}

/// Ends the session and drops the chat conversation with any pending replies.
pub fn logout(store: &mut WebSession, chat: &ChatStore, session: &Session) {
  if let Some(conversation) = conversation_id(session) {
    chat.close_conversation(&conversation);
    session.remove(CONVERSATION_KEY);
  }
  if let Some(user) = store.user() {
    log::info!("session closed for {}", user.email);
  }
  store.logout();
}
