//! Current-user session: demo login, registration, restore and route guard.

use crate::{
  error::{ErrorKind, Result},
  schema::{Role, User},
  storage::Storage,
  util,
};
use error_chain::bail;
use lazy_static::lazy_static;
use std::time::Duration;

/// Storage key of the persisted user record.
pub const USER_KEY: &str = "crimeguard_user";

lazy_static! {
  /// Accounts accepted by `login`; stands in for an authentication backend.
  pub static ref DEMO_DIRECTORY: Vec<User> = vec![
    demo_user("1", "John Doe", "user@example.com", Role::User),
    demo_user("2", "Admin User", "admin@example.com", Role::Admin),
    demo_user("3", "Police Officer", "police@example.com", Role::Police),
  ];
}

fn demo_user(id: &str, name: &str, email: &str, role: Role) -> User {
  User {
    id: id.into(),
    name: name.into(),
    email: email.into(),
    role,
  }
}

pub fn demo_email(role: Role) -> &'static str {
  match role {
    Role::User => "user@example.com",
    Role::Admin => "admin@example.com",
    Role::Police => "police@example.com",
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
  /// The persisted record has not been read yet.
  Restoring,
  Anonymous,
  Active(User),
}

pub struct SessionStore<S: Storage> {
  storage: S,
  state: SessionState,
  latency: Duration,
}

impl<S: Storage> SessionStore<S> {
  pub fn new(storage: S, latency: Duration) -> Self {
    SessionStore {
      storage,
      state: SessionState::Restoring,
      latency,
    }
  }

  /// `new` followed by `restore`.
  pub fn restored(storage: S, latency: Duration) -> Self {
    let mut store = Self::new(storage, latency);
    store.restore();
    store
  }

  /// Reloads the persisted user. A record that does not parse is dropped
  /// and the session starts anonymous.
  pub fn restore(&mut self) {
    self.state = match self.storage.read(USER_KEY) {
      Some(record) => match serde_json::from_str::<User>(&record) {
        Ok(user) => SessionState::Active(user),
        Err(e) => {
          log::warn!("Failed to parse saved user: {}", e);
          self.storage.remove(USER_KEY);
          SessionState::Anonymous
        }
      },
      None => SessionState::Anonymous,
    };
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn user(&self) -> Option<&User> {
    match &self.state {
      SessionState::Active(user) => Some(user),
      SessionState::Restoring | SessionState::Anonymous => None,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    self.user().is_some()
  }

  pub fn is_loading(&self) -> bool {
    self.state == SessionState::Restoring
  }

  /// Password is accepted but never checked.
  pub async fn login(&mut self, email: &str, _password: &str, role: Role) -> Result<User> {
    actix_rt::time::sleep(self.latency).await;

    let user = match DEMO_DIRECTORY.iter().find(|u| u.email == email && u.role == role) {
      Some(user) => user.clone(),
      None => bail!(ErrorKind::InvalidLogin),
    };
    self.activate(user)
  }

  pub async fn register(&mut self, name: &str, email: &str, _password: &str, role: Role) -> Result<User> {
    actix_rt::time::sleep(self.latency).await;

    let user = User {
      id: util::gen_id(),
      name: name.to_string(),
      email: email.to_string(),
      role,
    };
    self.activate(user)
  }

  pub fn logout(&mut self) {
    self.storage.remove(USER_KEY);
    self.state = SessionState::Anonymous;
  }

  fn activate(&mut self, user: User) -> Result<User> {
    self.storage.write(USER_KEY, serde_json::to_string(&user)?)?;
    log::info!("session opened for {} ({})", user.email, user.role);
    self.state = SessionState::Active(user.clone());
    Ok(user)
  }
}

/// Outcome of guarding a protected view.
#[derive(Debug, PartialEq)]
pub enum Access<'a> {
  Loading,
  Redirect(&'static str),
  Granted(&'a User),
}

pub const LOGIN_VIEW: &str = "views/login";
pub const HOME_VIEW: &str = "views/home";
pub const DASHBOARD_VIEW: &str = "views/dashboard";

pub fn guard(state: &SessionState) -> Access<'_> {
  match state {
    SessionState::Restoring => Access::Loading,
    SessionState::Anonymous => Access::Redirect(LOGIN_VIEW),
    SessionState::Active(user) => Access::Granted(user),
  }
}
