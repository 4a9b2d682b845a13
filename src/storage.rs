//! Durable client-side key/value storage.
//!
//! In the running service this is the signed session cookie; the browser
//! keeps it across visits the same way it would keep local storage.

use crate::error::Result;
use actix_session::Session;

pub trait Storage {
  fn read(&self, key: &str) -> Option<String>;
  fn write(&self, key: &str, value: String) -> Result<()>;
  fn remove(&self, key: &str);
}

impl Storage for Session {
  fn read(&self, key: &str) -> Option<String> {
    match self.get::<String>(key) {
      Ok(value) => value,
      Err(e) => {
        log::warn!("unreadable session entry \"{}\": {}", key, e);
        None
      }
    }
  }

  fn write(&self, key: &str, value: String) -> Result<()> {
    self.insert(key, value)?;
    Ok(())
  }

  fn remove(&self, key: &str) {
    Session::remove(self, key);
  }
}

#[cfg(test)]
pub(crate) mod memory {
  use super::Storage;
  use crate::error::Result;
  use std::{cell::RefCell, collections::HashMap, rc::Rc};

  /// Shared in-memory storage; clones see the same entries, like two page
  /// loads reading the same browser storage.
  #[derive(Default, Clone)]
  pub struct MemoryStorage(Rc<RefCell<HashMap<String, String>>>);

  impl MemoryStorage {
    pub fn len(&self) -> usize {
      self.0.borrow().len()
    }
  }

  impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
      self.0.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: String) -> Result<()> {
      self.0.borrow_mut().insert(key.to_string(), value);
      Ok(())
    }

    fn remove(&self, key: &str) {
      self.0.borrow_mut().remove(key);
    }
  }
}
