//! Static password gate in front of the viewer

use crate::error::{Result, ViewerError};

/// Compares a supplied password with the configured one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordGate {
  expected: Option<String>,
}

impl PasswordGate {
  /// An empty password counts as none configured
  pub fn new(expected: Option<String>) -> Self {
    Self { expected: expected.filter(|password| !password.is_empty()) }
  }

  /// True when no password is configured and every user gets in
  pub fn is_open(&self) -> bool {
    self.expected.is_none()
  }

  pub fn check(&self, supplied: Option<&str>) -> Result<()> {
    let Some(expected) = self.expected.as_deref() else {
      return Ok(());
    };
    match supplied {
      Some(password) if password == expected => Ok(()),
      Some(_) => Err(ViewerError::InvalidPassword),
      None => Err(ViewerError::AuthenticationRequired),
    }
  }
}
