//! Outbound mail
//!
//! Handlers only see the `Mailer` trait; the process picks an implementation
//! at start-up.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// Sends transactional email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the "reset your password" message
    async fn send_password_reset(&self, to: &str, username: &str, reset_url: &str) -> Result<()>;
}

/// Mailer that only records the send in the log
///
/// The reset link itself is a credential and is not written out.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, username: &str, _reset_url: &str) -> Result<()> {
        info!(
            from = %self.sender,
            to = %to,
            username = %username,
            subject = "[SchedulIt] Reset Your Password",
            "password reset email sent"
        );
        Ok(())
    }
}

/// A message captured by `MemoryMailer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub username: String,
    pub reset_url: String,
}

/// Mailer that keeps every message in memory
#[derive(Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<SentMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first
    pub fn sent(&self) -> Vec<SentMail> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_password_reset(&self, to: &str, username: &str, reset_url: &str) -> Result<()> {
        let mail = SentMail {
            to: to.to_string(),
            username: username.to_string(),
            reset_url: reset_url.to_string(),
        };
        self.outbox
            .lock()
            .map_err(|_| anyhow::anyhow!("mail outbox lock poisoned"))?
            .push(mail);
        Ok(())
    }
}
