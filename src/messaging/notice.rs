use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Maps the server's `message_type` field; unknown values are `Info`
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "warning" | "warn" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Transient message meant for the person using the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Logs the notice and broadcasts it to whoever renders notices.
pub(crate) fn publish(tx: &broadcast::Sender<Notice>, notice: Notice) {
    match notice.level {
        NoticeLevel::Error => tracing::error!("{}", notice.message),
        NoticeLevel::Warning => tracing::warn!("{}", notice.message),
        NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{}", notice.message),
    }

    if tx.send(notice).is_err() {
        tracing::debug!("No notice receivers attached");
    }
}
