//! Transient, user-visible notifications (the web storefront's notification modal).

use crate::formatting::escape_html;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn default_title(self) -> &'static str {
        match self {
            NotificationKind::Success => "Успешно!",
            NotificationKind::Error => "Ошибка",
            NotificationKind::Warning => "Внимание",
            NotificationKind::Info => "Уведомление",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "🥂",
            NotificationKind::Error => "❌",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Info => "ℹ️",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub content: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, content)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| self.kind.default_title())
    }

    /// Telegram HTML rendering.
    pub fn to_html(&self) -> String {
        format!(
            "{} <b>{}</b>\n{}",
            self.kind.icon(),
            escape_html(self.title()),
            escape_html(&self.content)
        )
    }
}
