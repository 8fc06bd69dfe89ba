//! Domain types shared by the triage engine and its front ends.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::FalconError;

// =============================================================================
// Category / Severity
// =============================================================================

/// Resolved topical or severity bucket of a bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Greeting,
    Emergency,
    Warning,
    Myth,
    Vaccination,
    Hospital,
    Symptom,
    Fallback,
    General,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Greeting,
        Category::Emergency,
        Category::Warning,
        Category::Myth,
        Category::Vaccination,
        Category::Hospital,
        Category::Symptom,
        Category::Fallback,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Greeting => "greeting",
            Category::Emergency => "emergency",
            Category::Warning => "warning",
            Category::Myth => "myth",
            Category::Vaccination => "vaccination",
            Category::Hospital => "hospital",
            Category::Symptom => "symptom",
            Category::Fallback => "fallback",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FalconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| FalconError::InvalidValue(format!("unknown category '{}'", s)))
    }
}

/// Urgency assigned to a category by the escalation policy.
///
/// Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Advisory,
    Urgent,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Advisory => "advisory",
            Severity::Urgent => "urgent",
            Severity::Critical => "critical",
        }
    }

    /// Urgent and critical replies must carry an actionable button.
    pub fn requires_action(&self) -> bool {
        *self >= Severity::Urgent
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Buttons
// =============================================================================

const TEL_SCHEME: &str = "tel:";

/// A quick-action button attached to a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub title: String,
    pub payload: String,
}

/// What pressing a button should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickReply<'a> {
    /// Place a phone call to the given number.
    Dial(&'a str),
    /// Submit the text as the next user utterance.
    Utterance(&'a str),
}

impl Button {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }

    /// A button whose payload is a `tel:` URI for `number`.
    pub fn dial(title: impl Into<String>, number: &str) -> Self {
        Self::new(title, format!("{}{}", TEL_SCHEME, number))
    }

    /// Interpret the payload. An empty payload resubmits the title.
    pub fn quick_reply(&self) -> QuickReply<'_> {
        let payload = self.payload.trim();
        if payload.len() >= TEL_SCHEME.len()
            && payload.is_char_boundary(TEL_SCHEME.len())
            && payload[..TEL_SCHEME.len()].eq_ignore_ascii_case(TEL_SCHEME)
        {
            let number = payload[TEL_SCHEME.len()..].trim();
            if !number.is_empty() {
                return QuickReply::Dial(number);
            }
        }
        if payload.is_empty() {
            QuickReply::Utterance(self.title.trim())
        } else {
            QuickReply::Utterance(payload)
        }
    }

    /// The dialed number if this is a direct-dial button.
    pub fn dial_number(&self) -> Option<&str> {
        match self.quick_reply() {
            QuickReply::Dial(number) => Some(number),
            QuickReply::Utterance(_) => None,
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// Structured body of a bot reply before it becomes a transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePayload {
    pub text: String,
    pub category: Category,
    pub buttons: Vec<Button>,
    pub suggestions: Vec<String>,
    pub image: Option<String>,
}

impl ResponsePayload {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
            buttons: Vec::new(),
            suggestions: Vec::new(),
            image: None,
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// One transcript entry.
///
/// Fields are private so that user messages can never carry a category,
/// buttons, suggestions or an image: the only constructors are
/// [`Message::user`] and [`Message::bot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    text: String,
    sender: Sender,
    /// Epoch seconds.
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<Button>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Local::now().timestamp(),
            category: None,
            buttons: Vec::new(),
            suggestions: Vec::new(),
            image: None,
        }
    }

    /// A bot reply built from a resolved payload.
    pub fn bot(payload: ResponsePayload) -> Self {
        Self {
            text: payload.text,
            sender: Sender::Bot,
            timestamp: Local::now().timestamp(),
            category: Some(payload.category),
            buttons: payload.buttons,
            suggestions: payload.suggestions,
            image: payload.image,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Creation time at display precision (`HH:MM:SS`, local time).
    pub fn display_time(&self) -> String {
        Local
            .timestamp_opt(self.timestamp, 0)
            .single()
            .map(|dt: DateTime<Local>| dt.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}
