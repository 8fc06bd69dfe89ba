//! Terminal rendering of the transcript and REPL command parsing.

use falcon_chat::ConversationState;
use falcon_core::types::{Message, Sender};

pub const TYPING_INDICATOR: &str = "  FalconCare is typing...";

/// Format one transcript entry with its time, category, numbered buttons and
/// numbered suggestions.
pub fn format_message(message: &Message) -> String {
    let mut out = match message.sender() {
        Sender::User => format!("[{}] You: {}", message.display_time(), message.text()),
        Sender::Bot => {
            let label = message
                .category()
                .map(|c| format!(" ({})", c))
                .unwrap_or_default();
            let mut out = format!("[{}] FalconCare{}:", message.display_time(), label);
            for line in message.text().lines() {
                out.push_str("\n  ");
                out.push_str(line);
            }
            out
        }
    };

    if let Some(image) = message.image() {
        out.push_str(&format!("\n  🖼  {}", image));
    }
    for (i, button) in message.buttons().iter().enumerate() {
        out.push_str(&format!("\n  [/{}] {}", i + 1, button.title));
    }
    if !message.suggestions().is_empty() {
        let list: Vec<String> = message
            .suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("/s{} {}", i + 1, s))
            .collect();
        out.push_str(&format!("\n  Suggestions: {}", list.join(" | ")));
    }
    out
}

/// Tracks what has already been printed so each state change prints only the
/// new messages and a single typing indicator per pending stretch.
#[derive(Debug, Default)]
pub struct Renderer {
    shown: usize,
    typing: bool,
}

impl Renderer {
    /// Lines to print for this state.
    pub fn render(&mut self, state: &ConversationState) -> Vec<String> {
        let mut lines: Vec<String> = state
            .transcript()
            .get(self.shown..)
            .unwrap_or_default()
            .iter()
            .map(format_message)
            .collect();
        self.shown = state.len();

        if state.pending() && !self.typing {
            lines.push(TYPING_INDICATOR.to_string());
        }
        self.typing = state.pending();
        lines
    }
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the text as an utterance.
    Submit(String),
    /// Press button N (1-based) of the latest bot message.
    Press(usize),
    /// Submit suggestion N (1-based) of the latest bot message.
    Suggest(usize),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Submit(line.to_string());
        };
        match rest {
            "quit" | "exit" | "q" => return Command::Quit,
            "help" | "?" => return Command::Help,
            _ => {}
        }
        let index = |digits: &str| digits.parse::<usize>().ok().filter(|n| *n > 0);
        if let Some(n) = rest.strip_prefix('s').and_then(index) {
            return Command::Suggest(n);
        }
        if let Some(n) = index(rest) {
            return Command::Press(n);
        }
        Command::Unknown(line.to_string())
    }
}

pub const HELP: &str = "Type a message and press Enter.\n  \
    /N    press button N of the latest reply\n  \
    /sN   send suggestion N of the latest reply\n  \
    /quit end the conversation";
