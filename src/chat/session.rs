//! Per-room message state.
//!
//! A session subscribes before history is fetched. Until history arrives (or
//! fails) live events are buffered, then replayed after the sorted history so
//! the list never shows live lines ahead of older ones.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::chat::events::{apply_ai_event, ChatEvent};
use crate::chat::reducer::{push_human_message, sort_history_asc, to_ui_message, UiMessage};
use crate::models::ChatMessageEntry;

#[derive(Debug)]
enum Phase {
    Bootstrapping(Vec<ChatEvent>),
    Live,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<UiMessage>,
    phase: Phase,
    last_seq: HashMap<String, u64>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            phase: Phase::Bootstrapping(Vec::new()),
            last_seq: HashMap::new(),
        }
    }

    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<UiMessage> {
        self.messages
    }

    pub fn is_live(&self) -> bool {
        matches!(self.phase, Phase::Live)
    }

    pub fn buffered(&self) -> usize {
        match &self.phase {
            Phase::Bootstrapping(buffer) => buffer.len(),
            Phase::Live => 0,
        }
    }

    /// Feeds one live event. Returns the index of the message it changed, or
    /// `None` when the event was buffered or dropped.
    pub fn ingest(&mut self, event: ChatEvent) -> Option<usize> {
        match &mut self.phase {
            Phase::Bootstrapping(buffer) => {
                buffer.push(event);
                None
            }
            Phase::Live => self.apply(event),
        }
    }

    /// Seeds the list with a history batch and goes live.
    ///
    /// On first call the buffered live events are replayed after the history.
    /// A later call reloads history and keeps the lines history does not cover
    /// (AI replies, unsaved messages) after it.
    pub fn seed_history(&mut self, entries: Vec<ChatMessageEntry>) {
        let history: Vec<UiMessage> = sort_history_asc(entries)
            .iter()
            .map(to_ui_message)
            .collect();
        let previous = std::mem::replace(&mut self.messages, history);

        match std::mem::replace(&mut self.phase, Phase::Live) {
            Phase::Bootstrapping(buffer) => {
                info!(
                    history = self.messages.len(),
                    buffered = buffer.len(),
                    "Chat history loaded"
                );
                self.replay(buffer);
            }
            Phase::Live => {
                debug!(history = self.messages.len(), "Chat history reloaded");
                for message in previous {
                    if !self.contains_msg_id(message.msg_id) {
                        self.messages.push(message);
                    }
                }
            }
        }
    }

    /// Goes live without history, replaying whatever was buffered.
    pub fn history_failed(&mut self) {
        if let Phase::Bootstrapping(buffer) = std::mem::replace(&mut self.phase, Phase::Live) {
            info!(buffered = buffer.len(), "Chat history unavailable, going live");
            self.replay(buffer);
        }
    }

    fn replay(&mut self, buffer: Vec<ChatEvent>) {
        for event in buffer {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ChatEvent) -> Option<usize> {
        match event {
            ChatEvent::Human(entry) => {
                if self.contains_msg_id(entry.id) {
                    debug!(msg_id = ?entry.id, "Skipping message already in history");
                    return None;
                }
                push_human_message(&mut self.messages, &entry);
                Some(self.messages.len() - 1)
            }
            ChatEvent::Ai(event) => {
                if let Some(seq) = event.seq {
                    let last = self.last_seq.get(&event.ai_msg_id).copied();
                    if last.is_some_and(|last| seq <= last) {
                        debug!(ai_msg_id = %event.ai_msg_id, seq, "Dropping replayed AI event");
                        return None;
                    }
                    self.last_seq.insert(event.ai_msg_id.clone(), seq);
                }
                let ai_msg_id = event.ai_msg_id.clone();
                apply_ai_event(&mut self.messages, event);
                self.messages
                    .iter()
                    .position(|m| m.ai_msg_id.as_deref() == Some(ai_msg_id.as_str()))
            }
        }
    }

    fn contains_msg_id(&self, id: Option<i64>) -> bool {
        id.is_some() && self.messages.iter().any(|m| m.msg_id == id)
    }
}
