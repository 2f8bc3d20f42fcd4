//! Bounded interaction history
//!
//! Three independent insertion-ordered logs back every decision: recent game
//! events, recent brain responses, and the last few triggered attacks. Each
//! log silently evicts its oldest entry past capacity. Records are never
//! mutated after insertion.

use crate::core::config::HistoryConfig;
use crate::core::types::{BossAction, EventPriority};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-capacity FIFO log. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if the log is full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// What happened, as a closed set of payload shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    PlayerJoined { name: String },
    ChatMention { player: String, text: String },
    AttackTriggered { action: BossAction },
    MatchStatus { active: bool },
}

/// A recorded game event used as decision context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub payload: EventPayload,
    pub message: String,
    pub priority: EventPriority,
    /// Elapsed time since the brain was created
    pub at: Duration,
}

/// One brain decision, from either path, as recorded history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub message: Option<String>,
    pub action: BossAction,
    pub target: Option<String>,
    pub at: Duration,
}

/// The three history logs plus prompt-text rendering
#[derive(Debug, Clone)]
pub struct HistoryStore {
    events: BoundedLog<EventRecord>,
    responses: BoundedLog<ResponseRecord>,
    attacks: BoundedLog<String>,
}

impl HistoryStore {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            events: BoundedLog::new(config.event_capacity),
            responses: BoundedLog::new(config.response_capacity),
            attacks: BoundedLog::new(config.attack_capacity),
        }
    }

    pub fn record_event(
        &mut self,
        payload: EventPayload,
        message: impl Into<String>,
        priority: EventPriority,
        at: Duration,
    ) {
        self.events.push(EventRecord {
            payload,
            message: message.into(),
            priority,
            at,
        });
    }

    pub fn record_response(&mut self, record: ResponseRecord) {
        self.responses.push(record);
    }

    pub fn record_attack(&mut self, action: BossAction) {
        self.attacks.push(action.to_string());
    }

    pub fn events(&self) -> &BoundedLog<EventRecord> {
        &self.events
    }

    pub fn responses(&self) -> &BoundedLog<ResponseRecord> {
        &self.responses
    }

    pub fn attacks(&self) -> &BoundedLog<String> {
        &self.attacks
    }

    /// Event lines for prompt context, oldest first
    pub fn event_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| {
                format!(
                    "[{:?} t+{}s] {}",
                    e.priority,
                    e.at.as_secs(),
                    e.message
                )
            })
            .collect()
    }

    /// Response lines for prompt context, oldest first
    pub fn response_lines(&self) -> Vec<String> {
        self.responses
            .iter()
            .map(|r| {
                let mut line = format!("[t+{}s] action={}", r.at.as_secs(), r.action);
                if let Some(msg) = &r.message {
                    line.push_str(&format!(" said=\"{}\"", msg));
                }
                if let Some(target) = &r.target {
                    line.push_str(&format!(" target={}", target));
                }
                line
            })
            .collect()
    }

    /// Names of the most recent attacks, oldest first
    pub fn attack_names(&self) -> Vec<String> {
        self.attacks.iter().cloned().collect()
    }

    /// Combined rendering handed to the LLM prompt
    pub fn summary(&self) -> String {
        let mut s = String::new();

        if !self.events.is_empty() {
            s.push_str("Recent events:\n");
            for line in self.event_lines() {
                s.push_str(&format!("- {}\n", line));
            }
        }

        if !self.responses.is_empty() {
            s.push_str("Recent decisions:\n");
            for line in self.response_lines() {
                s.push_str(&format!("- {}\n", line));
            }
        }

        if !self.attacks.is_empty() {
            s.push_str(&format!(
                "Recent attacks: {}\n",
                self.attack_names().join(", ")
            ));
        }

        s
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}
