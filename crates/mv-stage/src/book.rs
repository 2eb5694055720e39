//! EventBook: ordered event record for one round

use serde::{Deserialize, Serialize};

use crate::codec::serialize_event;
use crate::event::GameEvent;

/// Events recorded while playing a round, in emission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBook {
    events: Vec<GameEvent>,
}

impl EventBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Append every event from another book
    pub fn append(&mut self, other: &mut EventBook) {
        self.events.append(&mut other.events);
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events in emission order
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Events with a given wire `type`
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a GameEvent> + 'a {
        self.events.iter().filter(move |e| e.type_name() == type_name)
    }

    /// Take all events, leaving the book empty
    pub fn flush(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// One compact JSON object per line
    pub fn to_json_lines(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serialize_event(event));
            out.push('\n');
        }
        out
    }
}

impl IntoIterator for EventBook {
    type Item = GameEvent;
    type IntoIter = std::vec::IntoIter<GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
