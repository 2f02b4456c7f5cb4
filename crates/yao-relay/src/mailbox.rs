//! Single-party mailbox.

use std::collections::HashMap;

use tracing::{trace, warn};
use yao_common::{
    future::{new_output, MaybeDone, Sender},
    msgs::Payload,
};

#[derive(Debug)]
enum Entry {
    /// A value waiting for a reader.
    Stored(Payload),
    /// A reader waiting for a value.
    Waiting(Sender<Payload>),
}

/// Result of a fetch.
#[derive(Debug)]
pub enum Fetch {
    /// The value was already published.
    Ready(Payload),
    /// Resolves when the value is published.
    ///
    /// Canceled if the mailbox is cleared first.
    Pending(MaybeDone<Payload>),
}

/// Tag addressed store of a single party.
///
/// A tag holds at most one value or one reader. It is cleared as soon as a
/// reader receives the value, so every publish is delivered at most once.
#[derive(Debug, Default)]
pub struct Mailbox {
    entries: HashMap<String, Entry>,
}

impl Mailbox {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a value under `tag`, handing it to the waiting reader if
    /// there is one.
    pub fn publish(&mut self, tag: String, value: Payload) {
        let value = match self.entries.remove(&tag) {
            Some(Entry::Waiting(reader)) => match reader.send(value) {
                Ok(()) => {
                    trace!(%tag, "delivered to waiting reader");
                    return;
                }
                // The reader went away, keep the value for the next one.
                Err(value) => value,
            },
            Some(Entry::Stored(_)) => {
                warn!(%tag, "replacing unread value");
                value
            }
            None => value,
        };

        self.entries.insert(tag, Entry::Stored(value));
    }

    /// Fetches the value under `tag`.
    ///
    /// A second fetch for a tag which already has a waiting reader replaces
    /// that reader.
    pub fn fetch(&mut self, tag: &str) -> Fetch {
        match self.entries.remove(tag) {
            Some(Entry::Stored(value)) => Fetch::Ready(value),
            waiting => {
                if matches!(waiting, Some(Entry::Waiting(_))) {
                    warn!(%tag, "replacing waiting reader");
                }
                let (sender, recv) = new_output();
                self.entries.insert(tag.to_string(), Entry::Waiting(sender));
                Fetch::Pending(recv)
            }
        }
    }

    /// Returns `true` if a value is stored under `tag`.
    pub fn has_value(&self, tag: &str) -> bool {
        matches!(self.entries.get(tag), Some(Entry::Stored(_)))
    }

    /// Returns `true` if a reader is waiting on `tag`.
    pub fn is_waiting(&self, tag: &str) -> bool {
        matches!(self.entries.get(tag), Some(Entry::Waiting(_)))
    }

    /// Returns the number of occupied tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tag is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every value and cancels every waiting reader.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
