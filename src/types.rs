//! Wire-level types for the sampled event stream

use serde::Deserialize;

/// One raw non-blank line received from the stream, pre-decode.
///
/// Ownership moves reader -> queue -> processor; the payload is never
/// mutated or aliased after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBlock {
    contents: String,
}

impl EventBlock {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Decoded shape of a single stream record.
///
/// Every field is optional: a record without a body is a valid event that
/// simply carries nothing to process.
#[derive(Debug, Deserialize)]
pub struct DecodedEvent {
    pub data: Option<EventData>,
}

/// Body of a decoded event.
#[derive(Debug, Deserialize)]
pub struct EventData {
    pub id: Option<String>,
    pub text: Option<String>,
}
