use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

/// Anything noteworthy a session does, in the order its side produced it.
///
/// The session emits these; consumers display or store them. Events carry no
/// timestamp, consumers stamp them on arrival if they care about time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    /// A lifecycle notice, e.g. connected/disconnected.
    Info(String),

    /// A command was put on wire.
    Sent(String),

    /// A line arrived from the wire, already decoded for display.
    Received(String),

    /// Something failed. The session survives; this is for the operator.
    Error(String),
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Info(text) => write!(f, "{text}"),
            Event::Sent(text) => write!(f, "Sent: {text}"),
            Event::Received(text) => write!(f, "Received: {text}"),
            Event::Error(text) => write!(f, "Error: {text}"),
        }
    }
}

/// Where a session pushes its [`Event`]s.
///
/// Implementations must tolerate being called from the background read loop,
/// and must not block it.
pub trait EventSink: Send + Sync {
    /// Consume one event.
    fn publish(&self, event: Event);
}

/// Losing events because the consumer went away is fine;
/// the session must not care.
impl EventSink for mpsc::UnboundedSender<Event> {
    fn publish(&self, event: Event) {
        if self.send(event).is_err() {
            trace!("Event dropped, receiver is gone");
        }
    }
}

impl EventSink for broadcast::Sender<Event> {
    fn publish(&self, event: Event) {
        if self.send(event).is_err() {
            trace!("Event dropped, no subscribers");
        }
    }
}

/// Decode received bytes for display.
///
/// Valid UTF-8 comes through as-is. Anything else is rendered as hex with a
/// distinct prefix, so no received data is ever silently dropped because of
/// its encoding.
pub fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => format!("Raw: {}", bytes.iter().map(|b| format!("{b:02x}")).join("")),
    }
}
