use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const REGISTER_PROVIDER: &str = "register.provider";
pub const GET_COLLECTION: &str = "get.wallpaper.collection";
pub const COLLECTION_RESPONSE: &str = "collect.collection.response";
pub const GET_NEW_WALLPAPER: &str = "get.new.wallpaper";
pub const SET_WALLPAPER: &str = "set.wallpaper";
pub const HOMESCREEN_SET: &str = "homescreen.wallpaper.set";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub data: Value,
}

impl BusMessage {
    pub fn new(msg_type: impl Into<String>, data: Value) -> Self {
        Self {
            msg_type: msg_type.into(),
            data,
        }
    }
}

/// Fire-and-forget event emission; the caller never learns who listens.
pub trait Announcer {
    fn announce(&self, event: &str, payload: Value);
}

/// Collects announced messages until someone drains them.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<BusMessage>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<BusMessage> {
        match self.messages.lock() {
            Ok(mut messages) => messages.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Announcer for Outbox {
    fn announce(&self, event: &str, payload: Value) {
        log::debug!("Announcing {}: {}", event, payload);
        let message = BusMessage::new(event, payload);
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}
