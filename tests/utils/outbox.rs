use std::sync::{Arc, Mutex};

use ginrummy::SeatOutbox;

/// Seat capability that records every message instead of writing to a
/// socket, so tests can assert on exactly what each seat was told.
#[derive(Default)]
pub struct RecordingOutbox {
    messages: Mutex<Vec<String>>,
}

impl RecordingOutbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raw_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn parsed_messages(&self) -> Vec<serde_json::Value> {
        self.raw_messages()
            .iter()
            .filter_map(|m| serde_json::from_str(m).ok())
            .collect()
    }

    pub fn message_types(&self) -> Vec<String> {
        self.parsed_messages()
            .iter()
            .filter_map(|v| v["type"].as_str().map(str::to_string))
            .collect()
    }

    pub fn messages_of_type(&self, message_type: &str) -> Vec<serde_json::Value> {
        self.parsed_messages()
            .into_iter()
            .filter(|v| v["type"] == message_type)
            .collect()
    }

    pub fn last_of_type(&self, message_type: &str) -> Option<serde_json::Value> {
        self.messages_of_type(message_type).into_iter().next_back()
    }

    pub fn last_state(&self) -> serde_json::Value {
        self.last_of_type("state").expect("no state snapshot seen")
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl SeatOutbox for RecordingOutbox {
    fn send_text(&self, text: String) {
        self.messages.lock().unwrap().push(text);
    }
}
