use serde::{Deserialize, Serialize};

/// Per-session user preferences. Only the streaming toggle exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPreference {
    pub stream: bool,
}

impl SessionPreference {
    pub fn new(stream: bool) -> Self {
        Self { stream }
    }

    pub fn set_stream(&mut self, stream: bool) {
        self.stream = stream;
    }
}

impl Default for SessionPreference {
    fn default() -> Self {
        Self { stream: true }
    }
}
