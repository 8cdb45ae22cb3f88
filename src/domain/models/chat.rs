use serde::Deserialize;
use serde::Serialize;

pub const CHAT_HISTORY_LIMIT: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub provider: String,
    pub from_system: bool,
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn author(&self) -> &'static str {
        if self.from_system {
            return "System";
        }

        return "You";
    }
}
