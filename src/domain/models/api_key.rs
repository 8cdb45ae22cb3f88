use serde::Deserialize;
use serde::Serialize;

pub const MIN_API_KEY_LENGTH: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub key: String,
    pub provider: String,
    pub created_at: u64,
    pub updated_at: u64,
}

impl ApiKey {
    /// Key with everything but the last four characters hidden.
    pub fn masked(&self) -> String {
        let chars = self.key.chars().collect::<Vec<char>>();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }

        let visible = chars[chars.len() - 4..].iter().collect::<String>();
        return format!("{}{visible}", "*".repeat(chars.len() - 4));
    }
}
