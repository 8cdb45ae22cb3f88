pub mod http;
pub mod memory;

use anyhow::Result;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::Identity;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName, identity: &Identity) -> Result<BackendBox> {
        match name {
            BackendName::Http => return Ok(Box::new(http::HttpBackend::new(identity))),
            BackendName::Memory => return Ok(Box::new(memory::MemoryBackend::new(identity))),
        }
    }
}
