mod actor;
mod artifacts;
mod backend_errors;
mod catalog;
mod chat;
mod image_generation;
mod keys;
mod navigation;
mod profiles;
mod provider_metadata;
mod query_cache;
mod workflows;

pub use actor::*;
pub use artifacts::*;
pub use backend_errors::*;
pub use catalog::*;
pub use chat::*;
pub use image_generation::*;
pub use keys::*;
pub use navigation::*;
pub use profiles::*;
pub use provider_metadata::*;
pub use query_cache::*;
pub use workflows::*;
