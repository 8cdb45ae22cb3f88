mod api_key;
mod backend;
mod chat;
mod connection;
mod identity;
mod image;
mod provider;
mod route;
mod workflow;

pub use api_key::*;
pub use backend::*;
pub use chat::*;
pub use connection::*;
pub use identity::*;
pub use image::*;
pub use provider::*;
pub use route::*;
pub use workflow::*;
