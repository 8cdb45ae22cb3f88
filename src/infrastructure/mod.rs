pub mod backends;
pub mod generators;
