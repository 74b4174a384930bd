//! Repository 実装（Persistence Gateway）

pub mod inmemory;

pub use inmemory::{InMemoryChannelRepository, InMemoryMessageRepository};
