mod channel;
mod message;

pub use channel::InMemoryChannelRepository;
pub use message::InMemoryMessageRepository;
