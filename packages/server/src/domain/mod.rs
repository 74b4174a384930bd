//! ドメイン層
//!
//! 値オブジェクト、エンティティ、リレーメッセージと、
//! 外部との境界になる trait（Repository / Transport / MessagePusher）を定義します。

pub mod connection;
pub mod entity;
pub mod error;
pub mod message;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use connection::{Connection, ConnectionState};
pub use entity::{
    Channel, ChannelMessage, ChannelMessageDraft, FileAttachment, Reaction, ReactionSet,
    StoredMessage, Thread, ThreadMessage, ThreadMessageDraft,
};
pub use error::{DecodeError, RepositoryError, TransportError, ValueObjectError};
pub use message::{MessageKind, RelayCommand, RelayMessage};
pub use pusher::{DeliveryOutcome, DeliveryReport, MessagePusher};
pub use registry::ClientRegistry;
pub use repository::{ChannelRepository, MessageRepository};
pub use transport::{FrameReader, FrameWriter, InboundFrame};
pub use value_object::{
    AccountId, ChannelId, ClientId, EmojiCode, MessageId, PageSize, ThreadId,
};

#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use registry::MockClientRegistry;
#[cfg(test)]
pub use repository::{MockChannelRepository, MockMessageRepository};
