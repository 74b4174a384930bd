//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{
    channel_messages, debug_clients, health_check, leave, new_channel, new_thread,
    send_to_client, send_to_clients, thread_messages,
};
pub use websocket::websocket_handler;
