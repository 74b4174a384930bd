//! UI 層（axum のルーティングとハンドラ）

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::{Server, ServerError};
pub use state::AppState;
