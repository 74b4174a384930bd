//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装（Repository、Transport、MessagePusher）と、
//! ワイヤフォーマットの DTO を提供します。

pub mod dto;
pub mod hub;
pub mod repository;
pub mod transport;
