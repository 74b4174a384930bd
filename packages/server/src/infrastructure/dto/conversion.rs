//! DTO とドメインモデルの変換
//!
//! 受信フレームのデコード（envelope → `RelayMessage`）もここで行います。

use serde::de::DeserializeOwned;

use crate::domain::{
    ChannelMessage, ChannelMessageDraft, ClientId, DecodeError, DeliveryReport, EmojiCode,
    FileAttachment, MessageKind, Reaction, ReactionSet, RelayCommand, RelayMessage, ThreadMessage,
    ThreadMessageDraft,
};
use crate::infrastructure::dto::{http as http_dto, websocket as dto};
use crate::infrastructure::hub::ConnectedClient;
use tsunagi_shared::time::to_rfc3339_millis;

// ========================================
// Frame → Domain
// ========================================

/// 受信したテキストフレームをデコードする
///
/// デコード後の `RelayMessage` は受信したフレームをそのまま保持し、
/// 配送時にはそのフレームが宛先へ書き込まれる。
pub fn decode_frame(frame: &str) -> Result<RelayMessage, DecodeError> {
    let envelope: dto::EnvelopeDto =
        serde_json::from_str(frame).map_err(DecodeError::MalformedEnvelope)?;
    let (command, send_to) = decode_envelope(envelope)?;
    Ok(RelayMessage {
        command,
        send_to,
        frame: frame.to_string(),
    })
}

/// HTTP API から投入された envelope を変換する
///
/// 配送されるフレームは envelope を JSON にシリアライズしたもの。
impl TryFrom<dto::EnvelopeDto> for RelayMessage {
    type Error = DecodeError;

    fn try_from(envelope: dto::EnvelopeDto) -> Result<Self, Self::Error> {
        let frame = serde_json::to_string(&envelope).map_err(DecodeError::MalformedEnvelope)?;
        let (command, send_to) = decode_envelope(envelope)?;
        Ok(Self {
            command,
            send_to,
            frame,
        })
    }
}

fn decode_envelope(
    envelope: dto::EnvelopeDto,
) -> Result<(RelayCommand, Option<ClientId>), DecodeError> {
    let send_to = recipient(envelope.send_to);

    let kind = MessageKind::parse(&envelope.r#type);
    let payload = envelope.payload;

    let command = match kind {
        MessageKind::NewChannelMessage => {
            let p: dto::NewChannelMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::NewChannelMessage(channel_draft(&kind, p.channel_message)?)
        }
        MessageKind::NewThreadMessage => {
            let p: dto::NewThreadMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::NewThreadMessage(thread_draft(&kind, p.thread_message)?)
        }
        MessageKind::UpdateChannelMessage => {
            let p: dto::UpdateChannelMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::UpdateChannelMessage(channel_draft(&kind, p.new_channel_message)?)
        }
        MessageKind::UpdateThreadMessage => {
            let p: dto::UpdateThreadMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::UpdateThreadMessage(thread_draft(&kind, p.new_thread_message)?)
        }
        MessageKind::DeleteChannelMessage => {
            let p: dto::DeleteChannelMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::DeleteChannelMessage {
                channel_id: p.channel_id,
                message_id: p.message_id,
                author_id: p.author_account_id,
            }
        }
        MessageKind::DeleteThreadMessage => {
            let p: dto::DeleteThreadMessagePayload = decode_payload(&kind, payload)?;
            RelayCommand::DeleteThreadMessage {
                thread_id: p.thread_id,
                message_id: p.message_id,
                author_id: p.author_account_id,
            }
        }
        MessageKind::NewChannelMessageReaction => {
            let p: dto::NewChannelReactionPayload = decode_payload(&kind, payload)?;
            RelayCommand::AddChannelReaction {
                channel_id: p.channel_id,
                message_id: p.message_id,
                reaction: reaction(&kind, p.reaction)?,
            }
        }
        MessageKind::NewThreadMessageReaction => {
            let p: dto::NewThreadReactionPayload = decode_payload(&kind, payload)?;
            RelayCommand::AddThreadReaction {
                thread_id: p.thread_id,
                message_id: p.message_id,
                reaction: reaction(&kind, p.reaction)?,
            }
        }
        MessageKind::DeleteChannelMessageReaction => {
            let p: dto::DeleteChannelReactionPayload = decode_payload(&kind, payload)?;
            RelayCommand::RemoveChannelReaction {
                channel_id: p.channel_id,
                message_id: p.message_id,
                reactor_id: p.reactor_account_id,
                emoji: emoji(&kind, p.emoji_unified_code)?,
            }
        }
        MessageKind::DeleteThreadMessageReaction => {
            let p: dto::DeleteThreadReactionPayload = decode_payload(&kind, payload)?;
            RelayCommand::RemoveThreadReaction {
                thread_id: p.thread_id,
                message_id: p.message_id,
                reactor_id: p.reactor_account_id,
                emoji: emoji(&kind, p.emoji_unified_code)?,
            }
        }
        MessageKind::Unknown(kind) => RelayCommand::Passthrough { kind },
    };

    Ok((command, send_to))
}

/// 空の `send_to` は宛先なし
///
/// ClientId として登録できない値の宛先は接続中のクライアントになり得ないため、
/// 宛先なしとして扱う。永続化は通常どおり行われる。
fn recipient(send_to: String) -> Option<ClientId> {
    if send_to.is_empty() {
        return None;
    }
    match ClientId::new(send_to) {
        Ok(client_id) => Some(client_id),
        Err(e) => {
            tracing::warn!("Ignoring unreachable send_to: {}", e);
            None
        }
    }
}

fn decode_payload<T: DeserializeOwned>(
    kind: &MessageKind,
    payload: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(payload).map_err(|source| DecodeError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}

fn emoji(kind: &MessageKind, value: String) -> Result<EmojiCode, DecodeError> {
    EmojiCode::new(value).map_err(|source| DecodeError::InvalidField {
        kind: kind.to_string(),
        source,
    })
}

fn reaction(kind: &MessageKind, dto: dto::ReactionDto) -> Result<Reaction, DecodeError> {
    Ok(Reaction::new(
        dto.reactor_account_id,
        emoji(kind, dto.emoji_unified_code)?,
    ))
}

fn reactions(kind: &MessageKind, dtos: Vec<dto::ReactionDto>) -> Result<ReactionSet, DecodeError> {
    dtos.into_iter().map(|dto| reaction(kind, dto)).collect()
}

fn channel_draft(
    kind: &MessageKind,
    dto: dto::ChannelMessageDto,
) -> Result<ChannelMessageDraft, DecodeError> {
    Ok(ChannelMessageDraft {
        message_id: dto.message_id,
        author_id: dto.author_account_id,
        channel_id: dto.channel_id,
        content: dto.content,
        reactions: reactions(kind, dto.reactions)?,
        files: dto.files.into_iter().map(Into::into).collect(),
        attached_thread_id: dto.attached_thread_id,
    })
}

fn thread_draft(
    kind: &MessageKind,
    dto: dto::ThreadMessageDto,
) -> Result<ThreadMessageDraft, DecodeError> {
    Ok(ThreadMessageDraft {
        message_id: dto.message_id,
        root_message_id: dto.root_message_id,
        author_id: dto.author_account_id,
        thread_id: dto.thread_id,
        content: dto.content,
        reactions: reactions(kind, dto.reactions)?,
        files: dto.files.into_iter().map(Into::into).collect(),
    })
}

impl From<dto::FileDto> for FileAttachment {
    fn from(dto: dto::FileDto) -> Self {
        Self {
            file_name: dto.file_name,
            file_type: dto.file_type,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Reaction> for dto::ReactionDto {
    fn from(model: &Reaction) -> Self {
        Self {
            reactor_account_id: model.reactor_id,
            emoji_unified_code: model.emoji.as_str().to_string(),
        }
    }
}

impl From<FileAttachment> for dto::FileDto {
    fn from(model: FileAttachment) -> Self {
        Self {
            file_name: model.file_name,
            file_type: model.file_type,
        }
    }
}

impl From<ChannelMessage> for dto::ChannelMessageDto {
    fn from(model: ChannelMessage) -> Self {
        Self {
            message_id: model.message_id,
            author_account_id: model.author_id,
            channel_id: model.channel_id,
            content: model.content,
            reactions: model.reactions.iter().map(Into::into).collect(),
            files: model.files.into_iter().map(Into::into).collect(),
            attached_thread_id: model.attached_thread_id,
            date_created: Some(model.created_at),
        }
    }
}

impl From<ThreadMessage> for dto::ThreadMessageDto {
    fn from(model: ThreadMessage) -> Self {
        Self {
            message_id: model.message_id,
            root_message_id: model.root_message_id,
            author_account_id: model.author_id,
            thread_id: model.thread_id,
            content: model.content,
            reactions: model.reactions.iter().map(Into::into).collect(),
            files: model.files.into_iter().map(Into::into).collect(),
            date_created: Some(model.created_at),
        }
    }
}

impl From<DeliveryReport> for http_dto::DeliveryReportDto {
    fn from(report: DeliveryReport) -> Self {
        Self {
            delivered: report.delivered.into_iter().map(ClientId::into_string).collect(),
            offline: report.offline.into_iter().map(ClientId::into_string).collect(),
            failed: report.failed.into_iter().map(ClientId::into_string).collect(),
        }
    }
}

impl From<ConnectedClient> for http_dto::ConnectedClientDto {
    fn from(model: ConnectedClient) -> Self {
        Self {
            client_id: model.client_id.into_string(),
            connected_at: to_rfc3339_millis(model.connected_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, ChannelId, MessageId, ThreadId};
    use chrono::DateTime;
    use serde_json::json;
    use uuid::Uuid;

    const MESSAGE_ID: &str = "00000000-0000-0000-0000-00000000000a";
    const AUTHOR_ID: &str = "00000000-0000-0000-0000-000000000014";
    const CHANNEL_ID: &str = "00000000-0000-0000-0000-00000000001e";
    const THREAD_ID: &str = "00000000-0000-0000-0000-000000000028";

    #[test]
    fn test_decode_new_channel_message_without_recipient() {
        // テスト項目: send_to が空の NEW_CHANNEL_MESSAGE は宛先なしの新規メッセージになる
        // given (前提条件):
        let frame = json!({
            "type": "NEW_CHANNEL_MESSAGE",
            "send_to": "",
            "payload": {
                "channel_message": {
                    "message_id": MESSAGE_ID,
                    "author_account_id": AUTHOR_ID,
                    "channel_id": CHANNEL_ID,
                    "content": "hello",
                    "files": [{ "file_name": "a.png", "file_type": "image/png" }],
                }
            }
        })
        .to_string();

        // when (操作):
        let message = decode_frame(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(message.send_to, None);
        assert_eq!(message.frame, frame);
        let RelayCommand::NewChannelMessage(draft) = message.command else {
            panic!("expected NewChannelMessage");
        };
        assert_eq!(draft.message_id, MessageId::new(Uuid::from_u128(10)));
        assert_eq!(draft.author_id, AccountId::new(Uuid::from_u128(20)));
        assert_eq!(draft.channel_id, ChannelId::new(Uuid::from_u128(30)));
        assert_eq!(draft.content, "hello");
        assert_eq!(draft.files[0].file_name, "a.png");
        assert!(draft.reactions.is_empty());
    }

    #[test]
    fn test_decode_unknown_type_is_passthrough() {
        // テスト項目: 未知の type は Passthrough になり、フレームはそのまま保持される
        // given (前提条件):
        let frame = r#"{"type":"ANYTHING","send_to":"bob","payload":{"x":1}}"#;

        // when (操作):
        let message = decode_frame(frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            message.command,
            RelayCommand::Passthrough {
                kind: "ANYTHING".to_string()
            }
        );
        assert_eq!(message.send_to, Some(ClientId::new("bob".to_string()).unwrap()));
        assert_eq!(message.frame, frame);
    }

    #[test]
    fn test_decode_missing_send_to_and_payload() {
        // テスト項目: send_to と payload は省略できる
        // given (前提条件):
        let frame = r#"{"type":"PING"}"#;

        // when (操作):
        let message = decode_frame(frame).unwrap();

        // then (期待する結果):
        assert_eq!(message.send_to, None);
        assert!(matches!(message.command, RelayCommand::Passthrough { .. }));
    }

    #[test]
    fn test_decode_malformed_json_is_error() {
        // テスト項目: JSON として不正なフレームは MalformedEnvelope になる
        // given (前提条件):
        let frame = "{not json";

        // when (操作):
        let result = decode_frame(frame);

        // then (期待する結果):
        assert!(matches!(result, Err(DecodeError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_decode_missing_payload_field_is_error() {
        // テスト項目: 必須フィールドが欠けた payload は InvalidPayload になる
        // given (前提条件):
        let frame = json!({
            "type": "DELETE_CHANNEL_MESSAGE",
            "payload": { "message_id": MESSAGE_ID, "channel_id": CHANNEL_ID }
        })
        .to_string();

        // when (操作):
        let result = decode_frame(&frame);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(DecodeError::InvalidPayload { ref kind, .. }) if kind == "DELETE_CHANNEL_MESSAGE"
        ));
    }

    #[test]
    fn test_decode_mistyped_id_is_error() {
        // テスト項目: UUID でない ID は InvalidPayload になる
        // given (前提条件):
        let frame = json!({
            "type": "DELETE_THREAD_MESSAGE",
            "payload": {
                "message_id": "not-a-uuid",
                "author_account_id": AUTHOR_ID,
                "thread_id": THREAD_ID,
            }
        })
        .to_string();

        // when (操作):
        let result = decode_frame(&frame);

        // then (期待する結果):
        assert!(matches!(result, Err(DecodeError::InvalidPayload { .. })));
    }

    #[test]
    fn test_decode_blank_emoji_is_invalid_field() {
        // テスト項目: 空の絵文字コードは InvalidField になる
        // given (前提条件):
        let frame = json!({
            "type": "DELETE_THREAD_MESSAGE_REACTION",
            "payload": {
                "message_id": MESSAGE_ID,
                "reactor_account_id": AUTHOR_ID,
                "thread_id": THREAD_ID,
                "emoji_unified_code": "",
            }
        })
        .to_string();

        // when (操作):
        let result = decode_frame(&frame);

        // then (期待する結果):
        assert!(matches!(result, Err(DecodeError::InvalidField { .. })));
    }

    #[test]
    fn test_decode_unreachable_send_to_keeps_command() {
        // テスト項目: ClientId にできない send_to は宛先なしとなり、コマンドはデコードされる
        // given (前提条件):
        let frame = json!({
            "type": "NEW_CHANNEL_MESSAGE",
            "send_to": " bob",
            "payload": {
                "channel_message": {
                    "message_id": MESSAGE_ID,
                    "author_account_id": AUTHOR_ID,
                    "channel_id": CHANNEL_ID,
                    "content": "hello",
                }
            }
        })
        .to_string();

        // when (操作):
        let message = decode_frame(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(message.send_to, None);
        assert!(matches!(message.command, RelayCommand::NewChannelMessage(_)));
    }

    #[test]
    fn test_decode_legacy_payload_keys() {
        // テスト項目: catache_ 接頭辞付きの payload キーも受け付ける
        // given (前提条件):
        let channel = json!({
            "message_id": MESSAGE_ID,
            "author_account_id": AUTHOR_ID,
            "channel_id": CHANNEL_ID,
            "content": "hello",
        });
        let thread = json!({
            "message_id": MESSAGE_ID,
            "root_message_id": MESSAGE_ID,
            "author_account_id": AUTHOR_ID,
            "thread_id": THREAD_ID,
            "content": "hello",
        });
        let frames = [
            json!({"type": "NEW_CHANNEL_MESSAGE", "payload": {"catache_channel_message": channel}}),
            json!({"type": "NEW_THREAD_MESSAGE", "payload": {"catache_thread_message": thread}}),
            json!({"type": "UPDATE_CHANNEL_MESSAGE", "payload": {"new_catache_channel_message": channel}}),
            json!({"type": "UPDATE_THREAD_MESSAGE", "payload": {"new_catache_thread_message": thread}}),
        ];

        for frame in frames {
            // when (操作):
            let result = decode_frame(&frame.to_string());

            // then (期待する結果):
            let message = result.unwrap();
            assert!(!matches!(message.command, RelayCommand::Passthrough { .. }));
            assert_eq!(message.kind().as_str(), frame["type"].as_str().unwrap());
        }
    }

    #[test]
    fn test_decode_channel_reaction() {
        // テスト項目: NEW_CHANNEL_MESSAGE_REACTION がリアクション追加コマンドになる
        // given (前提条件):
        let frame = json!({
            "type": "NEW_CHANNEL_MESSAGE_REACTION",
            "send_to": "bob",
            "payload": {
                "message_id": MESSAGE_ID,
                "channel_id": CHANNEL_ID,
                "reaction": { "reactor_account_id": AUTHOR_ID, "emoji_unified_code": "1f600" },
            }
        })
        .to_string();

        // when (操作):
        let message = decode_frame(&frame).unwrap();

        // then (期待する結果):
        let RelayCommand::AddChannelReaction { reaction, .. } = message.command else {
            panic!("expected AddChannelReaction");
        };
        assert_eq!(reaction.emoji.as_str(), "1f600");
        assert_eq!(reaction.reactor_id, AccountId::new(Uuid::from_u128(20)));
    }

    #[test]
    fn test_envelope_dto_into_relay_message_serializes_frame() {
        // テスト項目: HTTP から投入された envelope は JSON にシリアライズされたフレームを持つ
        // given (前提条件):
        let envelope = dto::EnvelopeDto {
            r#type: "ANYTHING".to_string(),
            send_to: "bob".to_string(),
            payload: json!({ "text": "hi" }),
        };

        // when (操作):
        let message = RelayMessage::try_from(envelope.clone()).unwrap();

        // then (期待する結果):
        let reparsed: dto::EnvelopeDto = serde_json::from_str(&message.frame).unwrap();
        assert_eq!(reparsed, envelope);
    }

    #[test]
    fn test_channel_message_to_dto_includes_date_created() {
        // テスト項目: 永続化済みのメッセージを DTO にすると date_created が含まれる
        // given (前提条件):
        let created_at = DateTime::from_timestamp_millis(1_672_531_200_000).unwrap();
        let message = ChannelMessageDraft {
            message_id: MessageId::new(Uuid::from_u128(10)),
            author_id: AccountId::new(Uuid::from_u128(20)),
            channel_id: ChannelId::new(Uuid::from_u128(30)),
            content: "hello".to_string(),
            reactions: ReactionSet::new(),
            files: vec![],
            attached_thread_id: Some(ThreadId::new(Uuid::from_u128(40))),
        }
        .stamp(created_at);

        // when (操作):
        let dto: dto::ChannelMessageDto = message.into();
        let value = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(value["date_created"], "2023-01-01T00:00:00Z");
        assert_eq!(value["attached_thread_id"], THREAD_ID);
        assert_eq!(value["message_id"], MESSAGE_ID);
    }

    #[test]
    fn test_connected_client_to_dto_formats_timestamp() {
        // テスト項目: 接続時刻が RFC 3339（ミリ秒精度）の文字列になる
        // given (前提条件):
        let client = ConnectedClient {
            client_id: ClientId::new("alice".to_string()).unwrap(),
            connected_at: DateTime::from_timestamp_millis(1_672_531_200_123).unwrap(),
        };

        // when (操作):
        let dto: http_dto::ConnectedClientDto = client.into();

        // then (期待する結果):
        assert_eq!(dto.client_id, "alice");
        assert_eq!(dto.connected_at, "2023-01-01T00:00:00.123Z");
    }
}
