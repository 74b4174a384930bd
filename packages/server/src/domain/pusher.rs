//! メッセージ配送（Delivery）の抽象化

use async_trait::async_trait;

use super::ClientId;

/// 1 宛先への配送結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 書き込みに成功した
    Delivered,
    /// 宛先が接続していない（エラーではない）
    Offline,
    /// 書き込みに失敗した
    Failed,
}

/// 複数宛先への配送結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<ClientId>,
    pub offline: Vec<ClientId>,
    pub failed: Vec<ClientId>,
}

impl DeliveryReport {
    pub fn record(&mut self, client_id: ClientId, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered.push(client_id),
            DeliveryOutcome::Offline => self.offline.push(client_id),
            DeliveryOutcome::Failed => self.failed.push(client_id),
        }
    }
}

/// 接続中のクライアントへフレームを送る
///
/// 配送はベストエフォート。キューイングや再送は行わない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定のクライアントへ送信
    async fn push_to(&self, client_id: &ClientId, frame: &str) -> DeliveryOutcome;

    /// 複数のクライアントへ並行して送信し、全ての試行が終わるまで待つ
    async fn push_to_many(&self, client_ids: &[ClientId], frame: &str) -> DeliveryReport;
}
