use crate::domain::entities::RawFeedRecord;
use crate::domain::value_objects::FeedFilter;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// トランスポートがシンクへ押し込むストリームイベント
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// 1 ページ分の生レコード（到着順）
    Records(Vec<RawFeedRecord>),
    /// サーバ側がストリームを正常終了した
    Completed,
    /// ストリームレベルの失敗。以降ページ要求は行われない
    Failed(String),
}

/// フィードのストリーミング RPC チャネル（外部コラボレータ）
///
/// open はフィルタ付きリクエストを発行し、以降のイベントを sink に
/// プッシュする。ページ取得の続きは返されたサブスクリプションへ依頼する。
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn open(
        &self,
        filter: &FeedFilter,
        page_size: u32,
        sink: UnboundedSender<StreamEvent>,
    ) -> Result<Arc<dyn FeedSubscription>, AppError>;
}

/// 開いたストリームへの操作ハンドル
#[async_trait]
pub trait FeedSubscription: Send + Sync {
    /// 次ページを要求する
    async fn request_page(&self) -> Result<(), AppError>;

    /// 購読を打ち切る。冪等
    fn cancel(&self);
}
