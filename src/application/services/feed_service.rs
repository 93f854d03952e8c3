use crate::application::ports::{FeedSubscription, FeedTransport, StreamEvent};
use crate::application::services::hydration_service::HydrationService;
use crate::domain::entities::Post;
use crate::domain::value_objects::FeedFilter;
use crate::shared::config::StreamConfig;
use crate::shared::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod queue;
pub use queue::StreamQueue;


/// 再スタート可能なフィードのファクトリ
///
/// subscribe のたびに同じフィルタで新しいストリームを先頭から開く。
/// 途中からの再開はない。
pub struct FeedService {
    transport: Arc<dyn FeedTransport>,
    hydrator: Arc<HydrationService>,
    config: StreamConfig,
}

impl FeedService {
    pub fn new(
        transport: Arc<dyn FeedTransport>,
        hydrator: Arc<HydrationService>,
        config: StreamConfig,
    ) -> Self {
        Self {
            transport,
            hydrator,
            config,
        }
    }

    /// 新しいトラバーサルを開始するイテレータを作る
    pub fn subscribe(&self, filter: FeedFilter) -> FeedIterator {
        FeedIterator::new(
            self.transport.clone(),
            self.hydrator.clone(),
            self.config.clone(),
            filter,
        )
    }
}

/// イテレータのライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    NotStarted,
    Streaming,
    Draining,
    Errored,
    Done,
}

/// ポンプとイテレータで共有するストリーム状態
struct StreamShared {
    /// 未応答のページ要求があるか。応答ページの投入完了でクリアされる
    page_pending: AtomicBool,
    /// トランスポート失敗。以降ページ要求は行わない
    errored: AtomicBool,
}

/// ライブストリーム上のステートフルなカーソル
///
/// `next()` が唯一のブロッキング呼び出し。UI 側のスクロールに引かれて
/// キューから取り出し、占有数が低水位まで落ちたら次ページを要求する。
pub struct FeedIterator {
    transport: Arc<dyn FeedTransport>,
    hydrator: Arc<HydrationService>,
    config: StreamConfig,
    filter: FeedFilter,
    queue: Arc<StreamQueue<Post>>,
    shared: Arc<StreamShared>,
    subscription: Option<Arc<dyn FeedSubscription>>,
    pump: Option<JoinHandle<()>>,
    state: IteratorState,
}

impl FeedIterator {
    fn new(
        transport: Arc<dyn FeedTransport>,
        hydrator: Arc<HydrationService>,
        config: StreamConfig,
        filter: FeedFilter,
    ) -> Self {
        let queue = Arc::new(StreamQueue::new(config.queue_capacity));
        Self {
            transport,
            hydrator,
            config,
            filter,
            queue,
            shared: Arc::new(StreamShared {
                page_pending: AtomicBool::new(false),
                errored: AtomicBool::new(false),
            }),
            subscription: None,
            pump: None,
            state: IteratorState::NotStarted,
        }
    }

    /// 次のハイドレート済み投稿を返す。None は end-of-sequence
    pub async fn next(&mut self) -> Option<Post> {
        if self.state == IteratorState::Done {
            return None;
        }

        if self.state == IteratorState::NotStarted {
            if let Err(e) = self.open().await {
                warn!("Failed to open feed stream ({}): {e}", self.filter);
                self.shared.errored.store(true, Ordering::SeqCst);
                self.queue.close();
                self.state = IteratorState::Errored;
            }
        }

        // pop で眠る前に供給を確認する。キューが先に空になっていた場合、
        // ここで要求しておかないと誰もページを頼まないまま待ち続ける
        self.sync_state();
        self.maybe_request_page().await;

        match self.queue.pop().await {
            Some(post) => {
                self.sync_state();
                self.maybe_request_page().await;
                Some(post)
            }
            None => {
                debug!("Feed stream drained ({})", self.filter);
                self.state = IteratorState::Done;
                None
            }
        }
    }

    /// 現在のライフサイクル状態
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// キューに滞留しているハイドレート済み投稿の数
    pub fn buffered(&self) -> usize {
        self.queue.len()
    }

    async fn open(&mut self) -> Result<(), AppError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self
            .transport
            .open(&self.filter, self.config.page_size, tx)
            .await?;

        self.pump = Some(spawn_pump(
            rx,
            self.queue.clone(),
            self.hydrator.clone(),
            self.shared.clone(),
            subscription.clone(),
        ));

        // 最初のページ要求
        self.shared.page_pending.store(true, Ordering::SeqCst);
        subscription.request_page().await?;

        self.subscription = Some(subscription);
        self.state = IteratorState::Streaming;
        info!("Opened feed stream: {}", self.filter);
        Ok(())
    }

    fn sync_state(&mut self) {
        if self.queue.is_closed() {
            self.state = if self.shared.errored.load(Ordering::SeqCst) {
                IteratorState::Errored
            } else {
                IteratorState::Draining
            };
        }
    }

    /// 占有数が低水位まで落ちていて、要求中のページが無ければ次ページを頼む
    async fn maybe_request_page(&mut self) {
        if self.state != IteratorState::Streaming {
            return;
        }
        if self.queue.len() > self.config.low_water_mark {
            return;
        }
        if self.shared.page_pending.swap(true, Ordering::SeqCst) {
            return;
        }

        let Some(subscription) = &self.subscription else {
            return;
        };
        if let Err(e) = subscription.request_page().await {
            warn!("Page request failed ({}): {e}", self.filter);
            self.shared.errored.store(true, Ordering::SeqCst);
            self.queue.close();
            self.state = IteratorState::Errored;
        }
    }
}

impl Drop for FeedIterator {
    fn drop(&mut self) {
        if let Some(subscription) = &self.subscription {
            subscription.cancel();
        }
        if let Some(pump) = &self.pump {
            pump.abort();
        }
        self.queue.close();
    }
}

/// プロデューサ側のポンプを起動する
///
/// トランスポートの到着コールバックに相当するコンテキスト。レコードを
/// 到着順にインラインでハイドレートして 1 件ずつ投入するため、並列完了
/// による順序の入れ替わりは起きない。レコード単位に閉じる失敗はログして
/// 捨て、閉じない失敗はストリーム全体を終わらせる。
fn spawn_pump(
    mut rx: UnboundedReceiver<StreamEvent>,
    queue: Arc<StreamQueue<Post>>,
    hydrator: Arc<HydrationService>,
    shared: Arc<StreamShared>,
    subscription: Arc<dyn FeedSubscription>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Records(records) => {
                    let mut pushed = 0usize;
                    for record in records {
                        match hydrator.hydrate(&record).await {
                            Ok(post) => {
                                queue.push(post);
                                pushed += 1;
                            }
                            Err(e) if e.is_record_scoped() => {
                                warn!("Dropping feed record '{}': {e}", record.id);
                            }
                            Err(e) => {
                                warn!("Feed stream failed during hydration: {e}");
                                shared.errored.store(true, Ordering::SeqCst);
                                queue.close();
                                return;
                            }
                        }
                    }
                    if pushed == 0 && queue.is_empty() {
                        // ページの全件が落ちてキューも空の場合、コンシューマは
                        // pop で眠っていて低水位チェックに戻ってこない。要求中
                        // フラグは立てたまま、ここで次ページを引く
                        if let Err(e) = subscription.request_page().await {
                            warn!("Page request failed after a fully dropped page: {e}");
                            shared.errored.store(true, Ordering::SeqCst);
                            queue.close();
                            return;
                        }
                    } else {
                        // ページ投入が終わってから次の要求を解禁する
                        shared.page_pending.store(false, Ordering::SeqCst);
                    }
                }
                StreamEvent::Completed => {
                    debug!("Feed stream completed upstream");
                    queue.close();
                    return;
                }
                StreamEvent::Failed(msg) => {
                    warn!("Feed stream failed upstream: {msg}");
                    shared.errored.store(true, Ordering::SeqCst);
                    queue.close();
                    return;
                }
            }
        }
        // 送信側が黙って消えた場合も終了として扱う
        queue.close();
    })
}
