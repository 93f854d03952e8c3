use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// プッシュ型のネットワークコールバックとプル型のイテレータを繋ぐキュー
///
/// 容量はソフト上限で、プロデューサをブロックしない。バックプレッシャは
/// 消費側が占有数と低水位を比べて「次ページを要求するか」の判断に使う。
/// close 後も残っているアイテムは全て pop で排出され、空になってから
/// None を返す。
pub struct StreamQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
    capacity: usize,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> StreamQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// プロデューサ側の投入。close 済みなら黙って捨てる
    pub fn push(&self, item: T) {
        {
            let mut inner = self.inner.lock().expect("stream queue poisoned");
            if inner.closed {
                return;
            }
            inner.items.push_back(item);
        }
        self.notify.notify_one();
    }

    /// コンシューマ側の取り出し
    ///
    /// アイテムが来るか、close されてキューが空になるまで待つ。
    /// None は end-of-sequence を意味する。
    pub async fn pop(&self) -> Option<T> {
        loop {
            // ロック解放とウェイクの競合を避けるため、チェックの前に futures を作る
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().expect("stream queue poisoned");
                if let Some(item) = inner.items.pop_front() {
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// アップストリーム終了時に呼ぶ。冪等で、待機中のコンシューマを起こす
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().expect("stream queue poisoned");
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.notify.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("stream queue poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("stream queue poisoned").closed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
