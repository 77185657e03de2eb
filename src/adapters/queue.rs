//! 單一行程部署與測試用的記憶體訊息佇列
//!
//! 至少一次語意：收到的訊息在確認、重排（之後以更高的 attempt 重送）或
//! 移入 dead-letter 之前都算在途中。已確認的 id 與 dead-letter 只保留最近
//! `history_limit` 筆，總數另以計數器記錄。

use crate::domain::model::Delivery;
use crate::domain::ports::MessageQueue;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// 已確認 id 與 dead-letter 的預設保留筆數
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub delivery: Delivery,
    pub reason: String,
}

struct QueueState {
    ready: Mutex<VecDeque<Delivery>>,
    in_flight: Mutex<HashMap<u64, Delivery>>,
    acked: Mutex<VecDeque<u64>>,
    acked_total: AtomicU64,
    dead_letters: Mutex<VecDeque<DeadLetter>>,
    dead_lettered_total: AtomicU64,
    history_limit: usize,
    next_id: AtomicU64,
    closed: AtomicBool,
    available: Notify,
}

/// 複製成本低，所有複本共用同一個佇列
#[derive(Clone)]
pub struct InMemoryQueue {
    state: Arc<QueueState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // 鎖內不會 panic，中毒時仍沿用內部資料
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 放入新項目，超過上限時丟棄最舊的
fn push_bounded<T>(history: &mut VecDeque<T>, item: T, limit: usize) {
    history.push_back(item);
    while history.len() > limit {
        history.pop_front();
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            state: Arc::new(QueueState {
                ready: Mutex::new(VecDeque::new()),
                in_flight: Mutex::new(HashMap::new()),
                acked: Mutex::new(VecDeque::new()),
                acked_total: AtomicU64::new(0),
                dead_letters: Mutex::new(VecDeque::new()),
                dead_lettered_total: AtomicU64::new(0),
                history_limit,
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                available: Notify::new(),
            }),
        }
    }

    /// 放入原始 payload，回傳訊息 id
    pub fn publish(&self, payload: impl Into<Vec<u8>>) -> Result<u64> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(ServiceError::QueueError {
                operation: "publish".to_string(),
                message: "queue is closed".to_string(),
            });
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.state.ready).push_back(Delivery {
            id,
            payload: payload.into(),
            attempt: 1,
            received_at: Utc::now(),
        });
        self.state.available.notify_one();
        Ok(id)
    }

    pub fn publish_json<T: Serialize>(&self, message: &T) -> Result<u64> {
        let payload = serde_json::to_vec(message)?;
        self.publish(payload)
    }

    /// 停止接收新訊息；接收端取完剩下的訊息後會拿到 `None`
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
        self.state.available.notify_waiters();
        self.state.available.notify_one();
    }

    /// 最近確認的訊息 id（最多 `history_limit` 筆，由舊到新）
    pub fn acknowledged(&self) -> Vec<u64> {
        lock(&self.state.acked).iter().copied().collect()
    }

    pub fn acknowledged_count(&self) -> u64 {
        self.state.acked_total.load(Ordering::SeqCst)
    }

    /// 最近的 dead-letter（最多 `history_limit` 筆），不會取走
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        lock(&self.state.dead_letters).iter().cloned().collect()
    }

    /// 取走目前保留的 dead-letter
    pub fn drain_dead_letters(&self) -> Vec<DeadLetter> {
        lock(&self.state.dead_letters).drain(..).collect()
    }

    pub fn dead_lettered_count(&self) -> u64 {
        self.state.dead_lettered_total.load(Ordering::SeqCst)
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.state.ready).len()
    }

    pub fn in_flight_len(&self) -> usize {
        lock(&self.state.in_flight).len()
    }

    fn take_in_flight(&self, delivery: &Delivery, operation: &str) -> Result<Delivery> {
        lock(&self.state.in_flight)
            .remove(&delivery.id)
            .ok_or_else(|| ServiceError::QueueError {
                operation: operation.to_string(),
                message: format!("message {} is not in flight", delivery.id),
            })
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn receive(&self) -> Result<Option<Delivery>> {
        loop {
            // 先登記等待，再檢查佇列，避免漏掉 publish/close 的通知
            let notified = self.state.available.notified();

            let next = lock(&self.state.ready).pop_front();
            if let Some(mut delivery) = next {
                delivery.received_at = Utc::now();
                lock(&self.state.in_flight).insert(delivery.id, delivery.clone());
                return Ok(Some(delivery));
            }

            if self.state.closed.load(Ordering::SeqCst) {
                return Ok(None);
            }

            notified.await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let delivery = self.take_in_flight(delivery, "ack")?;
        self.state.acked_total.fetch_add(1, Ordering::SeqCst);
        push_bounded(
            &mut lock(&self.state.acked),
            delivery.id,
            self.state.history_limit,
        );
        Ok(())
    }

    async fn requeue(&self, delivery: &Delivery) -> Result<()> {
        let mut delivery = self.take_in_flight(delivery, "requeue")?;
        delivery.attempt += 1;
        lock(&self.state.ready).push_back(delivery);
        self.state.available.notify_one();
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<()> {
        let delivery = self.take_in_flight(delivery, "dead_letter")?;
        self.state.dead_lettered_total.fetch_add(1, Ordering::SeqCst);
        push_bounded(
            &mut lock(&self.state.dead_letters),
            DeadLetter {
                delivery,
                reason: reason.to_string(),
            },
            self.state.history_limit,
        );
        Ok(())
    }
}
