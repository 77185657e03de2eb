use crate::app::notification::sender::NotificationSender;
use crate::domain::model::{Delivery, Notification, NotificationPayload};
use crate::domain::ports::MessageQueue;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 未設定時的投遞次數上限
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Starting,
    Listening,
    Processing,
    Stopped,
}

/// 單筆訊息的處理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Acknowledged,
    Requeued,
    DeadLettered,
    /// 處理途中收到關機訊號，訊息已放回佇列
    Abandoned,
}

/// 可重試失敗的退避策略：第 n 次失敗後等待 `base * 2^(n-1)`，最多 `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base
            .checked_mul(1u32 << exponent)
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}

/// 關機訊號：`true` 代表要求停止
pub type ShutdownSignal = watch::Receiver<bool>;

/// 等到關機訊號為 `true`；發送端被丟棄時視為永遠不會關機
async fn shutdown_requested(shutdown: &mut ShutdownSignal) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// 從佇列消費通知事件並驅動投遞流程的背景工作
///
/// 至少一次語意：投遞成功才確認；可重試的投遞失敗不確認，退避後放回佇列
/// 等待重送，直到達到投遞次數上限。無法解析的訊息、未知的接收者類型，
/// 以及重試也不會成功的失敗（地址無效、查無使用者）直接進入 dead-letter。
pub struct QueueListener {
    queue: Arc<dyn MessageQueue>,
    sender: NotificationSender,
    max_delivery_attempts: u32,
    backoff: RetryBackoff,
    state: watch::Sender<ListenerState>,
}

impl QueueListener {
    pub fn new(queue: Arc<dyn MessageQueue>, sender: NotificationSender) -> Self {
        let (state, _) = watch::channel(ListenerState::Starting);
        Self {
            queue,
            sender,
            max_delivery_attempts: DEFAULT_MAX_DELIVERY_ATTEMPTS,
            backoff: RetryBackoff::default(),
            state,
        }
    }

    /// 達到上限的訊息改送 dead-letter，避免永久失敗的訊息無限重送
    pub fn with_max_delivery_attempts(mut self, max_attempts: u32) -> Self {
        self.max_delivery_attempts = max_attempts.max(1);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    fn transition(&self, next: ListenerState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::trace!("Queue listener {:?} -> {:?}", previous, next);
        }
    }

    /// 持續消費直到收到關機訊號或佇列關閉
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> Result<()> {
        self.transition(ListenerState::Starting);
        tracing::info!("🎧 Notification queue listener starting");
        self.transition(ListenerState::Listening);

        let result = self.listen(&mut shutdown).await;

        self.transition(ListenerState::Stopped);
        match &result {
            Ok(()) => tracing::info!("🛑 Notification queue listener stopped"),
            Err(e) => tracing::error!("❌ Notification queue listener failed: {}", e),
        }
        result
    }

    async fn listen(&self, shutdown: &mut ShutdownSignal) -> Result<()> {
        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => {
                    tracing::info!("Shutdown requested while waiting for messages");
                    return Ok(());
                }
                received = self.queue.receive() => received?,
            };

            let Some(delivery) = received else {
                tracing::info!("Queue closed, no more messages");
                return Ok(());
            };

            self.transition(ListenerState::Processing);
            let outcome = self.process(&delivery, shutdown).await?;
            if outcome == ProcessOutcome::Abandoned {
                return Ok(());
            }
            self.transition(ListenerState::Listening);
        }
    }

    /// 處理單筆訊息，並依結果確認、重排或送往 dead-letter
    pub async fn process(
        &self,
        delivery: &Delivery,
        shutdown: &mut ShutdownSignal,
    ) -> Result<ProcessOutcome> {
        let notification = match NotificationPayload::from_slice(&delivery.payload)
            .and_then(Notification::try_from)
        {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(
                    "☠️ Message {} is not processable, moving to dead-letter: {}",
                    delivery.id,
                    e
                );
                self.queue.dead_letter(delivery, &e.to_string()).await?;
                return Ok(ProcessOutcome::DeadLettered);
            }
        };

        let sent = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown) => {
                tracing::warn!(
                    "⏹️ Shutdown during delivery of message {}, returning it to the queue",
                    delivery.id
                );
                self.queue.requeue(delivery).await?;
                return Ok(ProcessOutcome::Abandoned);
            }
            sent = self.sender.send(&notification) => sent,
        };

        match sent {
            Ok(()) => {
                self.queue.ack(delivery).await?;
                tracing::info!(
                    "✅ Message {} delivered (attempt {})",
                    delivery.id,
                    delivery.attempt
                );
                Ok(ProcessOutcome::Acknowledged)
            }
            Err(e) if !e.is_retryable() => {
                tracing::error!(
                    "☠️ Message {} failed permanently, moving to dead-letter: {}",
                    delivery.id,
                    e
                );
                self.queue.dead_letter(delivery, &e.to_string()).await?;
                Ok(ProcessOutcome::DeadLettered)
            }
            Err(e) if delivery.attempt >= self.max_delivery_attempts => {
                tracing::error!(
                    "☠️ Message {} failed after {} attempts, moving to dead-letter: {}",
                    delivery.id,
                    delivery.attempt,
                    e
                );
                self.queue.dead_letter(delivery, &e.to_string()).await?;
                Ok(ProcessOutcome::DeadLettered)
            }
            Err(e) => {
                let delay = self.backoff.delay_for(delivery.attempt);
                tracing::warn!(
                    "🔁 Message {} delivery failed (attempt {}), requeueing in {:?}: {}",
                    delivery.id,
                    delivery.attempt,
                    delay,
                    e
                );

                tokio::select! {
                    biased;
                    _ = shutdown_requested(shutdown) => {
                        self.queue.requeue(delivery).await?;
                        return Ok(ProcessOutcome::Abandoned);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                // 退避為零時也要讓出執行緒，避免重送迴圈霸佔 runtime
                tokio::task::yield_now().await;

                self.queue.requeue(delivery).await?;
                Ok(ProcessOutcome::Requeued)
            }
        }
    }
}
