//! 状态消息
//!
//! 单槽位显示：每条消息在 2 秒后自动清除，新消息会取消上一条的清除任务，
//! 旧计时器不会误清后来的消息。

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::time::Duration;
use tokio::task::JoinHandle;

/// 消息自动清除的延迟
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    Error,
}

impl StatusKind {
    /// 对应页面上的 CSS 类名
    pub fn class_name(self) -> &'static str {
        match self {
            StatusKind::Ok => "ok",
            StatusKind::Error => "error",
        }
    }
}

/// 状态显示区域
pub trait StatusSink: Send + 'static {
    fn show(&mut self, kind: StatusKind, text: &str);
    fn clear(&mut self);
}

pub struct StatusDisplay<S: StatusSink> {
    sink: Arc<Mutex<S>>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    delay: Duration,
}

impl<S: StatusSink> StatusDisplay<S> {
    pub fn new(sink: S) -> Self {
        Self::with_delay(sink, STATUS_CLEAR_DELAY)
    }

    pub fn with_delay(sink: S, delay: Duration) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            delay,
        }
    }

    /// 显示消息并重新安排清除；需要在 tokio 运行时内调用
    pub fn show(&mut self, kind: StatusKind, text: &str) {
        let current = {
            let mut sink = lock(&self.sink);
            sink.show(kind, text);
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let sink = Arc::clone(&self.sink);
        let generation = Arc::clone(&self.generation);
        let deadline = tokio::time::Instant::now() + self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut sink = lock(&sink);
            if generation.load(Ordering::SeqCst) == current {
                sink.clear();
            }
        }));
    }

    /// 立即清除并取消待执行的清除任务
    pub fn clear(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let mut sink = lock(&self.sink);
        self.generation.fetch_add(1, Ordering::SeqCst);
        sink.clear();
    }

    /// 读取底层显示区域
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.sink))
    }
}

impl<S: StatusSink> Drop for StatusDisplay<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

fn lock<S>(sink: &Mutex<S>) -> MutexGuard<'_, S> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}
