//! 配置变更订阅与通知分发

use config_abstractions::{ChangeNotifier, ChangeReceiver};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// 订阅者注册表
///
/// 每个订阅者对应一个容量为 1 的通道。通知采用非阻塞发送：
/// 订阅者尚未消费上一次信号时，新的信号直接丢弃，因此同一通道中最多只有一个待处理信号。
#[derive(Debug, Default)]
pub struct WatcherRegistry {
    senders: Mutex<Vec<mpsc::Sender<()>>>,
}

impl WatcherRegistry {
    /// 创建新的订阅者注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增订阅者，返回其接收端
    pub fn subscribe(&self) -> ChangeReceiver {
        let (sender, receiver) = mpsc::channel(1);
        let mut senders = self.senders.lock();
        senders.push(sender);
        debug!("新增配置变更订阅者，当前数量: {}", senders.len());
        receiver
    }

    /// 当前订阅者数量
    pub fn len(&self) -> usize {
        self.senders.lock().len()
    }

    /// 是否没有订阅者
    pub fn is_empty(&self) -> bool {
        self.senders.lock().is_empty()
    }
}

impl ChangeNotifier for WatcherRegistry {
    fn notify_watchers(&self) {
        let mut senders = self.senders.lock();
        // 接收端已丢弃的订阅者顺带移除
        senders.retain(|sender| match sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        });
    }
}
