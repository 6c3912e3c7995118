//! 配置变更通知抽象接口

use tokio::sync::mpsc;

/// 变更通知接收器
///
/// 每个订阅者持有一个容量为 1 的通道。通知不计数也不携带差异，
/// 收到信号后应重新读取全部配置。
pub type ChangeReceiver = mpsc::Receiver<()>;

/// 配置变更通知 trait
///
/// 提供者检测到数据源变化后调用，唤醒所有订阅者。
pub trait ChangeNotifier: Send + Sync {
    /// 以非阻塞方式通知所有订阅者
    fn notify_watchers(&self);
}
