//! 配置文件轮询刷新

use crate::providers::InMemoryProvider;
use config_abstractions::{ChangeNotifier, SharedDecoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 文件刷新任务句柄
///
/// 丢弃句柄不会停止任务；需要停止时调用 [`RefreshHandle::stop`]，
/// 或通过 [`crate::Store::stop_refreshing`] 停止存储下的全部刷新任务。
#[derive(Debug)]
pub struct RefreshHandle {
    path: PathBuf,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// 被轮询的文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 停止刷新任务
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// 刷新任务是否已停止或已请求停止
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.task.is_finished()
    }

    /// 等待刷新任务结束
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("配置文件刷新任务异常退出: {} - {}", self.path.display(), e);
        }
    }
}

/// 文件轮询刷新器
///
/// 周期性检查文件修改时间，发现变化后重新读取并解码，整体替换目标提供者的配置项，
/// 然后通知所有订阅者。单次失败会被忽略，在下一个周期重试，上一次成功加载的配置保持有效。
pub(crate) struct FileRefresher {
    pub(crate) path: PathBuf,
    pub(crate) decoder: SharedDecoder,
    pub(crate) target: Arc<InMemoryProvider>,
    pub(crate) notifier: Arc<dyn ChangeNotifier>,
    pub(crate) interval: Duration,
    /// 最近一次成功加载时对应的时间
    pub(crate) last_loaded: SystemTime,
    pub(crate) token: CancellationToken,
}

impl FileRefresher {
    /// 在给定运行时上启动刷新任务
    pub(crate) fn spawn(self, runtime: &Handle) -> RefreshHandle {
        let path = self.path.clone();
        let token = self.token.clone();
        debug!("启动配置文件刷新任务: {}, 间隔: {:?}", path.display(), self.interval);
        let task = runtime.spawn(self.run());
        RefreshHandle { path, token, task }
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.token.cancelled() => {
                    debug!("配置文件刷新任务已停止: {}", self.path.display());
                    break;
                }
                _ = ticker.tick() => {}
            }
            self.poll_once().await;
        }
    }

    /// 执行一次检查，文件有更新时重新加载
    async fn poll_once(&mut self) {
        let modified = match tokio::fs::metadata(&self.path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                debug!("获取配置文件状态失败: {} - {}", self.path.display(), e);
                return;
            }
        };
        if modified <= self.last_loaded {
            return;
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("读取配置文件失败: {} - {}", self.path.display(), e);
                return;
            }
        };
        let items = match self.decoder.decode(&bytes) {
            Ok(items) => items,
            Err(e) => {
                debug!("解码配置文件失败: {} - {}", self.path.display(), e);
                return;
            }
        };

        self.target.replace(items);
        self.last_loaded = modified;
        info!("配置文件已刷新: {}", self.path.display());
        self.notifier.notify_watchers();
    }
}
