//! 配置存储实现
//!
//! [`Store`] 维护提供者名称到提供者的映射和变更订阅者列表。
//! 两者各自使用独立的锁，锁只在读取或修改期间持有，从不跨越 I/O 或提供者调用。

use crate::providers::{EnvVariableProvider, ErrorProvider, InMemoryProvider};
use crate::watcher::WatcherRegistry;
use config_abstractions::{ChangeNotifier, ChangeReceiver, Provider, SharedProvider};
use configstore_common::{ConfigError, ConfigResult, ItemList};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 文件轮询刷新的默认间隔
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// 环境变量提供者的注册名称
pub const ENV_PROVIDER_NAME: &str = "environ";

static DEFAULT_STORE: Lazy<Store> = Lazy::new(Store::new);

#[derive(Default)]
struct ProviderRegistry {
    providers: HashMap<String, SharedProvider>,
    allow_override: bool,
}

/// 配置存储
///
/// 进程内可以存在任意多个实例；[`Store::global`] 返回预先构造的默认实例，
/// 测试可以自行构造实例以避免共享状态。
pub struct Store {
    /// 提供者注册表
    providers: Mutex<ProviderRegistry>,
    /// 变更订阅者
    watchers: Arc<WatcherRegistry>,
    /// 刷新任务的根取消令牌
    refresh_token: Mutex<CancellationToken>,
    /// 文件轮询刷新间隔
    refresh_interval: Duration,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.providers.lock();
        let mut names: Vec<&String> = registry.providers.keys().collect();
        names.sort();
        f.debug_struct("Store")
            .field("providers", &names)
            .field("allow_override", &registry.allow_override)
            .field("watchers_count", &self.watchers.len())
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

impl Store {
    /// 创建新的配置存储
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(ProviderRegistry::default()),
            watchers: Arc::new(WatcherRegistry::new()),
            refresh_token: Mutex::new(CancellationToken::new()),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// 设置文件轮询刷新间隔
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// 获取进程级默认配置存储
    pub fn global() -> &'static Self {
        &DEFAULT_STORE
    }

    /// 文件轮询刷新间隔
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// 清空提供者并关闭覆盖模式
    ///
    /// 订阅者保持不变；被丢弃的提供者对应的刷新任务会一并停止。
    pub fn clear(&self) -> &Self {
        {
            let mut registry = self.providers.lock();
            registry.providers.clear();
            registry.allow_override = false;
        }
        self.stop_refreshing();
        debug!("配置存储已清空");
        self
    }

    /// 注册配置提供者
    ///
    /// 名称已存在且未开启覆盖模式时返回 [`ConfigError::ProviderConflict`]，
    /// 这属于接线错误，调用方应在启动阶段视为致命错误。
    pub fn register_provider<P>(&self, name: impl Into<String>, provider: P) -> ConfigResult<()>
    where
        P: Provider + 'static,
    {
        self.register_shared(name, Arc::new(provider))
    }

    /// 注册共享的配置提供者
    pub fn register_shared(&self, name: impl Into<String>, provider: SharedProvider) -> ConfigResult<()> {
        let name = name.into();
        let mut registry = self.providers.lock();
        if registry.providers.contains_key(&name) && !registry.allow_override {
            return Err(ConfigError::ProviderConflict { name });
        }
        debug!("注册配置提供者: {}", name);
        registry.providers.insert(name, provider);
        Ok(())
    }

    /// 允许同名提供者重复注册，后注册者替换先注册者
    ///
    /// 仅适用于受控的测试场景，在 [`Store::clear`] 之前不可撤销。
    pub fn allow_provider_override(&self) {
        warn!("ATTENTION: PROVIDER OVERRIDE ALLOWED/ENABLED");
        self.providers.lock().allow_override = true;
    }

    /// 是否允许提供者覆盖
    pub fn is_provider_override_allowed(&self) -> bool {
        self.providers.lock().allow_override
    }

    /// 注册一个每次查询都返回 `error` 的提供者
    pub fn error_provider(&self, name: impl Into<String>, error: ConfigError) -> ConfigResult<()> {
        let name = name.into();
        debug!("注册错误提供者: {} ({})", name, error);
        self.register_provider(name, ErrorProvider::new(error))
    }

    /// 注册并返回一个空的内存提供者
    pub fn in_memory(&self, name: impl Into<String>) -> ConfigResult<Arc<InMemoryProvider>> {
        let provider = Arc::new(InMemoryProvider::new());
        self.register_shared(name, provider.clone())?;
        Ok(provider)
    }

    /// 以 [`ENV_PROVIDER_NAME`] 注册环境变量提供者并返回共享句柄
    ///
    /// 注册后仍可通过 [`EnvVariableProvider::bind_env`] 追加绑定。
    pub fn env_variable(&self, provider: EnvVariableProvider) -> ConfigResult<Arc<EnvVariableProvider>> {
        let provider = Arc::new(provider);
        self.register_shared(ENV_PROVIDER_NAME, provider.clone())?;
        Ok(provider)
    }

    /// 按名称获取提供者
    pub fn provider(&self, name: &str) -> Option<SharedProvider> {
        self.providers.lock().providers.get(name).cloned()
    }

    /// 已注册的提供者名称，按字典序排列
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.lock().providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// 已注册的提供者数量
    pub fn provider_count(&self) -> usize {
        self.providers.lock().providers.len()
    }

    /// 调用每个提供者，按名称返回各自的结果
    ///
    /// 提供者在锁外调用。
    pub fn items_by_provider(&self) -> BTreeMap<String, ConfigResult<ItemList>> {
        let snapshot: Vec<(String, SharedProvider)> = self
            .providers
            .lock()
            .providers
            .iter()
            .map(|(name, provider)| (name.clone(), provider.clone()))
            .collect();

        snapshot
            .into_iter()
            .map(|(name, provider)| {
                let result = provider.items();
                (name, result)
            })
            .collect()
    }

    /// 按提供者名称顺序拼接所有配置项，遇到第一个失败的提供者即返回其错误
    ///
    /// 不做任何优先级合并，胜出规则由上层决定。
    pub fn items(&self) -> ConfigResult<ItemList> {
        let mut items = Vec::new();
        for (name, result) in self.items_by_provider() {
            match result {
                Ok(list) => items.extend(list),
                Err(e) => {
                    debug!("配置提供者 {} 查询失败: {}", name, e);
                    return Err(e);
                }
            }
        }
        Ok(ItemList::new(items))
    }

    /// 订阅配置变更
    ///
    /// 每次有提供者通知变更时，返回的接收端都会被唤醒；未及时消费的信号会合并。
    pub fn watch(&self) -> ChangeReceiver {
        self.watchers.subscribe()
    }

    /// 通知所有订阅者
    pub fn notify_watchers(&self) {
        self.watchers.notify_watchers();
    }

    /// 停止本存储启动的所有文件刷新任务
    pub fn stop_refreshing(&self) {
        let mut token = self.refresh_token.lock();
        if !token.is_cancelled() {
            token.cancel();
            debug!("已停止所有配置文件刷新任务");
        }
        *token = CancellationToken::new();
    }

    /// 为新的刷新任务派生取消令牌
    pub(crate) fn refresh_child_token(&self) -> CancellationToken {
        self.refresh_token.lock().child_token()
    }

    /// 刷新任务使用的变更通知器
    pub(crate) fn notifier(&self) -> Arc<dyn ChangeNotifier> {
        self.watchers.clone()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for Store {
    fn notify_watchers(&self) {
        self.watchers.notify_watchers();
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.refresh_token.get_mut().cancel();
    }
}
