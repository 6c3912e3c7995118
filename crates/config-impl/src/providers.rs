//! 内置配置提供者实现

use config_abstractions::Provider;
use configstore_common::{ConfigError, ConfigResult, Item, ItemList};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// 内存配置提供者
///
/// 加锁保护的配置项缓冲区，所有内置加载器都以它作为存储。
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    items: Mutex<Vec<Item>>,
}

impl InMemoryProvider {
    /// 创建新的内存配置提供者
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加配置项
    pub fn add(&self, items: impl IntoIterator<Item = Item>) -> &Self {
        self.items.lock().extend(items);
        self
    }

    /// 整体替换配置项
    pub fn replace(&self, items: Vec<Item>) {
        *self.items.lock() = items;
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Provider for InMemoryProvider {
    fn items(&self) -> ConfigResult<ItemList> {
        Ok(ItemList::new(self.items.lock().clone()))
    }
}

/// 错误提供者
///
/// 每次查询都返回构造时的错误，用于把构造期失败推迟到查询期暴露。
#[derive(Debug, Clone)]
pub struct ErrorProvider {
    error: ConfigError,
}

impl ErrorProvider {
    /// 创建新的错误提供者
    pub fn new(error: ConfigError) -> Self {
        Self { error }
    }

    /// 获取持有的错误
    pub fn error(&self) -> &ConfigError {
        &self.error
    }
}

impl Provider for ErrorProvider {
    fn items(&self) -> ConfigResult<ItemList> {
        Err(self.error.clone())
    }
}

/// 环境变量配置提供者
///
/// 维护环境变量名到配置键的绑定。每次查询都重新读取当前进程环境，
/// 未设置的绑定变量直接省略。
#[derive(Debug, Default)]
pub struct EnvVariableProvider {
    bindings: Mutex<HashMap<String, String>>,
    priority: i64,
}

impl EnvVariableProvider {
    /// 创建新的环境变量配置提供者
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置产出配置项的优先级
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// 按前缀自动绑定环境变量
    ///
    /// 在调用时扫描一次当前环境：对每个以 `prefix` 开头的变量，去掉前缀和一个前导 `_`，
    /// 把其余的 `_` 替换为 `key_separator` 并转为小写，作为配置键。
    #[must_use]
    pub fn with_automatic_binding(self, prefix: &str, key_separator: &str) -> Self {
        for (variable, _) in std::env::vars_os() {
            let Some(variable) = variable.to_str() else {
                continue;
            };
            if let Some(item_key) = env_key_to_item_key(variable, prefix, key_separator) {
                self.bind_env(variable, item_key);
            }
        }
        debug!("环境变量自动绑定完成，前缀: {}, 绑定数量: {}", prefix, self.bindings.lock().len());
        self
    }

    /// 绑定环境变量到配置键，已有绑定会被覆盖
    pub fn bind_env(&self, variable: impl Into<String>, item_key: impl Into<String>) {
        self.bindings.lock().insert(variable.into(), item_key.into());
    }

    /// 优先级
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// 当前绑定的快照
    pub fn bindings(&self) -> HashMap<String, String> {
        self.bindings.lock().clone()
    }
}

impl Provider for EnvVariableProvider {
    fn items(&self) -> ConfigResult<ItemList> {
        let bindings = self.bindings();
        let items = std::env::vars_os()
            .filter_map(|(variable, value)| {
                let key = bindings.get(variable.to_str()?)?;
                Some(Item::new(key.clone(), value.into_string().ok()?, self.priority))
            })
            .collect();
        Ok(items)
    }
}

/// 将环境变量名转换为配置键，不匹配前缀或转换结果为空时返回 `None`
fn env_key_to_item_key(variable: &str, prefix: &str, key_separator: &str) -> Option<String> {
    let rest = variable.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace('_', key_separator).to_lowercase())
}
