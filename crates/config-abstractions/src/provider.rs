//! 配置提供者抽象接口

use configstore_common::{ConfigResult, ItemList};
use std::sync::Arc;

/// 配置提供者 trait
///
/// 从某一数据源（文件、环境变量、内存、HTTP 接口……）产出当前的配置项列表。
/// 存储不会串行化对提供者的调用，实现必须支持并发调用；
/// 内部状态由实现自行加锁保护。
pub trait Provider: Send + Sync {
    /// 产出当前的配置项列表
    fn items(&self) -> ConfigResult<ItemList>;
}

impl<F> Provider for F
where
    F: Fn() -> ConfigResult<ItemList> + Send + Sync,
{
    fn items(&self) -> ConfigResult<ItemList> {
        self()
    }
}

/// 共享的提供者句柄
pub type SharedProvider = Arc<dyn Provider>;
