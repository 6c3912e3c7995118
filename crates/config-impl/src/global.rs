//! 默认配置存储的便捷函数
//!
//! 每个函数都等价于在 [`Store::global`] 上调用同名方法。

use crate::providers::{EnvVariableProvider, InMemoryProvider};
use crate::refresh::RefreshHandle;
use crate::store::Store;
use config_abstractions::{ChangeReceiver, ItemDecoder, Provider};
use configstore_common::{ConfigError, ConfigResult, ItemList};
use std::sync::Arc;

/// 见 [`Store::register_provider`]
pub fn register_provider<P>(name: impl Into<String>, provider: P) -> ConfigResult<()>
where
    P: Provider + 'static,
{
    Store::global().register_provider(name, provider)
}

/// 见 [`Store::allow_provider_override`]
pub fn allow_provider_override() {
    Store::global().allow_provider_override();
}

/// 见 [`Store::error_provider`]
pub fn error_provider(name: impl Into<String>, error: ConfigError) -> ConfigResult<()> {
    Store::global().error_provider(name, error)
}

/// 见 [`Store::in_memory`]
pub fn in_memory(name: impl Into<String>) -> ConfigResult<Arc<InMemoryProvider>> {
    Store::global().in_memory(name)
}

/// 见 [`Store::env_variable`]
pub fn env_variable(provider: EnvVariableProvider) -> ConfigResult<Arc<EnvVariableProvider>> {
    Store::global().env_variable(provider)
}

/// 见 [`Store::file`]
pub fn file(filename: &str) -> ConfigResult<()> {
    Store::global().file(filename)
}

/// 见 [`Store::file_refresh`]
pub fn file_refresh(filename: &str) -> ConfigResult<Option<RefreshHandle>> {
    Store::global().file_refresh(filename)
}

/// 见 [`Store::file_custom`]
pub fn file_custom<D>(filename: &str, decoder: D) -> ConfigResult<()>
where
    D: ItemDecoder + 'static,
{
    Store::global().file_custom(filename, decoder)
}

/// 见 [`Store::file_custom_refresh`]
pub fn file_custom_refresh<D>(filename: &str, decoder: D) -> ConfigResult<Option<RefreshHandle>>
where
    D: ItemDecoder + 'static,
{
    Store::global().file_custom_refresh(filename, decoder)
}

/// 见 [`Store::file_list`]
pub fn file_list(dirname: &str) -> ConfigResult<()> {
    Store::global().file_list(dirname)
}

/// 见 [`Store::file_tree`]
pub fn file_tree(dirname: &str) -> ConfigResult<()> {
    Store::global().file_tree(dirname)
}

/// 见 [`Store::init_from_environment`]
pub fn init_from_environment() -> ConfigResult<()> {
    Store::global().init_from_environment()
}

/// 见 [`Store::items`]
pub fn items() -> ConfigResult<ItemList> {
    Store::global().items()
}

/// 见 [`Store::watch`]
pub fn watch() -> ChangeReceiver {
    Store::global().watch()
}

/// 见 [`Store::notify_watchers`]
pub fn notify_watchers() {
    Store::global().notify_watchers();
}
