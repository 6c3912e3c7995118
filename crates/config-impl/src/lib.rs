//! # Configuration Implementation
//!
//! 配置存储的具体实现：提供者注册表、变更通知分发以及各类内置提供者。
//!
//! ## 主要组件
//!
//! - [`Store`] - 配置提供者注册表与变更通知中心
//! - [`InMemoryProvider`] - 加锁保护的内存配置项缓冲区
//! - [`EnvVariableProvider`] - 环境变量绑定提供者
//! - [`RefreshHandle`] - 文件轮询刷新任务句柄
//! - [`register_provider_factory`] - 声明式启动使用的提供者工厂注册
//!
//! ## 声明式启动
//!
//! 通过环境变量 `CONFIGURATION_FROM` 描述要注册的提供者：
//!
//! ```text
//! CONFIGURATION_FROM=file:/etc/app.yaml,filelist:/etc/app.d,filetree:/run/secrets
//! ```

pub mod decode;
pub mod factory;
pub mod file;
pub mod global;
pub mod providers;
pub mod refresh;
pub mod store;
pub mod watcher;

#[cfg(test)]
mod tests;

pub use decode::*;
pub use factory::*;
pub use file::*;
pub use providers::*;
pub use refresh::*;
pub use store::*;
pub use watcher::*;

pub use config_abstractions::{ChangeNotifier, ChangeReceiver, ItemDecoder, Provider, SharedDecoder, SharedProvider};
pub use configstore_common::{ConfigError, ConfigResult, Item, ItemList};
