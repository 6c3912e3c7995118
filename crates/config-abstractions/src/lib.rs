//! # Configuration Abstractions
//!
//! 配置存储的抽象层，定义各类配置源必须满足的契约。
//!
//! ## 核心接口
//!
//! - [`Provider`] - 配置提供者接口，产出当前的配置项列表
//! - [`ItemDecoder`] - 将文件内容解码为配置项
//! - [`ChangeNotifier`] - 配置变更通知接口

pub mod decoder;
pub mod provider;
pub mod watcher;

pub use decoder::*;
pub use provider::*;
pub use watcher::*;
