//! # Configstore Common
//!
//! 配置存储各层共享的数据模型与错误类型。
//!
//! ## 核心类型
//!
//! - [`Item`] - 键 / 值 / 优先级三元组，配置数据的基本单位
//! - [`ItemList`] - 单次提供者调用返回的有序配置项列表
//! - [`ConfigError`] - 配置存储的统一错误类型

pub mod errors;
pub mod item;

pub use errors::*;
pub use item::*;
