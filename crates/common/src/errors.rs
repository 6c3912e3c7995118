//! 错误类型定义

use std::sync::Arc;
use thiserror::Error;

/// 配置错误类型
///
/// 错误提供者在每次查询时都要返回同一个错误，因此该类型实现了 `Clone`，
/// I/O 错误以 `Arc` 持有。
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// 提供者名称冲突（接线错误）
    #[error("配置提供者名称冲突: {name}")]
    ProviderConflict { name: String },

    /// 提供者工厂名称冲突（接线错误）
    #[error("配置提供者工厂名称冲突: {name}")]
    FactoryConflict { name: String },

    /// 指令引用了未注册的工厂
    #[error("配置提供者工厂实例化失败: {name}")]
    FactoryNotFound { name: String },

    #[error("配置文件读取失败: {path}: {source}")]
    FileReadError {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("配置解析失败: {path}: {message}")]
    ParseError { path: String, message: String },

    /// 目录树超过一层嵌套
    #[error("子目录 {subdir}: 遇到嵌套目录 {nested}，最多支持一层嵌套")]
    NestedDirectory { subdir: String, nested: String },

    /// 解码函数返回的错误
    #[error("配置内容解码失败: {message}")]
    DecodeError { message: String },

    #[error("配置热重载失败: {message}")]
    HotReloadError { message: String },
}

impl ConfigError {
    /// 创建文件读取错误
    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileReadError {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// 创建解码错误
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    /// 创建解析错误
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 是否为接线错误
    ///
    /// 接线错误说明程序装配有误，嵌入方应在启动阶段将其视为致命错误，而不是重试。
    pub fn is_wiring_error(&self) -> bool {
        matches!(
            self,
            Self::ProviderConflict { .. } | Self::FactoryConflict { .. } | Self::HotReloadError { .. }
        )
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
