//! 配置内容解码抽象接口

use configstore_common::{ConfigResult, Item};
use std::sync::Arc;

/// 配置解码器 trait
///
/// 将文件的原始字节解码为配置项。文件加载器在未指定自定义解码器时
/// 使用默认的结构化解码器。
pub trait ItemDecoder: Send + Sync {
    /// 解码配置内容
    fn decode(&self, bytes: &[u8]) -> ConfigResult<Vec<Item>>;
}

impl<F> ItemDecoder for F
where
    F: Fn(&[u8]) -> ConfigResult<Vec<Item>> + Send + Sync,
{
    fn decode(&self, bytes: &[u8]) -> ConfigResult<Vec<Item>> {
        self(bytes)
    }
}

/// 共享的解码器句柄
pub type SharedDecoder = Arc<dyn ItemDecoder>;
