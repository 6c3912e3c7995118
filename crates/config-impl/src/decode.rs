//! 内置配置解码器
//!
//! 文件内容为配置项列表，每项包含 `key`、`value` 以及可选的 `priority`：
//!
//! ```yaml
//! - key: db.host
//!   value: localhost
//!   priority: 10
//! - key: db.port
//!   value: "5432"
//! ```

use config_abstractions::{ItemDecoder, SharedDecoder};
use configstore_common::{ConfigError, ConfigResult, Item};
use std::sync::Arc;

/// YAML 配置解码器
///
/// 默认解码器。YAML 是 JSON 的超集，两种格式的文件都能解码。
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlItemDecoder;

impl ItemDecoder for YamlItemDecoder {
    fn decode(&self, bytes: &[u8]) -> ConfigResult<Vec<Item>> {
        if is_blank(bytes) {
            return Ok(Vec::new());
        }
        let items: Vec<Item> =
            serde_yaml::from_slice(bytes).map_err(|e| ConfigError::decode(e.to_string()))?;
        validate_items(items)
    }
}

/// JSON 配置解码器
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonItemDecoder;

impl ItemDecoder for JsonItemDecoder {
    fn decode(&self, bytes: &[u8]) -> ConfigResult<Vec<Item>> {
        if is_blank(bytes) {
            return Ok(Vec::new());
        }
        let items: Vec<Item> =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::decode(e.to_string()))?;
        validate_items(items)
    }
}

/// 文件加载器在未指定解码器时使用的默认解码器
pub fn default_decoder() -> SharedDecoder {
    Arc::new(YamlItemDecoder)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn validate_items(items: Vec<Item>) -> ConfigResult<Vec<Item>> {
    if let Some(index) = items.iter().position(|item| item.key().is_empty()) {
        return Err(ConfigError::decode(format!("第 {} 个配置项的键为空", index + 1)));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_decoder_reads_yaml_and_json() {
        let yaml = b"- key: db.host\n  value: localhost\n  priority: 10\n- key: db.port\n  value: \"5432\"\n";
        let items = YamlItemDecoder.decode(yaml).unwrap();
        assert_eq!(items, vec![Item::new("db.host", "localhost", 10), Item::new("db.port", "5432", 0)]);

        let json = br#"[{"key":"db.host","value":"localhost","priority":3}]"#;
        let items = YamlItemDecoder.decode(json).unwrap();
        assert_eq!(items, vec![Item::new("db.host", "localhost", 3)]);
    }

    #[test]
    fn test_blank_content_decodes_to_no_items() {
        assert!(YamlItemDecoder.decode(b"").unwrap().is_empty());
        assert!(JsonItemDecoder.decode(b" \n").unwrap().is_empty());
    }

    #[test]
    fn test_decoders_reject_invalid_content() {
        assert!(matches!(
            YamlItemDecoder.decode(b"key: not-a-list"),
            Err(ConfigError::DecodeError { .. })
        ));
        assert!(matches!(
            JsonItemDecoder.decode(b"- key: a\n  value: b\n"),
            Err(ConfigError::DecodeError { .. })
        ));
        assert!(matches!(
            JsonItemDecoder.decode(br#"[{"key":"","value":"x"}]"#),
            Err(ConfigError::DecodeError { .. })
        ));
    }
}
