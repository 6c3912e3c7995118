//! 提供者工厂与声明式启动
//!
//! 工厂注册表是进程级的，预置 `file`、`filelist`、`filetree` 三个内置工厂。
//! [`Store::init_from_environment`] 读取 `CONFIGURATION_FROM`，按指令顺序调用对应工厂。

use crate::store::Store;
use configstore_common::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 声明式启动读取的环境变量
pub const CONFIG_ENV_VAR: &str = "CONFIGURATION_FROM";

/// 提供者工厂
///
/// 以单个字符串参数向给定存储注册提供者。
pub type ProviderFactory = Arc<dyn Fn(&Store, &str) -> ConfigResult<()> + Send + Sync>;

static PROVIDER_FACTORIES: Lazy<Mutex<HashMap<String, ProviderFactory>>> =
    Lazy::new(|| Mutex::new(builtin_factories()));

fn builtin_factories() -> HashMap<String, ProviderFactory> {
    let builtins: [(&str, fn(&Store, &str) -> ConfigResult<()>); 3] = [
        ("file", Store::file),
        ("filelist", Store::file_list),
        ("filetree", Store::file_tree),
    ];
    builtins
        .into_iter()
        .map(|(name, factory)| (name.to_string(), Arc::new(factory) as ProviderFactory))
        .collect()
}

/// 注册提供者工厂
///
/// 名称已存在时返回 [`ConfigError::FactoryConflict`]，调用方应视为致命的接线错误。
pub fn register_provider_factory<F>(name: impl Into<String>, factory: F) -> ConfigResult<()>
where
    F: Fn(&Store, &str) -> ConfigResult<()> + Send + Sync + 'static,
{
    let name = name.into();
    let mut factories = PROVIDER_FACTORIES.lock();
    if factories.contains_key(&name) {
        return Err(ConfigError::FactoryConflict { name });
    }
    debug!("注册配置提供者工厂: {}", name);
    factories.insert(name, Arc::new(factory));
    Ok(())
}

/// 按名称获取提供者工厂
pub fn provider_factory(name: &str) -> Option<ProviderFactory> {
    PROVIDER_FACTORIES.lock().get(name).cloned()
}

/// 已注册的工厂名称，按字典序排列
pub fn provider_factory_names() -> Vec<String> {
    let mut names: Vec<String> = PROVIDER_FACTORIES.lock().keys().cloned().collect();
    names.sort();
    names
}

/// 单条提供者指令，形如 `factory[:argument]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDirective {
    /// 工厂名称
    pub factory: String,
    /// 工厂参数
    pub argument: String,
}

impl ProviderDirective {
    /// 解析单条指令
    ///
    /// 在第一个冒号处拆分，没有冒号时整条作为工厂名、参数为空；两部分都去除首尾空白。
    /// 空指令解析为空工厂名，启动时按未知工厂处理。
    pub fn parse(raw: &str) -> Self {
        let (factory, argument) = raw.split_once(':').unwrap_or((raw, ""));
        Self {
            factory: factory.trim().to_string(),
            argument: argument.trim().to_string(),
        }
    }

    /// 工厂不存在时错误提供者使用的名称
    pub fn provider_name(&self) -> String {
        format!("{}:{}", self.factory, self.argument)
    }
}

/// 解析以逗号分隔的指令列表，空字符串不产生任何指令
pub fn parse_directives(value: &str) -> Vec<ProviderDirective> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(ProviderDirective::parse).collect()
}

impl Store {
    /// 按环境变量 `CONFIGURATION_FROM` 注册提供者
    ///
    /// 变量未设置或为空字符串时不做任何事。示例：
    ///
    /// ```text
    /// CONFIGURATION_FROM=file:/etc/app.yaml,file:/etc/app2.yaml,filelist:/etc/app.d
    /// ```
    pub fn init_from_environment(&self) -> ConfigResult<()> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(value) if !value.is_empty() => self.init_from(&value),
            _ => Ok(()),
        }
    }

    /// 按给定的指令列表注册提供者
    ///
    /// 未知工厂不会中断启动，而是注册名为 `<factory>:<argument>` 的错误提供者。
    /// 工厂在注册表锁外调用，工厂内部可以继续注册其他工厂。
    pub fn init_from(&self, directives: &str) -> ConfigResult<()> {
        for directive in parse_directives(directives) {
            match provider_factory(&directive.factory) {
                Some(factory) => {
                    debug!("实例化配置提供者: {} ({})", directive.factory, directive.argument);
                    factory(self, &directive.argument)?;
                }
                None => {
                    warn!("未知的配置提供者工厂: {}", directive.factory);
                    self.error_provider(
                        directive.provider_name(),
                        ConfigError::FactoryNotFound {
                            name: directive.factory.clone(),
                        },
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives_splits_on_first_colon() {
        let directives = parse_directives(" file : /etc/a.yaml ,filelist:/etc/conf.d, filetree:C:\\cfg,bare");
        assert_eq!(
            directives,
            vec![
                ProviderDirective { factory: "file".into(), argument: "/etc/a.yaml".into() },
                ProviderDirective { factory: "filelist".into(), argument: "/etc/conf.d".into() },
                ProviderDirective { factory: "filetree".into(), argument: "C:\\cfg".into() },
                ProviderDirective { factory: "bare".into(), argument: String::new() },
            ]
        );
    }

    #[test]
    fn test_parse_directives_keeps_blank_entries() {
        assert!(parse_directives("").is_empty());

        let directives = parse_directives("file:/a, ");
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[1], ProviderDirective { factory: String::new(), argument: String::new() });
        assert_eq!(directives[1].provider_name(), ":");
    }

    #[test]
    fn test_builtin_factories_are_registered() {
        let names = provider_factory_names();
        for builtin in ["file", "filelist", "filetree"] {
            assert!(names.iter().any(|n| n == builtin), "缺少内置工厂 {builtin}");
        }
        assert!(matches!(
            register_provider_factory("file", |_: &Store, _: &str| Ok(())),
            Err(ConfigError::FactoryConflict { .. })
        ));
    }
}
