//! 文件系统配置加载器
//!
//! - `file`：单个结构化配置文件，可选轮询刷新
//! - `file_list`：目录下每个文件各自注册为独立的 `file` 提供者
//! - `file_tree`：目录树展开为配置项，文件内容即值，文件名大小写决定优先级

use crate::decode::default_decoder;
use crate::refresh::{FileRefresher, RefreshHandle};
use crate::store::Store;
use config_abstractions::{ItemDecoder, SharedDecoder};
use configstore_common::{ConfigError, ConfigResult, Item};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// 文件名首字母大写时的优先级
pub const TREE_PRIORITY_UPPER: i64 = 10;

/// 文件名首字母非大写时的优先级
pub const TREE_PRIORITY_DEFAULT: i64 = 5;

impl Store {
    /// 注册从文件读取的静态配置提供者，名称为 `file:<filename>`
    ///
    /// 文件名为空时不做任何事。读取或解码失败时注册同名的错误提供者，
    /// 错误在查询时才暴露。
    pub fn file(&self, filename: &str) -> ConfigResult<()> {
        self.load_file(filename, false, None).map(|_| ())
    }

    /// 注册从文件读取的配置提供者，并按刷新间隔轮询文件修改时间
    ///
    /// 需要在 tokio 运行时中调用。初始加载失败时只注册错误提供者，不启动轮询，返回 `None`。
    pub fn file_refresh(&self, filename: &str) -> ConfigResult<Option<RefreshHandle>> {
        self.load_file(filename, true, None)
    }

    /// 使用自定义解码器注册静态文件配置提供者
    pub fn file_custom<D>(&self, filename: &str, decoder: D) -> ConfigResult<()>
    where
        D: ItemDecoder + 'static,
    {
        let decoder: SharedDecoder = Arc::new(decoder);
        self.load_file(filename, false, Some(decoder)).map(|_| ())
    }

    /// 使用自定义解码器注册可刷新的文件配置提供者
    pub fn file_custom_refresh<D>(&self, filename: &str, decoder: D) -> ConfigResult<Option<RefreshHandle>>
    where
        D: ItemDecoder + 'static,
    {
        let decoder: SharedDecoder = Arc::new(decoder);
        self.load_file(filename, true, Some(decoder))
    }

    fn load_file(
        &self,
        filename: &str,
        refresh: bool,
        decoder: Option<SharedDecoder>,
    ) -> ConfigResult<Option<RefreshHandle>> {
        if filename.is_empty() {
            return Ok(None);
        }

        // 先确认运行时可用，避免注册完成后才发现无法启动刷新任务
        let runtime = if refresh {
            let handle = tokio::runtime::Handle::try_current().map_err(|e| ConfigError::HotReloadError {
                message: format!("刷新配置文件 {filename} 需要 tokio 运行时: {e}"),
            })?;
            Some(handle)
        } else {
            None
        };

        let provider_name = format!("file:{filename}");
        let decoder = decoder.unwrap_or_else(default_decoder);
        let path = PathBuf::from(filename);

        let loaded_at = SystemTime::now();
        let items = match read_items(&path, decoder.as_ref()) {
            Ok(items) => items,
            Err(e) => {
                debug!("加载配置文件失败: {} - {}", filename, e);
                self.error_provider(provider_name, e)?;
                return Ok(None);
            }
        };

        // 先派生令牌再注册提供者：并发的 clear 取消令牌，或者发生在注册之后
        let token = runtime.as_ref().map(|_| self.refresh_child_token());
        let target = self.in_memory(provider_name)?;
        info!("从文件加载配置: {}", filename);
        target.add(items);

        let (Some(runtime), Some(token)) = (runtime, token) else {
            return Ok(None);
        };
        let refresher = FileRefresher {
            path,
            decoder,
            target,
            notifier: self.notifier(),
            interval: self.refresh_interval(),
            last_loaded: loaded_at,
            token,
        };
        Ok(Some(refresher.spawn(&runtime)))
    }

    /// 为目录下的每个条目注册一个 `file` 提供者
    ///
    /// 不区分文件与子目录；子目录会因读取失败而成为错误提供者。
    /// 目录本身无法列出时注册名为 `filelist:<dirname>` 的错误提供者。
    pub fn file_list(&self, dirname: &str) -> ConfigResult<()> {
        if dirname.is_empty() {
            return Ok(());
        }

        let entries = match sorted_entries(Path::new(dirname)) {
            Ok(entries) => entries,
            Err(e) => return self.error_provider(format!("filelist:{dirname}"), e),
        };

        for entry in entries {
            self.file(&entry.path.to_string_lossy())?;
        }
        Ok(())
    }

    /// 将目录树展开为配置项，注册为 `filetree:<dirname>`
    ///
    /// 顶层文件以文件名作为键；一级子目录中的每个文件都以子目录名作为键，
    /// 因此同一子目录下的文件竞争同一个键。文件名首字母大写的配置项优先级为
    /// [`TREE_PRIORITY_UPPER`]，否则为 [`TREE_PRIORITY_DEFAULT`]。
    /// 出现第二层目录时整个加载失败，注册为错误提供者。
    pub fn file_tree(&self, dirname: &str) -> ConfigResult<()> {
        if dirname.is_empty() {
            return Ok(());
        }

        let provider_name = format!("filetree:{dirname}");
        match read_tree(Path::new(dirname)) {
            Ok(items) => {
                let target = self.in_memory(provider_name)?;
                info!("从目录树加载配置: {}, 配置项数量: {}", dirname, items.len());
                target.add(items);
                Ok(())
            }
            Err(e) => {
                debug!("加载配置目录树失败: {} - {}", dirname, e);
                self.error_provider(provider_name, e)
            }
        }
    }
}

/// 读取并解码配置文件
fn read_items(path: &Path, decoder: &dyn ItemDecoder) -> ConfigResult<Vec<Item>> {
    let bytes = std::fs::read(path).map_err(|e| ConfigError::file_read(path.display().to_string(), e))?;
    decoder.decode(&bytes)
}

struct TreeEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

/// 按文件名排序列出目录条目
fn sorted_entries(dir: &Path) -> ConfigResult<Vec<TreeEntry>> {
    let read_error = |e: std::io::Error| ConfigError::file_read(dir.display().to_string(), e);

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let file_type = entry.file_type().map_err(read_error)?;
        entries.push(TreeEntry {
            path: entry.path(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn read_tree(dir: &Path) -> ConfigResult<Vec<Item>> {
    let mut items = Vec::new();
    for entry in sorted_entries(dir)? {
        if entry.is_dir {
            read_subdir(&entry, &mut items)?;
        } else {
            items.push(read_tree_item(&entry.path, &entry.name, &entry.name)?);
        }
    }
    Ok(items)
}

fn read_subdir(subdir: &TreeEntry, items: &mut Vec<Item>) -> ConfigResult<()> {
    for entry in sorted_entries(&subdir.path)? {
        if entry.is_dir {
            return Err(ConfigError::NestedDirectory {
                subdir: subdir.name.clone(),
                nested: entry.name,
            });
        }
        items.push(read_tree_item(&entry.path, &entry.name, &subdir.name)?);
    }
    Ok(())
}

fn read_tree_item(path: &Path, basename: &str, item_key: &str) -> ConfigResult<Item> {
    let content = std::fs::read(path).map_err(|e| ConfigError::file_read(path.display().to_string(), e))?;
    let content = match String::from_utf8(content) {
        Ok(content) => content,
        Err(e) => {
            warn!("配置文件内容不是有效的 UTF-8，按有损方式转换: {}", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(Item::new(item_key, content, tree_priority(basename)))
}

/// 文件名首字母大写即为高优先级
fn tree_priority(basename: &str) -> i64 {
    if basename.chars().next().is_some_and(char::is_uppercase) {
        TREE_PRIORITY_UPPER
    } else {
        TREE_PRIORITY_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_priority_follows_capitalization() {
        assert_eq!(tree_priority("Primary"), TREE_PRIORITY_UPPER);
        assert_eq!(tree_priority("replica"), TREE_PRIORITY_DEFAULT);
        assert_eq!(tree_priority("Élan"), TREE_PRIORITY_UPPER);
        assert_eq!(tree_priority("1st"), TREE_PRIORITY_DEFAULT);
        assert_eq!(tree_priority(""), TREE_PRIORITY_DEFAULT);
    }
}
