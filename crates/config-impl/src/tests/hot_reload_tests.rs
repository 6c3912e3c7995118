//! 配置文件轮询刷新测试

use super::super::*;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tokio::sync::mpsc::error::TryRecvError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 辅助函数：重写文件并把修改时间推到未来，保证刷新器能观察到变化
fn rewrite(path: &Path, content: &str, ahead: Duration) {
    fs::write(path, content).unwrap();
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + ahead).unwrap();
}

fn item_values(store: &Store, name: &str) -> Vec<String> {
    store
        .provider(name)
        .unwrap()
        .items()
        .unwrap()
        .iter()
        .map(|item| item.value().to_string())
        .collect()
}

/// 测试文件更新后提供者返回新内容并唤醒所有订阅者
#[tokio::test]
async fn test_refresh_picks_up_rewritten_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.yaml");
    fs::write(&path, "- key: mode\n  value: blue\n").unwrap();
    let filename = path.to_string_lossy().into_owned();
    let provider_name = format!("file:{filename}");

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let mut first = store.watch();
    let mut second = store.watch();
    let handle = store.file_refresh(&filename).unwrap().expect("应启动刷新任务");
    assert_eq!(item_values(&store, &provider_name), vec!["blue"]);

    rewrite(&path, "- key: mode\n  value: green\n", Duration::from_secs(5));

    tokio::time::timeout(Duration::from_secs(5), first.recv())
        .await
        .expect("刷新后应收到通知")
        .expect("通道不应关闭");
    tokio::time::timeout(Duration::from_secs(5), second.recv())
        .await
        .expect("每个订阅者都应收到通知")
        .expect("通道不应关闭");
    assert_eq!(item_values(&store, &provider_name), vec!["green"]);

    handle.stop();
    handle.join().await;
}

/// 测试刷新期间的解码失败被忽略，保留上一次成功加载的配置，并在后续周期重试
#[tokio::test]
async fn test_refresh_keeps_last_good_items_on_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.yaml");
    fs::write(&path, "- key: mode\n  value: blue\n").unwrap();
    let filename = path.to_string_lossy().into_owned();
    let provider_name = format!("file:{filename}");

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let mut receiver = store.watch();
    let handle = store.file_refresh(&filename).unwrap().unwrap();

    rewrite(&path, "key: [unterminated", Duration::from_secs(5));
    tokio::time::sleep(POLL_INTERVAL * 10).await;

    assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(item_values(&store, &provider_name), vec!["blue"]);
    assert!(!handle.is_stopped(), "解码失败不应终止刷新任务");

    rewrite(&path, "- key: mode\n  value: red\n", Duration::from_secs(10));
    tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("修复文件后应收到通知");
    assert_eq!(item_values(&store, &provider_name), vec!["red"]);

    handle.stop();
    handle.join().await;
}

/// 测试修改时间未前进时不重新加载
#[tokio::test]
async fn test_refresh_ignores_unchanged_mtime() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.yaml");
    fs::write(&path, "- key: mode\n  value: blue\n").unwrap();
    let filename = path.to_string_lossy().into_owned();

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let mut receiver = store.watch();
    let handle = store.file_refresh(&filename).unwrap().unwrap();

    // 内容变化但修改时间回拨到加载之前
    fs::write(&path, "- key: mode\n  value: green\n").unwrap();
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(3600)).unwrap();

    tokio::time::sleep(POLL_INTERVAL * 10).await;
    assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(item_values(&store, &format!("file:{filename}")), vec!["blue"]);

    handle.stop();
    handle.join().await;
}

/// 测试停止刷新任务后不再响应文件变化
#[tokio::test]
async fn test_stopped_refresher_ignores_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.yaml");
    fs::write(&path, "- key: mode\n  value: blue\n").unwrap();
    let filename = path.to_string_lossy().into_owned();

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let mut receiver = store.watch();
    let handle = store.file_refresh(&filename).unwrap().unwrap();
    assert_eq!(handle.path(), path.as_path());

    handle.stop();
    assert!(handle.is_stopped());
    handle.join().await;

    rewrite(&path, "- key: mode\n  value: green\n", Duration::from_secs(5));
    tokio::time::sleep(POLL_INTERVAL * 10).await;

    assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(item_values(&store, &format!("file:{filename}")), vec!["blue"]);
}

/// 测试清空存储会停止其下所有刷新任务
#[tokio::test]
async fn test_clear_stops_refreshers() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.yaml");
    let second = dir.path().join("b.yaml");
    fs::write(&first, "- key: a\n  value: \"1\"\n").unwrap();
    fs::write(&second, "- key: b\n  value: \"2\"\n").unwrap();

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let first = store.file_refresh(&first.to_string_lossy()).unwrap().unwrap();
    let second = store.file_refresh(&second.to_string_lossy()).unwrap().unwrap();

    store.clear();

    assert!(first.is_stopped());
    assert!(second.is_stopped());
    first.join().await;
    second.join().await;

    // 清空后新启动的刷新任务不受影响
    let third = dir.path().join("c.yaml");
    fs::write(&third, "- key: c\n  value: \"3\"\n").unwrap();
    let third = store.file_refresh(&third.to_string_lossy()).unwrap().unwrap();
    assert!(!third.is_stopped());
    third.stop();
    third.join().await;
}

/// 测试初始加载失败时只注册错误提供者，不启动刷新任务
#[tokio::test]
async fn test_refresh_with_missing_file_registers_error_provider() {
    let dir = TempDir::new().unwrap();
    let filename = dir.path().join("missing.yaml").to_string_lossy().into_owned();

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let handle = store.file_refresh(&filename).unwrap();

    assert!(handle.is_none());
    assert!(store.provider(&format!("file:{filename}")).unwrap().items().is_err());
}

/// 测试自定义解码器同样用于刷新
#[tokio::test]
async fn test_custom_refresh_uses_decoder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("motd.txt");
    fs::write(&path, "hello").unwrap();
    let filename = path.to_string_lossy().into_owned();

    let decoder = |bytes: &[u8]| -> ConfigResult<Vec<Item>> {
        Ok(vec![Item::new("motd", String::from_utf8_lossy(bytes).trim(), 1)])
    };

    let store = Store::new().with_refresh_interval(POLL_INTERVAL);
    let mut receiver = store.watch();
    let handle = store.file_custom_refresh(&filename, decoder).unwrap().unwrap();
    assert_eq!(item_values(&store, &format!("file:{filename}")), vec!["hello"]);

    rewrite(&path, "goodbye\n", Duration::from_secs(5));
    tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("刷新后应收到通知");
    assert_eq!(item_values(&store, &format!("file:{filename}")), vec!["goodbye"]);

    handle.stop();
    handle.join().await;
}
