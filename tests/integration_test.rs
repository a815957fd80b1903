use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use snapshot_submit::error::{CaptureError, RemoteError};
use snapshot_submit::services::{OutputRequest, RemoteOutput, SnapshotCapture, TerminalView};
use snapshot_submit::{logger, App, BatchStats, Config, ItemStatus, NamingConfig};
use tokio_test::assert_ok;

/// 把源代码原样回显的远程服务
struct EchoRemote {
    calls: AtomicUsize,
}

#[async_trait]
impl RemoteOutput for EchoRemote {
    async fn generate(&self, request: &OutputRequest) -> Result<String, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("$ run\n{}", request.source))
    }
}

/// 对 `broken.*` 截图失败，其他返回 PNG 文件头
struct PickySnapshot;

#[async_trait]
impl SnapshotCapture for PickySnapshot {
    async fn capture(&self, view: &TerminalView) -> Result<Vec<u8>, CaptureError> {
        if view.title.starts_with("broken.") {
            Err(CaptureError::EmptyImage)
        } else {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }
}

fn test_config(dir: &std::path::Path) -> Config {
    let input = dir.join("input");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("main.py"), "print('hi')").unwrap();
    std::fs::write(input.join("Hello.java"), "class Hello {}").unwrap();
    std::fs::write(input.join("broken.c"), "int main() {}").unwrap();

    Config {
        input_folder: input.to_string_lossy().to_string(),
        output_archive: dir.join("out.zip").to_string_lossy().to_string(),
        output_log_file: dir.join("log.txt").to_string_lossy().to_string(),
        settle_delay_ms: 5,
        pacing_delay_ms: 5,
        ..Config::default()
    }
}

fn app(config: Config, remote: Arc<EchoRemote>) -> App {
    App::with_services(config, NamingConfig::default(), remote, Arc::new(PickySnapshot))
}

fn read_tree(path: &str) -> BTreeMap<String, Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut tree: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for i in 0..archive.len() {
        let name = archive.by_index(i).unwrap().name().to_string();
        let (folder, rest) = name.split_once('/').unwrap();
        let files = tree.entry(folder.to_string()).or_default();
        if !rest.is_empty() {
            files.push(rest.to_string());
        }
    }
    tree
}

#[tokio::test]
async fn test_full_run_produces_archive() {
    logger::init();

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let archive_path = config.output_archive.clone();
    let remote = Arc::new(EchoRemote {
        calls: AtomicUsize::new(0),
    });
    let app = app(config, remote.clone());

    let stats = assert_ok!(app.run().await);
    assert_eq!(
        stats,
        BatchStats {
            completed: 2,
            failed: 1,
            skipped: 0
        }
    );
    assert_eq!(remote.calls.load(Ordering::SeqCst), 3);

    // 文件按名字排序入队：Hello.java, broken.c, main.py
    let tree = read_tree(&archive_path);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree["1_Hello"], vec!["Hello.java", "Hello_output.png"]);
    assert_eq!(tree["2_broken"], vec!["broken.c"]);
    assert_eq!(tree["3_main"], vec!["main.py", "main_output.png"]);

    let batch = app.store().snapshot();
    let broken = batch.items.iter().find(|i| i.name == "broken.c").unwrap();
    assert_eq!(broken.status, ItemStatus::Error);
    assert_eq!(broken.output.as_deref(), Some("$ run\nint main() {}"));
}

#[tokio::test]
async fn test_reset_after_package_clears_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        reset_after_package: true,
        ..test_config(dir.path())
    };
    let archive_path = config.output_archive.clone();
    let app = app(
        config,
        Arc::new(EchoRemote {
            calls: AtomicUsize::new(0),
        }),
    );

    assert_ok!(app.run().await);
    assert!(app.store().is_empty());
    assert_eq!(read_tree(&archive_path).len(), 3);
}

#[tokio::test]
async fn test_package_failure_leaves_batch_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        // 目标路径是一个目录，写入必然失败
        output_archive: dir.path().to_string_lossy().to_string(),
        reset_after_package: true,
        ..test_config(dir.path())
    };
    let app = app(
        config,
        Arc::new(EchoRemote {
            calls: AtomicUsize::new(0),
        }),
    );

    assert!(app.run().await.is_err());
    assert_eq!(app.store().len(), 3);
}

#[tokio::test]
async fn test_empty_input_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        input_folder: dir.path().to_string_lossy().to_string(),
        output_log_file: dir.path().join("log.txt").to_string_lossy().to_string(),
        ..Config::default()
    };
    let remote = Arc::new(EchoRemote {
        calls: AtomicUsize::new(0),
    });
    let app = app(config, remote.clone());

    let stats = assert_ok!(app.run().await);
    assert_eq!(stats, BatchStats::default());
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[ignore] // 默认忽略，需要浏览器和 LLM 配置：cargo test -- --ignored
async fn test_live_run() {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    let app = App::initialize(config).await.expect("初始化失败");
    let stats = app.run().await.expect("处理失败");
    println!("处理结果: {:?}", stats);
}
