//! `serve` 서브커맨드: 저장소를 열고 서버와 마켓 시뮬레이터를 실행한다.

use anyhow::{Context, Result};
use chicfocus_core::config::AppConfig;
use chicfocus_storage::CycleStore;
use chicfocus_web::WebServer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::lifecycle::LifecycleManager;

/// 서버 실행 (종료 신호까지 블록)
pub async fn run_server(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let store = CycleStore::open_dir(data_dir)
        .with_context(|| format!("저장소 열기 실패: {}", data_dir.display()))?;
    info!("데이터 파일: {}", store.path().unwrap_or(data_dir).display());

    // 실제 주소는 바인드 후 serve가 기록한다 (포트 대체 포함)
    let server = WebServer::new(Arc::new(store), config);

    let lifecycle = Arc::new(LifecycleManager::new());
    let signal_lifecycle = lifecycle.clone();
    tokio::spawn(async move { signal_lifecycle.wait_for_signal().await });

    server
        .run(lifecycle.subscribe())
        .await
        .context("서버 실행 실패")?;
    Ok(())
}
