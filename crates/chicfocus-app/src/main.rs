//! # chicfocus-app
//!
//! ChicFocus 실행 파일 진입점.
//! 설정 로드, tracing 초기화, 서버/클라이언트 서브커맨드 실행.

mod client_runner;
mod commands;
mod lifecycle;
mod server_runner;
mod terminal_view;

use anyhow::{Context, Result};
use chicfocus_core::config::AppConfig;
use chicfocus_core::config_manager::ConfigManager;
use chicfocus_core::models::identity::Identity;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ChicFocus: 두 사람이 겨루는 집중 타이머
#[derive(Parser, Debug)]
#[command(name = "chicfocus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// 서버 실행 (WebSocket + 마켓 API)
    Serve {
        /// 포트 (사용 중이면 다음 포트 시도)
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// 데이터 저장 경로
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// 외부 접속 허용 (0.0.0.0 바인드)
        #[arg(long)]
        allow_external: bool,
    },
    /// 터미널 클라이언트 실행
    Client {
        /// 참가자 (luu, 4keni)
        #[arg(long, short = 'u')]
        user: Option<Identity>,

        /// 서버 URL (예: http://127.0.0.1:5000)
        #[arg(long, short = 's')]
        server: Option<String>,
    },
}

/// 설정 로드. 실패하면 기본 설정으로 계속한다.
fn load_config(path: Option<PathBuf>) -> AppConfig {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    match manager {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            manager.get()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본값 사용: {e}");
            AppConfig::default_config()
        }
    }
}

/// 데이터 디렉토리 결정 (CLI 인자 > 설정 > 플랫폼 기본 경로 > `./data`)
fn resolve_data_dir(cli: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    cli.or_else(|| config.web.data_dir.clone())
        .or_else(|| ConfigManager::data_dir().ok())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "chicfocus={0},chicfocus_app={0},chicfocus_core={0},chicfocus_network={0},chicfocus_storage={0},chicfocus_ui={0},chicfocus_web={0},tower_http={0}",
        args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let mut config = load_config(args.config);

    match args.command {
        Mode::Serve {
            port,
            data_dir,
            allow_external,
        } => {
            if let Some(port) = port {
                config.web.port = port;
            }
            if allow_external {
                config.web.allow_external = true;
            }
            let data_dir = resolve_data_dir(data_dir, &config);
            server_runner::run_server(&config, &data_dir)
                .await
                .context("서버 종료")?;
        }
        Mode::Client { user, server } => {
            if let Some(server) = server {
                config.server.base_url = server.trim_end_matches('/').to_string();
            }
            client_runner::run_client(&config, user).await?;
        }
    }

    Ok(())
}
