//! `client` 서브커맨드: 실시간 어댑터를 터미널 화면에 연결하고 명령 루프를 돈다.

use anyhow::{Context, Result};
use chrono::Local;
use chicfocus_core::config::AppConfig;
use chicfocus_core::models::identity::Identity;
use chicfocus_core::ports::view::View;
use chicfocus_network::connection::RealtimeConnection;
use chicfocus_network::connectivity::ConnectivityManager;
use chicfocus_network::http_client::HttpMarketClient;
use chicfocus_ui::elements::MARKET_VIEW;
use chicfocus_ui::market::MarketPoller;
use chicfocus_ui::strings::END_CYCLE_CONFIRM;
use chicfocus_ui::view_controller::{MarketPollingHook, VisibilityHook};
use chicfocus_ui::{ClientSession, RealtimeUiAdapter, ViewController};
use parking_lot::Mutex;
use std::io::{BufRead, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::commands::{self, Command, HELP};
use crate::lifecycle::LifecycleManager;
use crate::terminal_view::TerminalView;

type Adapter = RealtimeUiAdapter<TerminalView<Stdout>>;

/// 클라이언트 실행 (quit 또는 종료 신호까지 블록)
pub async fn run_client(config: &AppConfig, user: Option<Identity>) -> Result<()> {
    let lifecycle = Arc::new(LifecycleManager::new());
    let signal_lifecycle = lifecycle.clone();
    tokio::spawn(async move { signal_lifecycle.wait_for_signal().await });

    let connection = RealtimeConnection::from_config(config);
    let connectivity = connection.connectivity();
    let mut status_rx = connectivity.subscribe();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow_and_update();
            info!("연결 상태: {status}");
        }
    });
    let view = Arc::new(Mutex::new(TerminalView::stdout()));
    let session = Arc::new(Mutex::new(ClientSession::new()));
    let adapter = Arc::new(RealtimeUiAdapter::with_shared(
        session.clone(),
        view.clone(),
        connection.transport(),
    ));

    let market_api = HttpMarketClient::new(&config.server.base_url, config.request_timeout())
        .context("마켓 API 클라이언트 생성 실패")?;
    let poller = MarketPoller::new(
        Arc::new(market_api),
        session,
        view.clone(),
        config.polling.feed_limit,
    )
    .with_popup_duration(config.market_popup_duration());
    let mut controller = ViewController::new();
    controller.register(
        MARKET_VIEW,
        Box::new(VisibilityHook::new(view.clone(), MARKET_VIEW)),
    );
    controller.register(MARKET_VIEW, Box::new(MarketPollingHook::new(poller, config)));
    view.lock().set_hidden(MARKET_VIEW, true);

    match user {
        Some(user) => adapter.select_user(user),
        None => view.lock().print("select a user: login <luu|4keni>"),
    }
    view.lock().print(HELP);

    info!("서버 연결: {}", config.server.base_url);
    let connection_task = tokio::spawn(connection.run(adapter.clone(), lifecycle.subscribe()));

    let mut lines = spawn_stdin_reader();
    let mut shutdown_rx = lifecycle.subscribe();
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = shutdown_rx.changed() => break,
        };
        let Some(line) = line else {
            debug!("표준 입력 종료");
            break;
        };
        match commands::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                execute(&adapter, &connectivity, &mut controller, &mut lines, command).await?;
            }
            Ok(None) => {}
            Err(usage) => view.lock().print(&usage),
        }
    }

    controller.close_all();
    lifecycle.shutdown();
    if let Err(e) = connection_task.await {
        debug!("연결 태스크 종료 에러: {e}");
    }
    info!("클라이언트 종료");
    Ok(())
}

/// 표준 입력을 별도 스레드에서 줄 단위로 읽는다
///
/// 블로킹 읽기는 취소할 수 없으므로 런타임 밖 스레드에 둔다. 프로세스 종료 시 함께 사라진다.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// 연결 상태 한 줄 요약
fn connection_line(connectivity: &ConnectivityManager) -> String {
    let mut line = format!("connection: {}", connectivity.status());
    let failures = connectivity.failure_count();
    if failures > 0 {
        line.push_str(&format!(" ({failures} consecutive failures)"));
    }
    if let Some(at) = connectivity.last_success() {
        let at = at.with_timezone(&Local).format("%H:%M:%S");
        line.push_str(&format!(", last connected {at}"));
    }
    line
}

async fn execute(
    adapter: &Adapter,
    connectivity: &ConnectivityManager,
    controller: &mut ViewController,
    lines: &mut mpsc::Receiver<String>,
    command: Command,
) -> Result<()> {
    let view = adapter.view();
    let user = adapter.current_user();

    let result = match (command, user) {
        (Command::Help, _) => {
            view.lock().print(HELP);
            Ok(())
        }
        (Command::Login(user), _) => {
            adapter.select_user(user);
            Ok(())
        }
        (Command::Logout, _) => {
            controller.close_all();
            adapter.logout();
            Ok(())
        }
        (Command::Status, _) => {
            view.lock().print_status(&connection_line(connectivity));
            Ok(())
        }
        (Command::Log, _) => {
            view.lock().print_log();
            Ok(())
        }
        (Command::MarketOpen, _) => {
            controller.open(MARKET_VIEW);
            Ok(())
        }
        (Command::MarketClose, _) => {
            controller.close(MARKET_VIEW);
            Ok(())
        }
        (Command::EndCycle, _) => {
            view.lock().print(&format!("{END_CYCLE_CONFIRM} [y/N]"));
            let confirmed = lines
                .recv()
                .await
                .map(|a| matches!(a.trim(), "y" | "Y" | "yes"))
                .unwrap_or(false);
            view.lock().answer_next_confirm(confirmed);
            adapter.end_cycle().await
        }
        (_, None) => {
            view.lock().print("select a user first: login <luu|4keni>");
            Ok(())
        }
        (Command::Start { tier, task }, Some(user)) => {
            view.lock().fill_start_form(user, &tier, &task);
            adapter.start_chicken(user).await
        }
        (Command::Pause, Some(user)) => adapter.toggle_pause(user).await,
        (Command::Reset, Some(user)) => adapter.reset_timer(user).await,
        (Command::ChallengeStart, Some(user)) => adapter.start_challenge(user).await,
        (Command::ChallengeDone { success }, Some(user)) => {
            adapter.complete_challenge(user, success).await
        }
        (Command::Quit, Some(_)) => Ok(()),
    };

    if let Err(e) = result {
        debug!("명령 실패: {e}");
    }
    Ok(())
}
