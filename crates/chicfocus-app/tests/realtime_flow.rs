//! 실제 서버(임시 포트) + 실시간 연결 + UI 어댑터 통합 테스트.

use chicfocus_core::config::AppConfig;
use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::tier::Tier;
use chicfocus_core::ports::market_api::MarketApi;
use chicfocus_core::ports::view::View;
use chicfocus_network::connection::RealtimeConnection;
use chicfocus_network::http_client::HttpMarketClient;
use chicfocus_storage::CycleStore;
use chicfocus_ui::elements::*;
use chicfocus_ui::{strings, MemoryView, RealtimeUiAdapter, UiError};
use chicfocus_web::WebServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

struct Harness {
    addr: SocketAddr,
    store: Arc<CycleStore>,
    adapter: Arc<RealtimeUiAdapter<MemoryView>>,
    shutdown_tx: watch::Sender<bool>,
    server: tokio::task::JoinHandle<Result<(), std::io::Error>>,
    client: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = AppConfig::default();
        config.timer.tick_ms = 10;
        config.timer.session_secs_override = Some(1);
        config.timer.break_secs = 1;
        config.reconnect.initial_delay_ms = 20;
        config.reconnect.max_delay_ms = 100;
        config.server.base_url = format!("http://{addr}");

        let store = Arc::new(CycleStore::in_memory());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let server = WebServer::new(store.clone(), &config);
        let server = tokio::spawn(server.serve(listener, shutdown_rx.clone()));

        let connection = RealtimeConnection::from_config(&config);
        let adapter = Arc::new(RealtimeUiAdapter::new(
            MemoryView::new(),
            connection.transport(),
        ));
        adapter.select_user(Identity::Luu);
        let client = tokio::spawn(connection.run(adapter.clone(), shutdown_rx));

        let harness = Self {
            addr,
            store,
            adapter,
            shutdown_tx,
            server,
            client,
        };
        harness
            .wait_for("소켓 연결", |view| view.has_class(BODY, SOCKET_CONNECTED_CLASS))
            .await;
        harness
    }

    async fn wait_for(&self, what: &str, check: impl Fn(&MemoryView) -> bool) {
        let view = self.adapter.view();
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if check(&view.lock()) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "{what} 대기 시간 초과");
    }

    async fn stop(self) {
        self.shutdown_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(5), self.client)
            .await
            .expect("클라이언트 종료 시간 초과")
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("서버 종료 시간 초과")
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn session_runs_through_break_and_updates_scoreboard() {
    let harness = Harness::start().await;
    let luu = Identity::Luu;

    {
        let view = harness.adapter.view();
        let mut view = view.lock();
        view.set_checked(&el(luu, TIER), "2");
        view.set_value(&el(luu, TASK_NAME), "essay draft");
    }
    harness.adapter.start_chicken(luu).await.unwrap();

    harness
        .wait_for("세션 시작 반영", |view| {
            view.is_disabled(&el(luu, START_BTN)) && !view.is_disabled(&el(luu, PAUSE_BTN))
        })
        .await;

    harness
        .wait_for("세션 완료", |view| {
            view.text(&el(luu, TIMER_STATUS)).as_deref() == Some(strings::SESSION_COMPLETED)
        })
        .await;

    let expected_points = Tier::from_number(2).unwrap().points().to_string();
    harness
        .wait_for("점수 반영", |view| {
            view.text(&el(luu, POINTS)).as_deref() == Some(expected_points.as_str())
        })
        .await;

    assert_eq!(harness.store.user(luu).sessions_today(), 1);
    {
        let view = harness.adapter.view();
        let view = view.lock();
        assert!(!view.is_disabled(&el(luu, START_BTN)));
        assert!(view.items(SHARED_LOG).iter().any(|item| item.text.contains("essay draft")));
        assert!(view.alerts().iter().any(|a| a == strings::CHICKEN_DONE));
    }

    harness.stop().await;
}

#[tokio::test]
async fn locally_rejected_start_sends_nothing() {
    let harness = Harness::start().await;
    let luu = Identity::Luu;

    harness.adapter.view().lock().set_checked(&el(luu, TIER), "1");
    let result = harness.adapter.start_chicken(luu).await;
    assert!(matches!(result, Err(UiError::MissingTaskName)));

    let result = harness.adapter.start_chicken(Identity::Keni).await;
    assert!(matches!(result, Err(UiError::NotOwnIdentity)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.store.user(luu).sessions_today(), 0);
    {
        let view = harness.adapter.view();
        let view = view.lock();
        assert!(!view.is_disabled(&el(luu, START_BTN)));
        assert_eq!(view.alerts().len(), 2);
    }

    harness.stop().await;
}

#[tokio::test]
async fn market_client_reads_live_server() {
    let harness = Harness::start().await;

    let client =
        HttpMarketClient::new(&format!("http://{}", harness.addr), Duration::from_secs(2)).unwrap();

    let animals = client.available_animals().await.unwrap();
    assert_eq!(animals.len(), 3);

    let events = client.market_events().await.unwrap();
    let feed = client.market_feed().await.unwrap();
    assert!(events.len() <= AppConfig::default().market.max_events);
    assert!(feed.len() <= AppConfig::default().market.max_feed);

    let url = client.chart_url(42);
    assert!(url.ends_with("/api/market_chart.png?t=42"), "{url}");

    harness.stop().await;
}
