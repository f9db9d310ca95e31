//! 마켓 뷰 폴러.
//!
//! - 이벤트: 최신 이벤트 시각이 바뀌면 팝업 + 차트 이미지 갱신. 팝업은 표시 시간이 지나면 숨긴다.
//! - 피드: 최신 항목을 다시 그리고, 직전 렌더링에 없던 id에 `new` 클래스

use chicfocus_core::error::CoreError;
use chicfocus_core::models::market::{FeedEntry, MarketEvent};
use chicfocus_core::ports::market_api::MarketApi;
use chicfocus_core::ports::view::{ListItem, View};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapter::{SharedSession, SharedView};
use crate::elements::{MARKET_CHART, MARKET_FEED, MARKET_POPUP, NEW_ITEM_CLASS};
use crate::polling::PollGuard;

/// 팝업 기본 표시 시간
pub const DEFAULT_POPUP_DURATION: Duration = Duration::from_secs(4);

/// 폴링 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// 화면 갱신함
    Rendered,
    /// 새로운 내용 없음
    Unchanged,
    /// 루프가 이미 정지되어 응답 폐기
    Stale,
}

/// 마켓 폴러
pub struct MarketPoller<V: View> {
    api: Arc<dyn MarketApi>,
    session: SharedSession,
    view: SharedView<V>,
    feed_limit: usize,
    popup_duration: Duration,
    /// 마지막으로 띄운 팝업 번호. 더 새 팝업이 떴으면 이전 숨김 예약은 무시된다.
    popup_seq: Arc<AtomicU64>,
}

impl<V: View> Clone for MarketPoller<V> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: self.session.clone(),
            view: self.view.clone(),
            feed_limit: self.feed_limit,
            popup_duration: self.popup_duration,
            popup_seq: self.popup_seq.clone(),
        }
    }
}

/// 팝업 문구
fn popup_text(event: &MarketEvent) -> String {
    format!("{} {}: {}", event.emoji, event.name, event.desc)
}

/// 피드 항목 → 목록 항목
fn feed_item(entry: &FeedEntry, is_new: bool) -> ListItem {
    let mut class = format!("feed-item feed-{}", entry.kind);
    if is_new {
        class.push(' ');
        class.push_str(NEW_ITEM_CLASS);
    }
    ListItem::new(class, entry.msg.clone()).with_key(entry.id.to_string())
}

impl<V: View + 'static> MarketPoller<V> {
    /// 새 폴러 생성
    pub fn new(
        api: Arc<dyn MarketApi>,
        session: SharedSession,
        view: SharedView<V>,
        feed_limit: usize,
    ) -> Self {
        Self {
            api,
            session,
            view,
            feed_limit,
            popup_duration: DEFAULT_POPUP_DURATION,
            popup_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 팝업 표시 시간 지정
    pub fn with_popup_duration(mut self, duration: Duration) -> Self {
        self.popup_duration = duration;
        self
    }

    /// 마켓 이벤트 한 번 조회
    pub async fn poll_events_once(&self, guard: &PollGuard) -> Result<PollOutcome, CoreError> {
        let events = self.api.market_events().await?;
        if !guard.is_current() {
            debug!("정지된 루프의 이벤트 응답 폐기");
            return Ok(PollOutcome::Stale);
        }
        let Some(latest) = events.first() else {
            return Ok(PollOutcome::Unchanged);
        };

        let mut session = self.session.lock();
        if session.market.last_event_time.as_deref() == Some(latest.time.as_str()) {
            return Ok(PollOutcome::Unchanged);
        }
        session.market.last_event_time = Some(latest.time.clone());

        let chart_src = self.api.chart_url(Utc::now().timestamp_millis());
        let mut view = self.view.lock();
        view.set_text(MARKET_POPUP, &popup_text(latest));
        view.set_hidden(MARKET_POPUP, false);
        view.set_image_src(MARKET_CHART, &chart_src);
        drop(view);
        drop(session);

        debug!("새 마켓 이벤트: {}", latest.name);
        self.schedule_popup_hide(guard.clone());
        Ok(PollOutcome::Rendered)
    }

    /// 표시 시간 뒤 팝업 숨김 예약
    ///
    /// 그 사이 루프가 정지됐거나 더 새 팝업이 떴으면 건드리지 않는다.
    fn schedule_popup_hide(&self, guard: PollGuard) {
        let seq = self.popup_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let popup_seq = self.popup_seq.clone();
        let view = self.view.clone();
        let delay = self.popup_duration;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if guard.is_current() && popup_seq.load(Ordering::Acquire) == seq {
                view.lock().set_hidden(MARKET_POPUP, true);
            }
        });
    }

    /// 마켓 피드 한 번 조회
    pub async fn poll_feed_once(&self, guard: &PollGuard) -> Result<PollOutcome, CoreError> {
        let feed = self.api.market_feed().await?;
        if !guard.is_current() {
            debug!("정지된 루프의 피드 응답 폐기");
            return Ok(PollOutcome::Stale);
        }

        let latest: Vec<&FeedEntry> = feed.iter().take(self.feed_limit).collect();
        let mut session = self.session.lock();
        let previous = &session.market.rendered_feed_ids;
        let items: Vec<ListItem> = latest
            .iter()
            .map(|entry| feed_item(entry, !previous.contains(&entry.id)))
            .collect();
        session.market.rendered_feed_ids =
            latest.iter().map(|entry| entry.id).collect::<HashSet<_>>();

        self.view.lock().render_list(MARKET_FEED, &items);
        Ok(PollOutcome::Rendered)
    }

    /// 이벤트 폴링 틱 (에러는 로그만)
    pub async fn events_tick(self, guard: PollGuard) {
        if let Err(e) = self.poll_events_once(&guard).await {
            warn!("마켓 이벤트 조회 실패: {e}");
        }
    }

    /// 피드 폴링 틱 (에러는 로그만)
    pub async fn feed_tick(self, guard: PollGuard) {
        if let Err(e) = self.poll_feed_once(&guard).await {
            warn!("마켓 피드 조회 실패: {e}");
        }
    }

    /// 팝업 숨김 (뷰 닫힘)
    pub fn hide_popup(&self) {
        self.view.lock().set_hidden(MARKET_POPUP, true);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use chicfocus_core::error::CoreError;
    use chicfocus_core::models::market::{AvailableAnimal, FeedEntry, MarketEvent};
    use chicfocus_core::ports::market_api::MarketApi;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 고정 응답을 돌려주는 마켓 API
    #[derive(Default)]
    pub struct StubMarket {
        pub events: Mutex<Vec<MarketEvent>>,
        pub feed: Mutex<Vec<FeedEntry>>,
        pub event_calls: AtomicUsize,
        pub feed_calls: AtomicUsize,
    }

    pub fn event(time: &str, name: &str) -> MarketEvent {
        MarketEvent {
            time: time.into(),
            emoji: "📈".into(),
            name: name.into(),
            desc: "prices move".into(),
        }
    }

    pub fn feed_entry(id: u64) -> FeedEntry {
        FeedEntry {
            id,
            kind: "price".into(),
            msg: format!("tick {id}"),
        }
    }

    #[async_trait]
    impl MarketApi for StubMarket {
        async fn market_events(&self) -> Result<Vec<MarketEvent>, CoreError> {
            self.event_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.events.lock().clone())
        }

        async fn available_animals(&self) -> Result<Vec<AvailableAnimal>, CoreError> {
            Ok(Vec::new())
        }

        async fn market_feed(&self) -> Result<Vec<FeedEntry>, CoreError> {
            self.feed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.feed.lock().clone())
        }

        fn chart_url(&self, cache_buster: i64) -> String {
            format!("/api/market_chart.png?t={cache_buster}")
        }
    }
}
