//! 뷰 컨트롤러.
//!
//! 뷰 id마다 등록된 훅을 열기/닫기 시점에 등록 순서대로 실행한다.
//! 마켓 뷰는 [`VisibilityHook`] + [`MarketPollingHook`] 조합으로 구성된다.

use chicfocus_core::config::AppConfig;
use chicfocus_core::ports::view::View;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::adapter::SharedView;
use crate::market::MarketPoller;
use crate::polling::PollingLoop;

/// 뷰 열림/닫힘 훅
pub trait ViewHook: Send {
    /// 뷰가 열릴 때
    fn on_open(&mut self);

    /// 뷰가 닫힐 때
    fn on_close(&mut self);
}

/// 뷰별 훅 실행기
#[derive(Default)]
pub struct ViewController {
    hooks: BTreeMap<String, Vec<Box<dyn ViewHook>>>,
    open: BTreeSet<String>,
}

impl ViewController {
    /// 빈 컨트롤러
    pub fn new() -> Self {
        Self::default()
    }

    /// 훅 등록 (등록 순서대로 실행)
    pub fn register(&mut self, view_id: &str, hook: Box<dyn ViewHook>) {
        self.hooks.entry(view_id.to_string()).or_default().push(hook);
    }

    /// 열림 여부
    pub fn is_open(&self, view_id: &str) -> bool {
        self.open.contains(view_id)
    }

    /// 뷰 열기. 이미 열려 있으면 false.
    pub fn open(&mut self, view_id: &str) -> bool {
        if !self.open.insert(view_id.to_string()) {
            return false;
        }
        debug!("뷰 열림: {view_id}");
        if let Some(hooks) = self.hooks.get_mut(view_id) {
            for hook in hooks.iter_mut() {
                hook.on_open();
            }
        }
        true
    }

    /// 뷰 닫기. 열려 있지 않으면 false.
    pub fn close(&mut self, view_id: &str) -> bool {
        if !self.open.remove(view_id) {
            return false;
        }
        debug!("뷰 닫힘: {view_id}");
        if let Some(hooks) = self.hooks.get_mut(view_id) {
            for hook in hooks.iter_mut() {
                hook.on_close();
            }
        }
        true
    }

    /// 열린 뷰 모두 닫기 (로그아웃, 종료)
    pub fn close_all(&mut self) {
        let open: Vec<String> = self.open.iter().cloned().collect();
        for view_id in open {
            self.close(&view_id);
        }
    }
}

/// 요소 표시/숨김 훅
pub struct VisibilityHook<V: View> {
    view: SharedView<V>,
    element_id: &'static str,
}

impl<V: View> VisibilityHook<V> {
    pub fn new(view: SharedView<V>, element_id: &'static str) -> Self {
        Self { view, element_id }
    }
}

impl<V: View + 'static> ViewHook for VisibilityHook<V> {
    fn on_open(&mut self) {
        self.view.lock().set_hidden(self.element_id, false);
    }

    fn on_close(&mut self) {
        self.view.lock().set_hidden(self.element_id, true);
    }
}

/// 마켓 폴링 훅: 이벤트/피드 두 루프를 뷰 수명에 묶는다
pub struct MarketPollingHook<V: View> {
    poller: MarketPoller<V>,
    events: PollingLoop,
    feed: PollingLoop,
}

impl<V: View + 'static> MarketPollingHook<V> {
    /// 설정의 폴링 간격으로 생성
    pub fn new(poller: MarketPoller<V>, config: &AppConfig) -> Self {
        Self {
            poller,
            events: PollingLoop::new("market-events", config.market_events_interval()),
            feed: PollingLoop::new("market-feed", config.market_feed_interval()),
        }
    }

    /// 폴링 중인지
    pub fn is_polling(&self) -> bool {
        self.events.is_running() && self.feed.is_running()
    }
}

impl<V: View + 'static> ViewHook for MarketPollingHook<V> {
    fn on_open(&mut self) {
        let poller = self.poller.clone();
        self.events
            .start(move |guard| poller.clone().events_tick(guard));
        let poller = self.poller.clone();
        self.feed.start(move |guard| poller.clone().feed_tick(guard));
    }

    fn on_close(&mut self) {
        self.events.stop();
        self.feed.stop();
        self.poller.hide_popup();
    }
}
