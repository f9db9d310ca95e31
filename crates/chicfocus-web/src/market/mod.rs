//! 마켓 시뮬레이터.
//!
//! 주기적으로 가격을 랜덤 워크시키고, 일정 확률로 마켓 이벤트를 발생시킨다.
//! 이벤트와 피드는 최신순으로 보관한다.

pub mod catalog;
pub mod chart;

use chicfocus_core::config::MarketConfig;
use chicfocus_core::models::market::{AvailableAnimal, FeedEntry, MarketEvent};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use catalog::{AnimalSpec, EventTemplate, ANIMALS, EVENTS};

/// 틱당 최대 가격 변동률
const MAX_STEP: f64 = 0.05;

/// 피드 종류
const FEED_PRICE: &str = "price";
const FEED_EVENT: &str = "event";

#[derive(Debug)]
struct Quote {
    spec: AnimalSpec,
    price: f64,
    history: VecDeque<f64>,
}

impl Quote {
    fn new(spec: AnimalSpec) -> Self {
        let (min, max) = spec.base_price;
        let price = (min + max) / 2.0;
        Self {
            spec,
            price,
            history: VecDeque::from([price]),
        }
    }

    fn set_price(&mut self, price: f64) {
        let (min, max) = self.spec.base_price;
        self.price = price.clamp(min / 2.0, max * 2.0);
    }
}

#[derive(Debug)]
struct MarketState {
    quotes: Vec<Quote>,
    events: VecDeque<MarketEvent>,
    feed: VecDeque<FeedEntry>,
    next_feed_id: u64,
}

impl MarketState {
    fn push_feed(&mut self, kind: &str, msg: String, max_feed: usize) {
        self.next_feed_id += 1;
        self.feed.push_front(FeedEntry {
            id: self.next_feed_id,
            kind: kind.to_string(),
            msg,
        });
        self.feed.truncate(max_feed);
    }
}

/// 마켓 시뮬레이터
pub struct MarketSimulator {
    config: MarketConfig,
    state: Mutex<MarketState>,
}

impl MarketSimulator {
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MarketState {
                quotes: ANIMALS.iter().copied().map(Quote::new).collect(),
                events: VecDeque::new(),
                feed: VecDeque::new(),
                next_feed_id: 0,
            }),
        }
    }

    /// 최근 이벤트 (최신순)
    pub fn events(&self) -> Vec<MarketEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// 피드 (최신순)
    pub fn feed(&self) -> Vec<FeedEntry> {
        self.state.lock().feed.iter().cloned().collect()
    }

    /// 거래 가능한 동물
    pub fn animals(&self) -> Vec<AvailableAnimal> {
        ANIMALS
            .iter()
            .map(|spec| AvailableAnimal {
                name: spec.name.to_string(),
                base_price: spec.base_price,
            })
            .collect()
    }

    /// 현재 가격 (카탈로그 순서)
    pub fn prices(&self) -> Vec<f64> {
        self.state.lock().quotes.iter().map(|q| q.price).collect()
    }

    /// 동물별 가격 이력
    pub fn price_history(&self) -> Vec<Vec<f64>> {
        self.state
            .lock()
            .quotes
            .iter()
            .map(|q| q.history.iter().copied().collect())
            .collect()
    }

    /// 가격 이력 차트 PNG
    pub fn chart_png(&self) -> Result<Vec<u8>, image::ImageError> {
        chart::render_price_chart(&self.price_history())
    }

    /// 한 틱 진행
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Local>) {
        let mut state = self.state.lock();

        let mut biggest: Option<(usize, f64)> = None;
        for (index, quote) in state.quotes.iter_mut().enumerate() {
            let before = quote.price;
            let step = rng.random_range(-MAX_STEP..=MAX_STEP);
            quote.set_price(before * (1.0 + step));
            let change = (quote.price - before) / before;
            let is_bigger = match biggest {
                Some((_, previous)) => change.abs() > previous.abs(),
                None => true,
            };
            if is_bigger {
                biggest = Some((index, change));
            }
        }

        if let Some((index, change)) = biggest {
            let quote = &state.quotes[index];
            let msg = format!(
                "{} {} {:.1}% to ${:.2}",
                quote.spec.name,
                if change >= 0.0 { "up" } else { "down" },
                change.abs() * 100.0,
                quote.price
            );
            state.push_feed(FEED_PRICE, msg, self.config.max_feed);
        }

        if rng.random_bool(self.config.event_chance.clamp(0.0, 1.0)) {
            if let Some(template) = EVENTS.choose(rng) {
                self.apply_event(&mut state, template, now);
            }
        }

        let history_len = self.config.history_len.max(2);
        for quote in state.quotes.iter_mut() {
            quote.history.push_back(quote.price);
            while quote.history.len() > history_len {
                quote.history.pop_front();
            }
        }
    }

    fn apply_event(&self, state: &mut MarketState, template: &EventTemplate, now: DateTime<Local>) {
        for quote in state.quotes.iter_mut() {
            if template.applies_to(&quote.spec) {
                let price = quote.price * template.multiplier;
                quote.set_price(price);
            }
        }

        let event = MarketEvent {
            time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            emoji: template.emoji.to_string(),
            name: template.name.to_string(),
            desc: template.desc.to_string(),
        };
        info!("마켓 이벤트: {} {}", event.emoji, event.name);
        let msg = format!("{} {}: {}", event.emoji, event.name, event.desc);
        state.events.push_front(event);
        state.events.truncate(self.config.max_events);
        state.push_feed(FEED_EVENT, msg, self.config.max_feed);
    }

    /// 종료 신호까지 주기적으로 틱 실행
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let period = Duration::from_secs(self.config.tick_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        info!("마켓 시뮬레이터 시작 ({period:?})");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(&mut rand::rng(), Local::now());
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("마켓 시뮬레이터 종료");
    }
}
