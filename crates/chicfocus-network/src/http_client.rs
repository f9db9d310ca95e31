//! 마켓 REST API 클라이언트.
//!
//! `MarketApi` 포트 구현. 일시적 실패(네트워크, 429, 503)는 지수 백오프로 재시도.

use async_trait::async_trait;
use chicfocus_core::error::CoreError;
use chicfocus_core::models::market::{AvailableAnimal, FeedEntry, MarketEvent};
use chicfocus_core::ports::market_api::MarketApi;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 기본 재시도 횟수
const DEFAULT_MAX_RETRIES: u32 = 2;

/// 기본 첫 재시도 대기
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// 재시도 대기 상한
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Retry-After 헤더가 없을 때 429 대기 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const MARKET_EVENTS_PATH: &str = "/api/market_events";
const AVAILABLE_ANIMALS_PATH: &str = "/api/available_animals";
const MARKET_FEED_PATH: &str = "/api/market_feed";
const MARKET_CHART_PATH: &str = "/api/market_chart.png";

/// 재시도 가능한 에러인지 판별
fn is_retryable(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
    )
}

/// 마켓 REST 클라이언트: `MarketApi` 포트 구현
pub struct HttpMarketClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpMarketClient {
    /// 새 마켓 클라이언트 생성
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 첫 재시도 대기 설정
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let url = resp.url().path().to_string();
        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: url,
            }),
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: 1s → 2s → 4s (상한 30s)
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !is_retryable(&e) || attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    warn!(
                        "요청 실패 (시도 {}/{}): {e}, {delay:?} 후 재시도",
                        attempt,
                        self.max_retries + 1
                    );
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs).min(MAX_RETRY_DELAY);
                    }
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }
    }

    /// GET 요청 후 JSON 본문 디코딩
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let url = url.as_str();
        self.execute_with_retry(|| async move {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| CoreError::Network(format!("요청 실패 {path}: {e}")))?;
            let resp = Self::check_response(resp).await?;
            resp.json::<T>()
                .await
                .map_err(|e| CoreError::Internal(format!("응답 파싱 실패 {path}: {e}")))
        })
        .await
    }
}

#[async_trait]
impl MarketApi for HttpMarketClient {
    async fn market_events(&self) -> Result<Vec<MarketEvent>, CoreError> {
        let events: Vec<MarketEvent> = self.get_json(MARKET_EVENTS_PATH).await?;
        debug!("마켓 이벤트 {}건 수신", events.len());
        Ok(events)
    }

    async fn available_animals(&self) -> Result<Vec<AvailableAnimal>, CoreError> {
        self.get_json(AVAILABLE_ANIMALS_PATH).await
    }

    async fn market_feed(&self) -> Result<Vec<FeedEntry>, CoreError> {
        let feed: Vec<FeedEntry> = self.get_json(MARKET_FEED_PATH).await?;
        debug!("마켓 피드 {}건 수신", feed.len());
        Ok(feed)
    }

    fn chart_url(&self, cache_buster: i64) -> String {
        let raw = format!("{}{}", self.base_url, MARKET_CHART_PATH);
        match Url::parse(&raw) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("t", &cache_buster.to_string());
                url.to_string()
            }
            Err(_) => format!("{raw}?t={cache_buster}"),
        }
    }
}
