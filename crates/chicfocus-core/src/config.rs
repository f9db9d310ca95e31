//! 애플리케이션 설정 구조체.
//!
//! 서버 주소, 재연결 정책, 폴링 주기, 웹 서버, 타이머, 사이클, 마켓 시뮬레이터,
//! 챌린지 설정을 정의한다. [`crate::config_manager::ConfigManager`]가 JSON 파일로 로드/저장.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정 (클라이언트)
    #[serde(default)]
    pub server: ServerConfig,
    /// 재연결 정책
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// 마켓 폴링 설정
    #[serde(default)]
    pub polling: PollingConfig,
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 포커스 타이머 설정
    #[serde(default)]
    pub timer: TimerConfig,
    /// 점수 사이클 설정
    #[serde(default)]
    pub cycle: CycleConfig,
    /// 마켓 시뮬레이터 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// 챌린지 설정
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

// ============================================================
// 서버 연결 설정
// ============================================================

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 서버 기본 URL (http/https)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP 요청 타임아웃 (ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// WebSocket 경로
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            ws_path: default_ws_path(),
        }
    }
}

// ============================================================
// 재연결 설정
// ============================================================

/// 실시간 채널 재연결 정책
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// 첫 재시도 대기 (ms)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// 최대 재시도 대기 (ms)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// 최대 재시도 횟수 (None = 무제한)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<u32>,
    /// 사용자에게 알리기 전 허용하는 연속 실패 횟수
    #[serde(default = "default_notify_after_failures")]
    pub notify_after_failures: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            notify_after_failures: default_notify_after_failures(),
        }
    }
}

// ============================================================
// 폴링 설정
// ============================================================

/// 마켓 뷰 폴링 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// 마켓 이벤트 폴링 주기 (ms)
    #[serde(default = "default_market_events_interval_ms")]
    pub market_events_interval_ms: u64,
    /// 마켓 피드 폴링 주기 (ms)
    #[serde(default = "default_market_feed_interval_ms")]
    pub market_feed_interval_ms: u64,
    /// 피드 렌더링 최대 항목 수
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
    /// 마켓 이벤트 팝업 표시 시간 (ms)
    #[serde(default = "default_popup_display_ms")]
    pub popup_display_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            market_events_interval_ms: default_market_events_interval_ms(),
            market_feed_interval_ms: default_market_feed_interval_ms(),
            feed_limit: default_feed_limit(),
            popup_display_ms: default_popup_display_ms(),
        }
    }
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 포트 (기본: 5000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 사이클 데이터 저장 디렉토리 (None이면 플랫폼 데이터 디렉토리)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
            data_dir: None,
        }
    }
}

// ============================================================
// 타이머 설정
// ============================================================

/// 포커스 타이머 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// 타이머 틱 간격 (ms)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// 휴식 시간 (초)
    #[serde(default = "default_break_secs")]
    pub break_secs: u64,
    /// 하루 최대 세션 수
    #[serde(default = "default_daily_limit")]
    pub daily_limit: usize,
    /// 세션 길이 강제 지정 (초). 테스트/데모용, None이면 티어별 분 단위
    #[serde(default)]
    pub session_secs_override: Option<u64>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            break_secs: default_break_secs(),
            daily_limit: default_daily_limit(),
            session_secs_override: None,
        }
    }
}

// ============================================================
// 사이클 설정
// ============================================================

/// 점수 사이클 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// 사이클 길이 (일)
    #[serde(default = "default_cycle_length_days")]
    pub length_days: i64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            length_days: default_cycle_length_days(),
        }
    }
}

// ============================================================
// 마켓 시뮬레이터 설정
// ============================================================

/// 마켓 시뮬레이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// 시세 갱신 주기 (초)
    #[serde(default = "default_market_tick_secs")]
    pub tick_secs: u64,
    /// 틱당 마켓 이벤트 발생 확률 (0.0 ~ 1.0)
    #[serde(default = "default_event_chance")]
    pub event_chance: f64,
    /// 차트용 가격 이력 길이
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// 보관할 최대 이벤트 수
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// 보관할 최대 피드 항목 수
    #[serde(default = "default_max_feed")]
    pub max_feed: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_market_tick_secs(),
            event_chance: default_event_chance(),
            history_len: default_history_len(),
            max_events: default_max_events(),
            max_feed: default_max_feed(),
        }
    }
}

// ============================================================
// 챌린지 설정
// ============================================================

/// 챌린지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// 챌린지 성공 시 보너스 점수
    #[serde(default = "default_challenge_points")]
    pub points: i64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            points: default_challenge_points(),
        }
    }
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            reconnect: ReconnectConfig::default(),
            polling: PollingConfig::default(),
            web: WebConfig::default(),
            timer: TimerConfig::default(),
            cycle: CycleConfig::default(),
            market: MarketConfig::default(),
            challenge: ChallengeConfig::default(),
        }
    }

    /// HTTP 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// 마켓 이벤트 폴링 주기
    pub fn market_events_interval(&self) -> Duration {
        Duration::from_millis(self.polling.market_events_interval_ms.max(1))
    }

    /// 마켓 피드 폴링 주기
    pub fn market_feed_interval(&self) -> Duration {
        Duration::from_millis(self.polling.market_feed_interval_ms.max(1))
    }

    /// 마켓 이벤트 팝업 표시 시간
    pub fn market_popup_duration(&self) -> Duration {
        Duration::from_millis(self.polling.popup_display_ms)
    }

    /// 타이머 틱 간격
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_ms.max(1))
    }

    /// 시세 갱신 주기
    pub fn market_tick_interval(&self) -> Duration {
        Duration::from_secs(self.market.tick_secs.max(1))
    }

    /// 값 범위 검사. 첫 번째로 어긋난 필드를 돌려준다.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |field: &str, message: &str| {
            Err(CoreError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })
        };

        let base_url = &self.server.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return invalid("server.base_url", "http:// 또는 https:// 로 시작해야 함");
        }
        if !self.server.ws_path.starts_with('/') {
            return invalid("server.ws_path", "'/'로 시작해야 함");
        }
        if self.reconnect.initial_delay_ms > self.reconnect.max_delay_ms {
            return invalid("reconnect.initial_delay_ms", "max_delay_ms보다 클 수 없음");
        }
        if self.polling.market_events_interval_ms == 0 {
            return invalid("polling.market_events_interval_ms", "1 이상이어야 함");
        }
        if self.polling.market_feed_interval_ms == 0 {
            return invalid("polling.market_feed_interval_ms", "1 이상이어야 함");
        }
        if self.polling.feed_limit == 0 {
            return invalid("polling.feed_limit", "1 이상이어야 함");
        }
        if self.timer.daily_limit == 0 {
            return invalid("timer.daily_limit", "1 이상이어야 함");
        }
        if self.cycle.length_days <= 0 {
            return invalid("cycle.length_days", "1 이상이어야 함");
        }
        if !(0.0..=1.0).contains(&self.market.event_chance) {
            return invalid("market.event_chance", "0.0 ~ 1.0 범위여야 함");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_ws_path() -> String {
    "/ws".to_string()
}
fn default_initial_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_max_attempts() -> Option<u32> {
    Some(10)
}
fn default_notify_after_failures() -> u32 {
    3
}
fn default_market_events_interval_ms() -> u64 {
    5_000
}
fn default_market_feed_interval_ms() -> u64 {
    3_000
}
fn default_feed_limit() -> usize {
    10
}
fn default_popup_display_ms() -> u64 {
    4_000
}
fn default_web_port() -> u16 {
    5000
}
fn default_tick_ms() -> u64 {
    1_000
}
fn default_break_secs() -> u64 {
    300
}
fn default_daily_limit() -> usize {
    5
}
fn default_cycle_length_days() -> i64 {
    7
}
fn default_market_tick_secs() -> u64 {
    10
}
fn default_event_chance() -> f64 {
    0.2
}
fn default_history_len() -> usize {
    60
}
fn default_max_events() -> usize {
    50
}
fn default_max_feed() -> usize {
    100
}
fn default_challenge_points() -> i64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.timer.break_secs, 300);
        assert_eq!(config.server.ws_path, "/ws");
        assert_eq!(config.reconnect.notify_after_failures, 3);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let json = r#"{"reconnect": {"max_attempts": null}, "timer": {"tick_ms": 10}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reconnect.max_attempts, None);
        assert_eq!(config.reconnect.initial_delay_ms, 1_000);
        assert_eq!(config.timer.tick_ms, 10);
        assert_eq!(config.timer.daily_limit, 5);
    }

    #[test]
    fn duration_helpers() {
        let config = AppConfig::default_config();
        assert_eq!(config.market_events_interval(), Duration::from_secs(5));
        assert_eq!(config.market_feed_interval(), Duration::from_secs(3));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.market_popup_duration(), Duration::from_secs(4));
    }

    #[test]
    fn zero_poll_intervals_never_yield_zero_duration() {
        let mut config = AppConfig::default_config();
        config.polling.market_events_interval_ms = 0;
        config.polling.market_feed_interval_ms = 0;
        assert!(!config.market_events_interval().is_zero());
        assert!(!config.market_feed_interval().is_zero());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn validation_names_the_field() {
        let mut config = AppConfig::default_config();
        config.reconnect.initial_delay_ms = 10_000;
        match config.validate() {
            Err(CoreError::Validation { field, .. }) => {
                assert_eq!(field, "reconnect.initial_delay_ms")
            }
            other => panic!("{other:?}"),
        }

        let mut config = AppConfig::default_config();
        config.polling.market_events_interval_ms = 0;
        match config.validate() {
            Err(CoreError::Validation { field, .. }) => {
                assert_eq!(field, "polling.market_events_interval_ms")
            }
            other => panic!("{other:?}"),
        }

        let mut config = AppConfig::default_config();
        config.polling.market_feed_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default_config();
        config.market.event_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default_config();
        config.server.base_url = "ws://localhost:5000".to_string();
        assert!(config.validate().is_err());
    }
}
