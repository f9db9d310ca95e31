//! 재연결 정책.
//!
//! 지수 백오프: 초기 대기에서 시작해 실패마다 두 배, 최대 대기에서 고정.

use chicfocus_core::config::ReconnectConfig;
use std::time::Duration;

/// 재연결 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// 첫 재시도 대기
    pub initial_delay: Duration,
    /// 최대 재시도 대기
    pub max_delay: Duration,
    /// 최대 연속 실패 횟수 (None = 무제한)
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// 설정에서 정책 생성
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
        }
    }

    /// `attempt`번째(1부터) 실패 후 대기 시간
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// `attempts`번 연속 실패 후 포기해야 하는지
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}
