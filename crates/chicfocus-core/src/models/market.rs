//! 마켓 모델 (랜덤 이벤트, 가격, 피드).

use serde::{Deserialize, Serialize};

/// 마켓 이벤트 (`GET /api/market_events` 항목)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// 발생 시각 (표시용 문자열, 새 이벤트 감지 키)
    pub time: String,
    /// 이모지
    pub emoji: String,
    /// 이벤트 이름
    pub name: String,
    /// 설명
    pub desc: String,
}

/// 거래 가능한 동물 (`GET /api/available_animals` 항목)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableAnimal {
    /// 이름
    pub name: String,
    /// 기본 가격 범위 `[min, max]`
    pub base_price: (f64, f64),
}

/// 마켓 피드 항목 (`GET /api/market_feed` 항목)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// 단조 증가 id
    pub id: u64,
    /// 항목 종류 (`price`, `event`)
    #[serde(rename = "type")]
    pub kind: String,
    /// 메시지
    pub msg: String,
}
