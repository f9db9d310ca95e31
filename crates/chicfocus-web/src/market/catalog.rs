//! 마켓 카탈로그: 거래 동물과 랜덤 이벤트 템플릿.

use chicfocus_core::models::tier::Tier;

/// 거래 동물 (티어별 치킨)
#[derive(Debug, Clone, Copy)]
pub struct AnimalSpec {
    pub name: &'static str,
    pub tier: Tier,
    /// 기본 가격 범위 `(min, max)`
    pub base_price: (f64, f64),
}

pub const ANIMALS: &[AnimalSpec] = &[
    AnimalSpec {
        name: "Light Chicken",
        tier: Tier::Light,
        base_price: (8.0, 12.0),
    },
    AnimalSpec {
        name: "Medium Chicken",
        tier: Tier::Medium,
        base_price: (18.0, 26.0),
    },
    AnimalSpec {
        name: "Heavy Chicken",
        tier: Tier::Heavy,
        base_price: (32.0, 48.0),
    },
];

/// 랜덤 이벤트 템플릿
#[derive(Debug, Clone, Copy)]
pub struct EventTemplate {
    pub emoji: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    /// 가격 배수
    pub multiplier: f64,
    /// 영향받는 티어 (None이면 전체)
    pub target: Option<Tier>,
}

pub const EVENTS: &[EventTemplate] = &[
    EventTemplate {
        emoji: "🦊",
        name: "Fox Attack",
        desc: "A fox raided the coop. Supply is down!",
        multiplier: 1.25,
        target: None,
    },
    EventTemplate {
        emoji: "🌽",
        name: "Corn Harvest",
        desc: "Cheap feed everywhere. Prices soften.",
        multiplier: 0.85,
        target: None,
    },
    EventTemplate {
        emoji: "🏆",
        name: "County Fair",
        desc: "Heavy Chickens are the star of the show.",
        multiplier: 1.4,
        target: Some(Tier::Heavy),
    },
    EventTemplate {
        emoji: "🥚",
        name: "Egg Boom",
        desc: "Light Chickens are laying like crazy.",
        multiplier: 0.7,
        target: Some(Tier::Light),
    },
    EventTemplate {
        emoji: "📉",
        name: "Market Jitters",
        desc: "Traders panic over nothing.",
        multiplier: 0.9,
        target: Some(Tier::Medium),
    },
    EventTemplate {
        emoji: "🚚",
        name: "Export Deal",
        desc: "A big buyer wants Medium Chickens.",
        multiplier: 1.2,
        target: Some(Tier::Medium),
    },
];

impl EventTemplate {
    /// 해당 동물에 적용되는지
    pub fn applies_to(&self, animal: &AnimalSpec) -> bool {
        match self.target {
            Some(tier) => tier == animal.tier,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_animal_per_tier() {
        for tier in Tier::ALL {
            assert_eq!(ANIMALS.iter().filter(|a| a.tier == tier).count(), 1);
        }
        assert!(ANIMALS.iter().all(|a| a.base_price.0 < a.base_price.1));
    }

    #[test]
    fn targeted_event_hits_only_its_tier() {
        let fair = EVENTS
            .iter()
            .find(|e| e.name == "County Fair")
            .unwrap();
        let hits: Vec<_> = ANIMALS.iter().filter(|a| fair.applies_to(a)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tier, Tier::Heavy);
    }
}
