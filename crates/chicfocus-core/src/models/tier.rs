//! 세션 티어 (치킨 종류).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// 집중 세션 분류
///
/// 와이어에서는 정수로 직렬화되며, 역직렬화 시 `"2"` 같은 숫자 문자열도 허용한다
/// (라디오 버튼 값이 문자열로 전달되는 경우).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TierRepr", into = "u8")]
pub enum Tier {
    /// 15분, 1점
    Light,
    /// 30분, 2점
    Medium,
    /// 45분, 3점
    Heavy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TierRepr {
    Number(u8),
    Text(String),
}

impl Tier {
    /// 전체 티어 (오름차순)
    pub const ALL: [Tier; 3] = [Tier::Light, Tier::Medium, Tier::Heavy];

    /// 티어 번호 (1-3)
    pub fn number(&self) -> u8 {
        match self {
            Tier::Light => 1,
            Tier::Medium => 2,
            Tier::Heavy => 3,
        }
    }

    /// 번호로 티어 조회
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Tier::Light),
            2 => Ok(Tier::Medium),
            3 => Ok(Tier::Heavy),
            other => Err(CoreError::Validation {
                field: "tier".to_string(),
                message: format!("Invalid tier: {other}"),
            }),
        }
    }

    /// 표시 라벨
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Light => "Light Chicken",
            Tier::Medium => "Medium Chicken",
            Tier::Heavy => "Heavy Chicken",
        }
    }

    /// 집중 강도 설명
    pub fn intensity(&self) -> &'static str {
        match self {
            Tier::Light => "casual",
            Tier::Medium => "normal",
            Tier::Heavy => "deep focus",
        }
    }

    /// 세션 길이 (분)
    pub fn minutes(&self) -> u64 {
        match self {
            Tier::Light => 15,
            Tier::Medium => 30,
            Tier::Heavy => 45,
        }
    }

    /// 기본 점수
    pub fn points(&self) -> i64 {
        i64::from(self.number())
    }
}

impl TryFrom<TierRepr> for Tier {
    type Error = CoreError;

    fn try_from(repr: TierRepr) -> Result<Self, Self::Error> {
        match repr {
            TierRepr::Number(n) => Tier::from_number(n),
            TierRepr::Text(s) => {
                let n = s.trim().parse::<u8>().map_err(|_| CoreError::Validation {
                    field: "tier".to_string(),
                    message: format!("Invalid tier: {s}"),
                })?;
                Tier::from_number(n)
            }
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_string() {
        let tier: Tier = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(tier, Tier::Heavy);
        let tier: Tier = serde_json::from_str("2").unwrap();
        assert_eq!(tier, Tier::Medium);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(serde_json::from_str::<Tier>("4").is_err());
        assert!(serde_json::from_str::<Tier>("\"heavy\"").is_err());
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&Tier::Light).unwrap(), "1");
        assert_eq!(Tier::Medium.to_string(), "Tier 2");
    }
}
