//! 참가자 신원.
//!
//! 앱은 정확히 두 명의 고정된 참가자를 다룬다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 두 명의 고정 참가자 중 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identity {
    /// luu
    #[serde(rename = "luu")]
    Luu,
    /// 4keni
    #[serde(rename = "4keni")]
    Keni,
}

impl Identity {
    /// 전체 참가자 목록 (고정 순서)
    pub const ALL: [Identity; 2] = [Identity::Luu, Identity::Keni];

    /// 와이어/표시용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Identity::Luu => "luu",
            Identity::Keni => "4keni",
        }
    }

    /// 요소 id 접두어 (`keni-timer` 처럼 숫자로 시작하지 않는 키)
    pub fn element_key(&self) -> &'static str {
        match self {
            Identity::Luu => "luu",
            Identity::Keni => "keni",
        }
    }

    /// 상대 참가자
    pub fn partner(&self) -> Identity {
        match self {
            Identity::Luu => Identity::Keni,
            Identity::Keni => Identity::Luu,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Identity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "luu" => Ok(Identity::Luu),
            "4keni" | "keni" => Ok(Identity::Keni),
            other => Err(CoreError::Validation {
                field: "user".to_string(),
                message: format!("알 수 없는 사용자: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&Identity::Keni).unwrap(), "\"4keni\"");
        let parsed: Identity = serde_json::from_str("\"luu\"").unwrap();
        assert_eq!(parsed, Identity::Luu);
    }

    #[test]
    fn element_key_never_starts_with_digit() {
        for identity in Identity::ALL {
            let first = identity.element_key().chars().next().unwrap();
            assert!(!first.is_ascii_digit());
        }
    }

    #[test]
    fn parse_accepts_element_key() {
        assert_eq!("keni".parse::<Identity>().unwrap(), Identity::Keni);
        assert!("bob".parse::<Identity>().is_err());
    }
}
