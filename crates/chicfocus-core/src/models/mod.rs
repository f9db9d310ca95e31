//! ChicFocus 도메인 모델.
//!
//! 서버-클라이언트 간 공유하는 핵심 데이터 구조체와 실시간 이벤트를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod identity;
pub mod market;
pub mod protocol;
pub mod scoreboard;
pub mod session;
pub mod tier;
