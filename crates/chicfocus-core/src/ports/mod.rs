//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 어댑터 crate가 이 trait들을 구현하며, `chicfocus-app`에서 와이어링한다.
//!
//! 네트워크 경계를 넘는 포트는 `async_trait`을 사용하고,
//! 화면 갱신처럼 즉시 완료되는 포트는 동기 trait으로 둔다.

pub mod market_api;
pub mod realtime;
pub mod view;
