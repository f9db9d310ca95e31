//! # chicfocus-storage
//!
//! 로컬 저장소 어댑터.
//! 참가자별 완료 세션, 챌린지 보너스, 사이클 시작 시각과 직전 승자를
//! JSON 파일 하나에 저장한다. 모든 변경은 즉시 파일에 기록된다.
//!
//! ## 모듈
//! - `cycle`: 사이클 데이터 모델과 점수판 스냅샷 변환
//! - `store`: 파일 기반 저장소 (`CycleStore`)
//! - `error`: 저장소 에러

pub mod cycle;
pub mod error;
pub mod store;

pub use cycle::{CycleData, UserRecord};
pub use error::StoreError;
pub use store::CycleStore;
