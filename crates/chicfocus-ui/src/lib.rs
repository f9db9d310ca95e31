//! # chicfocus-ui
//!
//! 실시간 UI 어댑터.
//! 서버 이벤트를 요소 id 기반 화면 상태로 옮기고, 사용자 액션을 검증한 뒤
//! 실시간 채널로 내보낸다. 마켓 뷰가 열려 있는 동안 두 개의 폴링 루프를 돌린다.
//!
//! ## 모듈
//! - `adapter`: 수신 핸들러 테이블 + 송신 액션 (`RealtimeUiAdapter`)
//! - `session`: 클라이언트 세션 상태 (현재 사용자, 타이머 플래그, 마켓 커서)
//! - `memory_view`: 메모리 기반 `View` 구현
//! - `activity_log`: 최근 활동 목록 렌더링
//! - `polling`: 세대 가드가 있는 폴링 루프
//! - `market`: 마켓 이벤트/피드 폴러
//! - `view_controller`: 뷰 열기/닫기 훅 조합
//! - `elements`, `strings`: 요소 id와 화면 문자열

pub mod activity_log;
pub mod adapter;
pub mod elements;
pub mod error;
pub mod market;
pub mod memory_view;
pub mod polling;
pub mod session;
pub mod strings;
pub mod view_controller;

pub use adapter::{RealtimeUiAdapter, SharedSession, SharedView};
pub use error::UiError;
pub use memory_view::MemoryView;
pub use session::ClientSession;
pub use view_controller::{ViewController, ViewHook};
