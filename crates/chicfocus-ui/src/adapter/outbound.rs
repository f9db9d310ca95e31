//! 사용자 액션 → 송신 이벤트.
//!
//! 모든 액션은 로컬 검증을 먼저 하고, 거부되면 알림만 띄우고 아무것도 보내지 않는다.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::protocol::ClientEvent;
use chicfocus_core::models::tier::Tier;
use chicfocus_core::ports::view::View;
use tracing::{debug, info};

use super::RealtimeUiAdapter;
use crate::elements::{el, TASK_NAME, TIER};
use crate::error::UiError;
use crate::strings;

impl<V: View> RealtimeUiAdapter<V> {
    /// 세션 시작
    ///
    /// 검증 순서: 연결 → 본인 여부 → 티어 선택 → 작업 이름
    pub async fn start_chicken(&self, user: Identity) -> Result<(), UiError> {
        let event = self.checked(self.prepare_start(user))?;
        info!("세션 시작 요청: {user}");
        self.send(event).await
    }

    /// 일시정지/재개 토글
    pub async fn toggle_pause(&self, user: Identity) -> Result<(), UiError> {
        let event = self.checked(self.require_own(user, UiError::NotOwnTimer).map(|current| {
            let flags = self.session.lock().flags(user);
            if flags.is_paused {
                ClientEvent::ResumeTimer {
                    user,
                    is_break: flags.is_break,
                    current_user: current,
                }
            } else {
                ClientEvent::PauseTimer {
                    user,
                    current_user: current,
                }
            }
        }))?;
        self.send(event).await
    }

    /// 타이머 초기화
    pub async fn reset_timer(&self, user: Identity) -> Result<(), UiError> {
        let current = self.checked(self.require_own(user, UiError::NotOwnTimer))?;
        self.send(ClientEvent::ResetTimer {
            user,
            current_user: current,
        })
        .await
    }

    /// 사이클 종료 (확인 필요)
    pub async fn end_cycle(&self) -> Result<(), UiError> {
        let confirmed = self.view.lock().confirm(strings::END_CYCLE_CONFIRM);
        if !confirmed {
            debug!("사이클 종료 취소");
            return Err(UiError::Cancelled);
        }
        self.send(ClientEvent::EndCycle).await
    }

    /// 챌린지 시작
    pub async fn start_challenge(&self, user: Identity) -> Result<(), UiError> {
        let current = self.checked(self.require_own(user, UiError::NotOwnChallenge))?;
        self.send(ClientEvent::StartChaosChicken {
            user,
            current_user: current,
        })
        .await
    }

    /// 챌린지 결과 보고
    pub async fn complete_challenge(&self, user: Identity, success: bool) -> Result<(), UiError> {
        let current = self.checked(self.require_own(user, UiError::NotOwnChallenge))?;
        self.send(ClientEvent::CompleteChaosChicken {
            user,
            current_user: current,
            success,
        })
        .await
    }

    fn prepare_start(&self, user: Identity) -> Result<ClientEvent, UiError> {
        if !self.transport.is_connected() {
            return Err(UiError::NotConnected);
        }
        let current = self.require_own(user, UiError::NotOwnIdentity)?;

        let view = self.view.lock();
        let raw_tier = view.checked(&el(user, TIER)).ok_or(UiError::MissingTier)?;
        let tier = raw_tier
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| Tier::from_number(n).ok())
            .ok_or_else(|| UiError::InvalidTier(raw_tier.clone()))?;

        let task_name = view
            .value(&el(user, TASK_NAME))
            .unwrap_or_default()
            .trim()
            .to_string();
        if task_name.is_empty() {
            return Err(UiError::MissingTaskName);
        }

        Ok(ClientEvent::StartChicken {
            user,
            task_name,
            tier,
            current_user: current,
        })
    }

    /// 본인 참가자인지 확인하고 현재 사용자 반환
    fn require_own(&self, user: Identity, not_own: UiError) -> Result<Identity, UiError> {
        match self.session.lock().current_user() {
            None => Err(UiError::NoUserSelected),
            Some(current) if current == user => Ok(current),
            Some(_) => Err(not_own),
        }
    }

    /// 검증 실패면 알림 후 그대로 반환
    fn checked<T>(&self, result: Result<T, UiError>) -> Result<T, UiError> {
        if let Err(e) = &result {
            debug!("액션 거부: {e:?}");
            self.reject(e);
        }
        result
    }

    async fn send(&self, event: ClientEvent) -> Result<(), UiError> {
        let result = self.transport.emit(&event).await.map_err(|e| match e {
            chicfocus_core::error::CoreError::NotConnected => UiError::NotConnected,
            other => UiError::Transport(other),
        });
        self.checked(result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::RecordingTransport;
    use super::*;
    use crate::memory_view::MemoryView;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn setup(user: Option<Identity>) -> (RealtimeUiAdapter<MemoryView>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let adapter = RealtimeUiAdapter::new(MemoryView::new(), transport.clone());
        if let Some(user) = user {
            adapter.select_user(user);
        }
        (adapter, transport)
    }

    fn fill_form(adapter: &RealtimeUiAdapter<MemoryView>, user: Identity, tier: &str, task: &str) {
        let view = adapter.view();
        let mut view = view.lock();
        view.set_checked(&el(user, TIER), tier);
        view.set_value(&el(user, TASK_NAME), task);
    }

    #[tokio::test]
    async fn start_sends_trimmed_task() {
        let (adapter, transport) = setup(Some(Identity::Keni));
        fill_form(&adapter, Identity::Keni, "2", "  write essay ");

        adapter.start_chicken(Identity::Keni).await.unwrap();
        assert_eq!(
            transport.sent(),
            vec![ClientEvent::StartChicken {
                user: Identity::Keni,
                task_name: "write essay".into(),
                tier: Tier::Medium,
                current_user: Identity::Keni,
            }]
        );
    }

    #[tokio::test]
    async fn start_for_partner_is_rejected_locally() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        fill_form(&adapter, Identity::Keni, "1", "math");

        let err = adapter.start_chicken(Identity::Keni).await.unwrap_err();
        assert!(matches!(err, UiError::NotOwnIdentity));
        assert!(transport.sent().is_empty());
        assert_eq!(
            adapter.view().lock().alerts(),
            ["You can only start chickens for your own user!"]
        );
    }

    #[tokio::test]
    async fn empty_task_is_rejected() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        fill_form(&adapter, Identity::Luu, "1", "   ");

        let err = adapter.start_chicken(Identity::Luu).await.unwrap_err();
        assert!(matches!(err, UiError::MissingTaskName));
        assert!(transport.sent().is_empty());
        assert_eq!(adapter.view().lock().alerts(), ["Please enter a task name!"]);
    }

    #[tokio::test]
    async fn missing_tier_checked_before_task() {
        let (adapter, transport) = setup(Some(Identity::Luu));

        let err = adapter.start_chicken(Identity::Luu).await.unwrap_err();
        assert!(matches!(err, UiError::MissingTier));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn start_requires_connection() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        fill_form(&adapter, Identity::Luu, "1", "essay");
        transport.disconnected.store(true, Ordering::Relaxed);

        let err = adapter.start_chicken(Identity::Luu).await.unwrap_err();
        assert!(matches!(err, UiError::NotConnected));
        assert_eq!(adapter.view().lock().alerts().len(), 1);
    }

    #[tokio::test]
    async fn pause_toggle_follows_flags() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        adapter.toggle_pause(Identity::Luu).await.unwrap();

        {
            let session = adapter.session();
            let mut session = session.lock();
            let flags = session.flags_mut(Identity::Luu);
            flags.is_paused = true;
            flags.is_break = true;
        }
        adapter.toggle_pause(Identity::Luu).await.unwrap();

        assert_eq!(
            transport.sent(),
            vec![
                ClientEvent::PauseTimer {
                    user: Identity::Luu,
                    current_user: Identity::Luu,
                },
                ClientEvent::ResumeTimer {
                    user: Identity::Luu,
                    is_break: true,
                    current_user: Identity::Luu,
                },
            ]
        );
    }

    #[tokio::test]
    async fn controlling_partner_timer_is_rejected() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        assert!(adapter.reset_timer(Identity::Keni).await.is_err());
        assert!(adapter.toggle_pause(Identity::Keni).await.is_err());
        assert!(transport.sent().is_empty());
        assert_eq!(adapter.view().lock().alerts().len(), 2);
    }

    #[tokio::test]
    async fn no_viewer_rejects_actions() {
        let (adapter, transport) = setup(None);
        let err = adapter.reset_timer(Identity::Luu).await.unwrap_err();
        assert!(matches!(err, UiError::NoUserSelected));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn end_cycle_requires_confirmation() {
        let (adapter, transport) = setup(Some(Identity::Luu));
        adapter.view().lock().set_confirm_answer(false);
        let err = adapter.end_cycle().await.unwrap_err();
        assert!(matches!(err, UiError::Cancelled));
        assert!(transport.sent().is_empty());
        assert!(adapter.view().lock().alerts().is_empty());

        adapter.view().lock().set_confirm_answer(true);
        adapter.end_cycle().await.unwrap();
        assert_eq!(transport.sent(), vec![ClientEvent::EndCycle]);
    }

    #[tokio::test]
    async fn challenge_actions_for_own_identity() {
        let (adapter, transport) = setup(Some(Identity::Keni));
        adapter.start_challenge(Identity::Keni).await.unwrap();
        adapter
            .complete_challenge(Identity::Keni, false)
            .await
            .unwrap();
        assert!(adapter.start_challenge(Identity::Luu).await.is_err());

        assert_eq!(
            transport.sent(),
            vec![
                ClientEvent::StartChaosChicken {
                    user: Identity::Keni,
                    current_user: Identity::Keni,
                },
                ClientEvent::CompleteChaosChicken {
                    user: Identity::Keni,
                    current_user: Identity::Keni,
                    success: false,
                },
            ]
        );
    }
}
