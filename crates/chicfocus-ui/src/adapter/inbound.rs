//! 수신 이벤트 핸들러 테이블.
//!
//! 이벤트 하나당 화면 변경 하나. 참가자 이벤트는 해당 참가자 요소만 건드린다.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::protocol::ServerEvent;
use chicfocus_core::models::scoreboard::{CycleWinner, ScoreboardSnapshot};
use chicfocus_core::models::session::ZERO_CLOCK;
use chicfocus_core::models::tier::Tier;
use chicfocus_core::ports::view::View;
use tracing::{debug, info, warn};

use crate::activity_log;
use crate::elements::*;
use crate::session::{ClientSession, TimerFlags};
use crate::strings;

/// 서버 이벤트 적용
pub(crate) fn apply<V: View + ?Sized>(
    session: &mut ClientSession,
    view: &mut V,
    event: ServerEvent,
) {
    match event {
        ServerEvent::ServerConnected { status } => {
            debug!("서버 연결 확인: {status}");
        }
        ServerEvent::ChickenStarted {
            user,
            task_name,
            tier,
            ..
        } => chicken_started(session, view, user, &task_name, tier),
        ServerEvent::TimerUpdate { user, time, .. } => {
            view.set_text(&el(user, TIMER_DISPLAY), &time);
            view.set_text(&el(user, TIMER), &time);
        }
        ServerEvent::TimerPaused { user } => {
            if session.is_viewer(user) {
                view.set_text(&el(user, PAUSE_BTN), strings::RESUME_LABEL);
                session.flags_mut(user).is_paused = true;
            }
        }
        ServerEvent::TimerResumed { user } => {
            if session.is_viewer(user) {
                view.set_text(&el(user, PAUSE_BTN), strings::PAUSE_LABEL);
                session.flags_mut(user).is_paused = false;
            }
        }
        ServerEvent::TimerReset { user } => {
            finish_timer(session, view, user, strings::READY_TO_START, strings::IDLE);
        }
        ServerEvent::BreakStarted { user } => {
            if session.is_viewer(user) {
                view.set_text(&el(user, TIMER_STATUS), strings::BREAK_TIME);
                session.flags_mut(user).is_break = true;
            } else {
                view.set_text(&el(user, STATUS), strings::ON_BREAK);
            }
        }
        ServerEvent::SessionComplete { user } => {
            finish_timer(
                session,
                view,
                user,
                strings::SESSION_COMPLETED,
                strings::COMPLETED_SESSION,
            );
            if session.is_viewer(user) {
                view.alert(strings::CHICKEN_DONE);
            }
        }
        ServerEvent::FullUpdate(snapshot) => full_update(session, view, &snapshot),
        ServerEvent::CycleComplete { winner, .. } => {
            info!("사이클 종료: {winner}");
            let message = match winner {
                CycleWinner::Tie => strings::CYCLE_TIE.to_string(),
                CycleWinner::User(identity) => strings::cycle_winner(identity.as_str()),
            };
            view.alert(&message);
        }
        ServerEvent::ChaosChickenOffered { user, description } => {
            let viewer = session.is_viewer(user);
            view.set_hidden(&el(user, CHALLENGE_PANEL), false);
            view.set_text(&el(user, CHALLENGE_DESC), &description);
            view.set_disabled(&el(user, CHALLENGE_START_BTN), !viewer);
            view.set_disabled(&el(user, CHALLENGE_COMPLETE_BTN), true);
            view.set_disabled(&el(user, CHALLENGE_FAIL_BTN), true);
        }
        ServerEvent::ChaosChickenStarted { user, description } => {
            let viewer = session.is_viewer(user);
            view.set_hidden(&el(user, CHALLENGE_PANEL), false);
            view.set_text(&el(user, CHALLENGE_DESC), &description);
            view.set_disabled(&el(user, CHALLENGE_START_BTN), true);
            view.set_disabled(&el(user, CHALLENGE_COMPLETE_BTN), !viewer);
            view.set_disabled(&el(user, CHALLENGE_FAIL_BTN), !viewer);
        }
        ServerEvent::ChaosChickenCompleted {
            user,
            success,
            points_earned,
        } => {
            view.set_hidden(&el(user, CHALLENGE_PANEL), true);
            view.set_disabled(&el(user, CHALLENGE_START_BTN), true);
            view.set_disabled(&el(user, CHALLENGE_COMPLETE_BTN), true);
            view.set_disabled(&el(user, CHALLENGE_FAIL_BTN), true);
            if session.is_viewer(user) {
                if success {
                    view.notify(&strings::challenge_won(points_earned));
                } else {
                    view.notify(strings::CHALLENGE_LOST);
                }
            }
        }
        ServerEvent::Error { message } => {
            warn!("서버 에러: {message}");
            view.alert(&message);
        }
    }
}

fn chicken_started<V: View + ?Sized>(
    session: &mut ClientSession,
    view: &mut V,
    user: Identity,
    task_name: &str,
    tier: Tier,
) {
    if session.is_viewer(user) {
        view.set_text(
            &el(user, TIMER_STATUS),
            &strings::working_on(task_name, tier.number()),
        );
        view.set_disabled(&el(user, START_BTN), true);
        view.set_disabled(&el(user, PAUSE_BTN), false);
        view.set_disabled(&el(user, RESET_BTN), false);
        view.set_value(&el(user, TASK_NAME), "");
        *session.flags_mut(user) = TimerFlags::running();
    } else {
        view.set_text(
            &el(user, STATUS),
            &strings::partner_working_on(task_name, tier.number()),
        );
    }
}

/// 초기화/완료 공통: 타이머 0, 상태 문구, 본인이면 컨트롤 원복
fn finish_timer<V: View + ?Sized>(
    session: &mut ClientSession,
    view: &mut V,
    user: Identity,
    timer_status: &str,
    status: &str,
) {
    view.set_text(&el(user, TIMER_DISPLAY), ZERO_CLOCK);
    view.set_text(&el(user, TIMER), ZERO_CLOCK);
    view.set_text(&el(user, TIMER_STATUS), timer_status);
    view.set_text(&el(user, STATUS), status);

    if session.is_viewer(user) {
        view.set_disabled(&el(user, START_BTN), false);
        view.set_disabled(&el(user, PAUSE_BTN), true);
        view.set_disabled(&el(user, RESET_BTN), true);
        view.set_text(&el(user, PAUSE_BTN), strings::PAUSE_LABEL);
        session.clear_flags(user);
    }
}

fn full_update<V: View + ?Sized>(
    session: &ClientSession,
    view: &mut V,
    snapshot: &ScoreboardSnapshot,
) {
    if session.current_user().is_none() {
        debug!("사용자 미선택 - full_update 무시");
        return;
    }

    for (identity, user) in &snapshot.users {
        view.set_text(&el(*identity, POINTS), &user.current_points.to_string());
        view.set_text(&el(*identity, SESSIONS), &user.sessions_today.to_string());
    }
    view.set_text(DAYS_REMAINING, &snapshot.days_remaining.to_string());
    activity_log::render(view, snapshot);
}
