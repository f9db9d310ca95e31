//! 세션 점수 계산 규칙.
//!
//! 완료된 세션마다 티어 기본 점수에 보너스/페널티를 더한다.
//! - 반복 페널티: 직전 두 세션과 같은 작업 → −1
//! - 전환 보너스: 최근 세 세션에 서로 다른 작업이 섞임 → +2
//! - 보스 연속: 티어 3 세션이 3회 이상 연속 → +3
//!
//! 세션 점수는 0 미만이 되지 않는다.

use crate::models::session::FocusSession;
use crate::models::tier::Tier;

/// 반복 페널티
const REPEAT_PENALTY: i64 = 1;

/// 작업 전환 보너스
const SWITCH_BONUS: i64 = 2;

/// 티어 3 연속 보너스
const BOSS_STREAK_BONUS: i64 = 3;

/// 보스 연속 인정 길이
const BOSS_STREAK_LEN: usize = 3;

/// `sessions[index]` 세션의 점수
///
/// 미완료 세션은 0점.
pub fn session_points(sessions: &[FocusSession], index: usize) -> i64 {
    let Some(session) = sessions.get(index) else {
        return 0;
    };
    if !session.completed {
        return 0;
    }

    let mut points = session.tier.points();

    if index >= 2 {
        let window = &sessions[index - 2..=index];
        let all_same = window.iter().all(|s| s.task_name == session.task_name);
        if all_same {
            points -= REPEAT_PENALTY;
        } else {
            points += SWITCH_BONUS;
        }

        if session.tier == Tier::Heavy {
            let streak = sessions[..=index]
                .iter()
                .rev()
                .take_while(|s| s.tier == Tier::Heavy)
                .count();
            if streak >= BOSS_STREAK_LEN {
                points += BOSS_STREAK_BONUS;
            }
        }
    }

    points.max(0)
}

/// 세션 목록 전체 점수 (완료 세션만 합산)
pub fn total_points(sessions: &[FocusSession]) -> i64 {
    (0..sessions.len())
        .map(|index| session_points(sessions, index))
        .sum()
}
