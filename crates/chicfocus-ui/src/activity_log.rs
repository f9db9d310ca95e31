//! 공유 활동 목록.
//!
//! 두 참가자의 세션을 최근순으로 합쳐 최대 10개를 `shared-log`에 그린다.

use chicfocus_core::models::scoreboard::ScoreboardSnapshot;
use chicfocus_core::models::session::AttributedSession;
use chicfocus_core::ports::view::{ListItem, View};
use chrono::Local;

use crate::elements::SHARED_LOG;
use crate::strings::NO_ACTIVITIES;

/// 활동 목록 최대 항목 수
pub const ACTIVITY_LOG_LIMIT: usize = 10;

/// 세션 하나를 목록 항목으로
pub fn log_item(entry: &AttributedSession) -> ListItem {
    let session = &entry.session;
    let time = session
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    ListItem::new(
        format!(
            "log-entry tier-{} {}",
            session.tier.number(),
            entry.user.element_key()
        ),
        format!(
            "{} | {} | {} | {}",
            entry.user, session.task_name, session.tier, time
        ),
    )
}

/// 활동 목록 항목 (비어 있으면 안내 문구 하나)
pub fn log_items(snapshot: &ScoreboardSnapshot) -> Vec<ListItem> {
    let items: Vec<ListItem> = snapshot
        .recent_sessions(ACTIVITY_LOG_LIMIT)
        .iter()
        .map(log_item)
        .collect();

    if items.is_empty() {
        vec![ListItem::new("empty-log", NO_ACTIVITIES)]
    } else {
        items
    }
}

/// `shared-log` 다시 그리기
pub fn render<V: View + ?Sized>(view: &mut V, snapshot: &ScoreboardSnapshot) {
    view.render_list(SHARED_LOG, &log_items(snapshot));
}
