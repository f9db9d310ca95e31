//! 터미널 화면.
//!
//! [`MemoryView`]에 상태를 보관하고, 사람이 봐야 할 변화만 줄 단위로 출력한다.
//! 타이머 숫자는 매초 바뀌므로 출력하지 않고 `status` 명령으로 조회한다.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::ports::view::{ListItem, View};
use chicfocus_ui::elements::{
    el, CHALLENGE_DESC, DAYS_REMAINING, MARKET_CHART, MARKET_FEED, MARKET_POPUP, NEW_ITEM_CLASS,
    POINTS, SESSIONS, SHARED_LOG, STATUS, TASK_NAME, TIER, TIMER, TIMER_STATUS,
};
use chicfocus_ui::MemoryView;
use std::io::{self, Write};

/// 변경 시 출력할 참가자별 요소
const ECHO_SUFFIXES: [&str; 3] = [STATUS, POINTS, CHALLENGE_DESC];

/// 터미널 화면
pub struct TerminalView<W: Write + Send> {
    inner: MemoryView,
    out: W,
    pending_confirm: Option<bool>,
}

impl TerminalView<io::Stdout> {
    /// 표준 출력 화면
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: MemoryView::new(),
            out,
            pending_confirm: None,
        }
    }

    /// 보관 중인 화면 상태
    pub fn state(&self) -> &MemoryView {
        &self.inner
    }

    /// 출력 대상
    pub fn output(&self) -> &W {
        &self.out
    }

    /// 세션 시작 폼 채우기 (티어 선택 + 작업 이름)
    pub fn fill_start_form(&mut self, user: Identity, tier: &str, task: &str) {
        self.inner.set_checked(&el(user, TIER), tier);
        self.inner.set_value(&el(user, TASK_NAME), task);
    }

    /// 다음 확인 대화상자의 답
    pub fn answer_next_confirm(&mut self, answer: bool) {
        self.pending_confirm = Some(answer);
    }

    /// 한 줄 출력
    pub fn print(&mut self, line: &str) {
        // 출력 실패는 화면 상태에 영향 없음
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    /// 연결 상태 + 점수판 요약 출력
    pub fn print_status(&mut self, connection: &str) {
        let mut lines = vec![connection.to_string()];
        for user in Identity::ALL {
            let text = |suffix: &str| self.inner.text(&el(user, suffix)).unwrap_or_default();
            lines.push(format!(
                "{:<6} {:>5}  {:<28} points: {:<4} today: {}",
                user.as_str(),
                text(TIMER),
                text(TIMER_STATUS),
                text(POINTS),
                text(SESSIONS),
            ));
        }
        if let Some(days) = self.inner.text(DAYS_REMAINING) {
            lines.push(format!("days remaining: {days}"));
        }
        for line in lines {
            self.print(&line);
        }
    }

    /// 최근 활동 출력
    pub fn print_log(&mut self) {
        let lines: Vec<String> = self
            .inner
            .items(SHARED_LOG)
            .iter()
            .map(|item| format!("  {}", item.text))
            .collect();
        for line in lines {
            self.print(&line);
        }
    }

    fn echoes(id: &str) -> bool {
        id == DAYS_REMAINING
            || id == MARKET_POPUP
            || Identity::ALL
                .iter()
                .any(|user| ECHO_SUFFIXES.iter().any(|suffix| el(*user, suffix) == id))
    }
}

impl<W: Write + Send> View for TerminalView<W> {
    fn set_text(&mut self, id: &str, text: &str) {
        let changed = self.inner.text(id).as_deref() != Some(text);
        self.inner.set_text(id, text);
        if changed && !text.is_empty() && Self::echoes(id) {
            self.print(&format!("[{id}] {text}"));
        }
    }

    fn text(&self, id: &str) -> Option<String> {
        self.inner.text(id)
    }

    fn set_value(&mut self, id: &str, value: &str) {
        self.inner.set_value(id, value);
    }

    fn value(&self, id: &str) -> Option<String> {
        self.inner.value(id)
    }

    fn checked(&self, group: &str) -> Option<String> {
        self.inner.checked(group)
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) {
        self.inner.set_disabled(id, disabled);
    }

    fn add_class(&mut self, id: &str, class: &str) {
        self.inner.add_class(id, class);
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        self.inner.remove_class(id, class);
    }

    fn set_image_src(&mut self, id: &str, src: &str) {
        self.inner.set_image_src(id, src);
        if id == MARKET_CHART {
            self.print(&format!("[chart] {src}"));
        }
    }

    fn render_list(&mut self, id: &str, items: &[ListItem]) {
        self.inner.render_list(id, items);
        if id == MARKET_FEED {
            for item in items.iter().filter(|item| item.has_class(NEW_ITEM_CLASS)) {
                let line = format!("[feed] {}", item.text);
                self.print(&line);
            }
        }
    }

    fn alert(&mut self, message: &str) {
        self.inner.alert(message);
        self.print(&format!("[!] {message}"));
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.inner.confirm(message);
        self.pending_confirm.take().unwrap_or(false)
    }

    fn notify(&mut self, message: &str) {
        self.inner.notify(message);
        self.print(&format!("[i] {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(view: &TerminalView<Vec<u8>>) -> String {
        String::from_utf8_lossy(view.output()).into_owned()
    }

    #[test]
    fn status_starts_with_connection_line() {
        let mut view = TerminalView::new(Vec::new());
        view.set_text(&el(Identity::Luu, POINTS), "4");
        view.print_status("connection: Connected");

        let out = printed(&view);
        let first = out.lines().next().unwrap_or_default();
        assert_eq!(first, "connection: Connected");
        assert!(out.contains("points: 4"));
    }

    #[test]
    fn echoes_only_changed_watched_text() {
        let mut view = TerminalView::new(Vec::new());
        let status = el(Identity::Luu, STATUS);
        view.set_text(&status, "Working on: essay (Tier 2)");
        view.set_text(&status, "Working on: essay (Tier 2)");
        view.set_text(&el(Identity::Luu, TIMER), "29:59");

        let out = printed(&view);
        assert_eq!(out.matches("Working on").count(), 1);
        assert!(!out.contains("29:59"));
        assert_eq!(view.text(&el(Identity::Luu, TIMER)).as_deref(), Some("29:59"));
    }

    #[test]
    fn confirm_uses_prepared_answer_once() {
        let mut view = TerminalView::new(Vec::new());
        view.answer_next_confirm(true);
        assert!(view.confirm("sure?"));
        assert!(!view.confirm("sure?"));
        assert_eq!(view.state().confirms().len(), 2);
    }

    #[test]
    fn start_form_feeds_adapter_inputs() {
        let mut view = TerminalView::new(Vec::new());
        view.fill_start_form(Identity::Keni, "3", "deep work");
        assert_eq!(view.checked(&el(Identity::Keni, TIER)).as_deref(), Some("3"));
        assert_eq!(
            view.value(&el(Identity::Keni, TASK_NAME)).as_deref(),
            Some("deep work")
        );
    }

    #[test]
    fn new_feed_items_are_printed() {
        let mut view = TerminalView::new(Vec::new());
        view.render_list(
            MARKET_FEED,
            &[
                ListItem::new("feed-item feed-event new", "🦊 Fox Attack"),
                ListItem::new("feed-item feed-price", "old news"),
            ],
        );
        let out = printed(&view);
        assert!(out.contains("[feed] 🦊 Fox Attack"));
        assert!(!out.contains("old news"));
    }

    #[test]
    fn alerts_and_notices_are_prefixed() {
        let mut view = TerminalView::new(Vec::new());
        view.alert("Please enter a task name!");
        view.notify("Reconnecting...");
        let out = printed(&view);
        assert!(out.contains("[!] Please enter a task name!"));
        assert!(out.contains("[i] Reconnecting..."));
    }
}
