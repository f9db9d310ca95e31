//! 메모리 기반 화면.
//!
//! 요소 상태와 대화상자 기록을 메모리에 보관한다.
//! 테스트에서 검증용으로, 터미널 뷰에서 상태 저장소로 쓴다.

use chicfocus_core::ports::view::{ListItem, View};
use std::collections::{BTreeSet, HashMap};

/// 요소 하나의 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub classes: BTreeSet<String>,
    pub image_src: Option<String>,
    pub items: Vec<ListItem>,
}

/// 메모리 기반 `View`
#[derive(Debug, Default)]
pub struct MemoryView {
    elements: HashMap<String, Element>,
    radios: HashMap<String, String>,
    alerts: Vec<String>,
    notices: Vec<String>,
    confirms: Vec<String>,
    confirm_answer: bool,
    /// 변경된 요소 id (순서대로)
    writes: Vec<String>,
}

impl MemoryView {
    /// 빈 화면 (확인 대화상자는 기본 수락)
    pub fn new() -> Self {
        Self {
            confirm_answer: true,
            ..Self::default()
        }
    }

    /// 요소 상태
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// 비활성화 여부 (없는 요소는 false)
    pub fn is_disabled(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.disabled)
    }

    /// 클래스 포함 여부
    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.classes.contains(class))
    }

    /// 목록 요소 항목
    pub fn items(&self, id: &str) -> &[ListItem] {
        self.elements.get(id).map(|e| e.items.as_slice()).unwrap_or(&[])
    }

    /// 이미지 소스
    pub fn image_src(&self, id: &str) -> Option<&str> {
        self.elements.get(id).and_then(|e| e.image_src.as_deref())
    }

    /// 라디오 그룹 선택
    pub fn set_checked(&mut self, group: &str, value: &str) {
        self.radios.insert(group.to_string(), value.to_string());
    }

    /// 라디오 그룹 선택 해제
    pub fn clear_checked(&mut self, group: &str) {
        self.radios.remove(group);
    }

    /// 다음 확인 대화상자 응답
    pub fn set_confirm_answer(&mut self, answer: bool) {
        self.confirm_answer = answer;
    }

    /// 지금까지의 알림 대화상자
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// 지금까지의 일시 알림
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// 지금까지의 확인 대화상자
    pub fn confirms(&self) -> &[String] {
        &self.confirms
    }

    /// 쌓인 알림 대화상자를 꺼낸다
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// 쌓인 일시 알림을 꺼낸다
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// 변경된 요소 id를 꺼낸다
    pub fn take_writes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.writes)
    }

    fn touch(&mut self, id: &str) -> &mut Element {
        self.writes.push(id.to_string());
        self.elements.entry(id.to_string()).or_default()
    }
}

impl View for MemoryView {
    fn set_text(&mut self, id: &str, text: &str) {
        self.touch(id).text = text.to_string();
    }

    fn text(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.text.clone())
    }

    fn set_value(&mut self, id: &str, value: &str) {
        self.touch(id).value = value.to_string();
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.value.clone())
    }

    fn checked(&self, group: &str) -> Option<String> {
        self.radios.get(group).cloned()
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) {
        self.touch(id).disabled = disabled;
    }

    fn add_class(&mut self, id: &str, class: &str) {
        self.touch(id).classes.insert(class.to_string());
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        self.touch(id).classes.remove(class);
    }

    fn set_image_src(&mut self, id: &str, src: &str) {
        self.touch(id).image_src = Some(src.to_string());
    }

    fn render_list(&mut self, id: &str, items: &[ListItem]) {
        self.touch(id).items = items.to_vec();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_answer
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
