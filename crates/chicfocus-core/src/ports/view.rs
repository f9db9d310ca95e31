//! 화면(View) 포트.
//!
//! 고정된 요소 id로 주소 지정되는 화면 상태를 추상화한다.
//! 구현: `chicfocus-ui::view::MemoryView`, `chicfocus-app` 터미널 뷰

/// 숨김 처리에 쓰는 클래스 이름
pub const HIDDEN_CLASS: &str = "hidden";

/// 목록 요소에 렌더링되는 한 줄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// 항목 키 (피드 id 등)
    pub key: Option<String>,
    /// 공백으로 구분된 클래스 목록
    pub class: String,
    /// 표시 텍스트
    pub text: String,
}

impl ListItem {
    /// 새 목록 항목
    pub fn new(class: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: None,
            class: class.into(),
            text: text.into(),
        }
    }

    /// 키 지정
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// 클래스 포함 여부
    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }
}

/// 요소 id 기반 화면 인터페이스
///
/// 모든 메서드는 즉시 반환되며, 존재하지 않는 id는 새 요소로 취급한다.
pub trait View: Send {
    /// 텍스트 내용 설정
    fn set_text(&mut self, id: &str, text: &str);

    /// 텍스트 내용 조회
    fn text(&self, id: &str) -> Option<String>;

    /// 입력 필드 값 설정
    fn set_value(&mut self, id: &str, value: &str);

    /// 입력 필드 값 조회
    fn value(&self, id: &str) -> Option<String>;

    /// 라디오 그룹에서 선택된 값
    fn checked(&self, group: &str) -> Option<String>;

    /// 컨트롤 비활성화 여부 설정
    fn set_disabled(&mut self, id: &str, disabled: bool);

    /// 클래스 추가
    fn add_class(&mut self, id: &str, class: &str);

    /// 클래스 제거
    fn remove_class(&mut self, id: &str, class: &str);

    /// 이미지 소스 설정
    fn set_image_src(&mut self, id: &str, src: &str);

    /// 목록 요소 전체 다시 그리기
    fn render_list(&mut self, id: &str, items: &[ListItem]);

    /// 차단형 알림 대화상자
    fn alert(&mut self, message: &str);

    /// 확인 대화상자 (확인 시 true)
    fn confirm(&mut self, message: &str) -> bool;

    /// 비차단 일시 알림 (토스트)
    fn notify(&mut self, message: &str);

    /// 요소 표시/숨김
    fn set_hidden(&mut self, id: &str, hidden: bool) {
        if hidden {
            self.add_class(id, HIDDEN_CLASS);
        } else {
            self.remove_class(id, HIDDEN_CLASS);
        }
    }
}
