//! Projection from [`FetchState`] to a renderable page.
//!
//! Everything here is pure: the same state always yields the same
//! [`PageView`]. Drawing it (HTML, terminal) is left to the caller.

use chrono::{DateTime, NaiveDate};

use crate::fetch::FetchState;
use crate::model::{Certification, Party};
use crate::modal::PanelKind;

/// Message shown for every failed fetch. The cause is only logged.
pub const LOAD_ERROR_MESSAGE: &str = "데이터를 불러오지 못했습니다.";

/// Route of the in-app original document page.
pub const ORIGINAL_ROUTE_PREFIX: &str = "/main/certificate/original";

/// What a result page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    /// Placeholder while nothing has loaded. Never carries partial data.
    Loading,
    /// Generic failure message, without a retry affordance.
    Error { message: &'static str },
    /// A loaded certification.
    Result(ResultView),
}

/// The three informational panels plus the original-document action.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub id: i64,
    pub title: String,
    pub basic_info: BasicInfoPanel,
    pub summary: SummaryPanel,
    pub suggestions: [Suggestion; 2],
    pub legal_basis_count: usize,
    pub case_basis_count: usize,
    pub original: OriginalAction,
}

/// "기본 정보": parties and creation date.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicInfoPanel {
    pub sender: Party,
    pub receiver: Party,
    /// `YYYY-MM-DD` when the timestamp parses, otherwise as sent.
    pub created_date: String,
    pub thumbnail_url: Option<String>,
}

/// "내용 요약": the notice summary, plus the strategy note when one was generated.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPanel {
    pub text: String,
    pub strategy: Option<String>,
}

/// Static "AI 추천" affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion {
    NextStrategy,
    SimilarCases,
}

impl Suggestion {
    pub fn label(self) -> &'static str {
        match self {
            Self::NextStrategy => "다음 전략",
            Self::SimilarCases => "유사 판례",
        }
    }
}

/// Where the "원본보기" button leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalAction {
    /// Open an externally hosted document.
    External(String),
    /// Navigate to the in-app original document route.
    Route(String),
}

impl OriginalAction {
    pub fn target(&self) -> &str {
        match self {
            Self::External(url) => url,
            Self::Route(path) => path,
        }
    }
}

/// Project a fetch state onto the page.
pub fn render(state: &FetchState) -> PageView {
    match state {
        FetchState::Idle | FetchState::Loading => PageView::Loading,
        FetchState::Failed(_) => PageView::Error {
            message: LOAD_ERROR_MESSAGE,
        },
        FetchState::Loaded(cert) => PageView::Result(ResultView::from_certification(cert)),
    }
}

impl ResultView {
    pub fn from_certification(cert: &Certification) -> Self {
        let strategy = cert
            .strategy_summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(ToOwned::to_owned);

        let original = match cert.original_url.as_deref() {
            Some(url) if !url.is_empty() => OriginalAction::External(url.to_owned()),
            _ => OriginalAction::Route(format!("{ORIGINAL_ROUTE_PREFIX}/{}", cert.id)),
        };

        Self {
            id: cert.id,
            title: cert.title.clone(),
            basic_info: BasicInfoPanel {
                sender: cert.sender.clone(),
                receiver: cert.receiver.clone(),
                created_date: display_date(&cert.created_date),
                thumbnail_url: cert.thumbnail_url.clone(),
            },
            summary: SummaryPanel {
                text: cert.body.clone(),
                strategy,
            },
            suggestions: [Suggestion::NextStrategy, Suggestion::SimilarCases],
            legal_basis_count: cert.legal_basis.len(),
            case_basis_count: cert.case_basis.len(),
            original,
        }
    }
}

/// Text of the two stacked overlay panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub original: String,
    pub related_law: String,
}

impl OverlayContent {
    pub fn from_certification(cert: &Certification) -> Self {
        let original = format!(
            "{}\n\n발신인: {} ({} {})\n수신인: {} ({} {})\n\n{}",
            cert.title,
            cert.sender.name,
            cert.sender.address,
            cert.sender.detail_address,
            cert.receiver.name,
            cert.receiver.address,
            cert.receiver.detail_address,
            cert.body,
        );

        let related_law = cert
            .legal_basis
            .iter()
            .map(|basis| format!("{}\n{}\n{}", basis.law, basis.explanation, basis.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            original,
            related_law,
        }
    }

    pub fn panel(&self, kind: PanelKind) -> &str {
        match kind {
            PanelKind::Original => &self.original,
            PanelKind::RelatedLaw => &self.related_law,
        }
    }
}

fn display_date(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_owned()
}
