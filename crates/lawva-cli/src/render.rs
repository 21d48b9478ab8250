//! Terminal rendering of projected views.
//!
//! Everything returns a `String`; `main` decides where it goes.

use std::fmt::Write as _;

use lawva_core::modal::{ModalState, PanelKind};
use lawva_core::model::Party;
use lawva_core::view::{OriginalAction, OverlayContent, PageView, ResultView};

// ── ANSI color helpers ───────────────────────────────────────────────

/// Escape codes in use; all empty when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub reset: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub red: &'static str,
    pub green: &'static str,
    pub magenta: &'static str,
    pub cyan: &'static str,
}

impl Palette {
    pub const COLOR: Self = Self {
        reset: "\x1b[0m",
        bold: "\x1b[1m",
        dim: "\x1b[2m",
        red: "\x1b[31m",
        green: "\x1b[32m",
        magenta: "\x1b[35m",
        cyan: "\x1b[36m",
    };

    pub const PLAIN: Self = Self {
        reset: "",
        bold: "",
        dim: "",
        red: "",
        green: "",
        magenta: "",
        cyan: "",
    };

    pub fn new(color: bool) -> Self {
        if color { Self::COLOR } else { Self::PLAIN }
    }
}

const RULE: &str = "─────────────────────────────────────────";

/// Render a result page.
pub fn page(view: &PageView, p: Palette) -> String {
    let mut out = String::new();
    match view {
        PageView::Loading => {
            let _ = writeln!(out, "  {}Loading…{}", p.dim, p.reset);
        }
        PageView::Error { message } => {
            let _ = writeln!(out, "  {}{}✗ {message}{}", p.red, p.bold, p.reset);
        }
        PageView::Result(result) => push_result(&mut out, result, p),
    }
    out
}

fn push_result(out: &mut String, view: &ResultView, p: Palette) {
    let _ = writeln!(out, "{}{}{}{}", p.bold, p.cyan, view.title, p.reset);
    let _ = writeln!(out, "{}{RULE}{}", p.dim, p.reset);

    section(out, "기본 정보", p);
    party(out, "보낸 사람", &view.basic_info.sender, p);
    party(out, "받는 사람", &view.basic_info.receiver, p);
    kv_line(out, "작성일", &view.basic_info.created_date, p);
    if let Some(url) = &view.basic_info.thumbnail_url {
        kv_line(out, "미리보기", url, p);
    }

    section(out, "내용 요약", p);
    for line in view.summary.text.lines() {
        let _ = writeln!(out, "  {}", line.trim());
    }
    if let Some(strategy) = &view.summary.strategy {
        kv_line(out, "전략", strategy, p);
    }
    kv_line(out, "법령", &view.legal_basis_count.to_string(), p);
    kv_line(out, "판례", &view.case_basis_count.to_string(), p);

    section(out, "AI 추천", p);
    let labels: Vec<String> = view
        .suggestions
        .iter()
        .map(|s| format!("[ {} ]", s.label()))
        .collect();
    let _ = writeln!(out, "  {}", labels.join("  "));

    let _ = writeln!(out);
    let target = match &view.original {
        OriginalAction::External(url) => format!("{url} (external)"),
        OriginalAction::Route(path) => path.clone(),
    };
    let _ = writeln!(out, "{}{}원본보기{} → {target}", p.green, p.bold, p.reset);
}

/// Render the overlay's stacked panels, honoring each panel's scroll offset.
pub fn overlay(content: &OverlayContent, modal: &ModalState, p: Palette) -> String {
    let mut out = String::new();
    if !modal.is_open() {
        return out;
    }

    for kind in PanelKind::ALL {
        section(&mut out, kind.heading(), p);
        let skip = usize::try_from(modal.panel(kind).scroll).unwrap_or(usize::MAX);
        for line in content.panel(kind).lines().skip(skip) {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

fn section(out: &mut String, title: &str, p: Palette) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}{}■ {title}{}", p.bold, p.magenta, p.reset);
}

fn party(out: &mut String, heading: &str, party: &Party, p: Palette) {
    let _ = writeln!(out, "  {}{heading}{}", p.bold, p.reset);
    kv_line(out, "  이름", &party.name, p);
    kv_line(out, "  주소", &party.address, p);
    kv_line(out, "  상세 주소", &party.detail_address, p);
}

fn kv_line(out: &mut String, key: &str, value: &str, p: Palette) {
    let _ = writeln!(out, "  {}{key:<12}{} {value}", p.dim, p.reset);
}
