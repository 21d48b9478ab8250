//! Server-rendered certification pages: `/main/certificate/*`
//!
//! Each request resolves the certification, folds the outcome into a
//! [`FetchState`], and draws whatever [`view::render`] projects from it.
//! The original page shows the modal overlay with its two stacked panels.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use lawva_core::error::FetchError;
use lawva_core::fetch::FetchState;
use lawva_core::modal::{ModalState, PanelKind};
use lawva_core::model::Party;
use lawva_core::view::{self, OriginalAction, OverlayContent, PageView, ResultView};

use crate::error::{AppError, parse_id};
use crate::state::AppState;

/// Build the `/main/certificate` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/result/{id}", get(result_page))
        .route("/original/{id}", get(original_page))
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn result_page(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let fetch_state = resolve(&state, &raw_id).await;
    let status = page_status(&fetch_state);
    (status, Html(render_result_page(&view::render(&fetch_state)))).into_response()
}

async fn original_page(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let fetch_state = resolve(&state, &raw_id).await;
    let status = page_status(&fetch_state);

    let html = match &fetch_state {
        FetchState::Loaded(cert) => {
            let mut modal = ModalState::default();
            modal.open();
            render_original_page(
                &ResultView::from_certification(cert),
                &OverlayContent::from_certification(cert),
                &modal,
            )
        }
        other => render_result_page(&view::render(other)),
    };

    (status, Html(html)).into_response()
}

/// Look up a certification and express the outcome as a settled state.
async fn resolve(state: &AppState, raw_id: &str) -> FetchState {
    let lookup = match parse_id(raw_id) {
        Ok(id) => state.repository.get(id).await.map_err(AppError::from),
        Err(err) => Err(err),
    };

    match lookup {
        Ok(cert) => FetchState::Loaded(cert),
        Err(err) => {
            tracing::warn!(id = %raw_id, status = %err.status(), "certification page lookup failed");
            FetchState::Failed(FetchError::Http {
                status: err.status().as_u16(),
            })
        }
    }
}

fn page_status(state: &FetchState) -> StatusCode {
    match state {
        FetchState::Failed(err) => err
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        FetchState::Idle | FetchState::Loading | FetchState::Loaded(_) => StatusCode::OK,
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Draw a result page for any projected view.
pub fn render_result_page(page: &PageView) -> String {
    let mut html = String::with_capacity(8192);
    html.push_str(PAGE_HEAD);
    html.push_str("<body>\n");

    match page {
        PageView::Loading => {
            html.push_str("<main class=\"center\"><p class=\"loading\">Loading…</p></main>\n");
        }
        PageView::Error { message } => {
            let _ = writeln!(
                html,
                "<main class=\"center\"><p class=\"error\">{}</p></main>",
                html_escape(message)
            );
        }
        PageView::Result(result) => push_result(&mut html, result),
    }

    html.push_str("</body></html>\n");
    html
}

fn push_result(html: &mut String, view: &ResultView) {
    let _ = writeln!(html, "<header class=\"back\">내용증명서 생성</header>");
    let _ = writeln!(html, "<main class=\"sheet\">");
    let _ = writeln!(html, "<h2 class=\"title\">{}</h2><hr/>", html_escape(&view.title));

    // 기본 정보
    let info = &view.basic_info;
    let _ = writeln!(html, "<section class=\"panel\"><h3>기본 정보</h3><div class=\"info\">");
    match &info.thumbnail_url {
        Some(url) => {
            let _ = writeln!(
                html,
                "<img class=\"thumb\" src=\"{}\" alt=\"내용증명서 미리보기\"/>",
                html_escape(url)
            );
        }
        None => html.push_str("<div class=\"thumb placeholder\"></div>\n"),
    }
    html.push_str("<div class=\"parties\">\n");
    push_party(html, "보낸 사람", &info.sender);
    push_party(html, "받는 사람", &info.receiver);
    let _ = writeln!(
        html,
        "<div class=\"party\">작성일 : {}</div>",
        html_escape(&info.created_date)
    );
    html.push_str("</div></div></section>\n");

    // 내용 요약
    let _ = writeln!(
        html,
        "<section class=\"panel\"><h3>내용 요약</h3><p class=\"summary\">{}</p>",
        html_escape(&view.summary.text)
    );
    if let Some(strategy) = &view.summary.strategy {
        let _ = writeln!(html, "<p class=\"strategy\">전략 : {}</p>", html_escape(strategy));
    }
    let _ = writeln!(
        html,
        "<p class=\"counts\">법령 {}건 · 판례 {}건</p></section>",
        view.legal_basis_count,
        view.case_basis_count
    );

    // AI 추천
    html.push_str("<section class=\"panel\"><h3>AI 추천</h3><div class=\"suggestions\">\n");
    for suggestion in view.suggestions {
        let _ = writeln!(html, "<button type=\"button\">{}</button>", suggestion.label());
    }
    html.push_str("</div></section>\n");

    let target = match &view.original {
        OriginalAction::External(url) => format!("href=\"{}\" target=\"_blank\"", html_escape(url)),
        OriginalAction::Route(path) => format!("href=\"{}\"", html_escape(path)),
    };
    let _ = writeln!(html, "<a class=\"submit\" {target}>원본보기</a>");
    html.push_str("</main>\n");
}

fn push_party(html: &mut String, heading: &str, party: &Party) {
    let _ = writeln!(
        html,
        "<div class=\"party\"><p class=\"label\">{heading}</p><p>이름 : {}</p>\
         <p>주소 : {}</p><p>상세 주소 : {}</p></div>",
        html_escape(&party.name),
        html_escape(&party.address),
        html_escape(&party.detail_address)
    );
}

/// Draw the original-document page with the modal overlay.
pub fn render_original_page(
    view: &ResultView,
    overlay: &OverlayContent,
    modal: &ModalState,
) -> String {
    let mut html = String::with_capacity(8192);
    html.push_str(PAGE_HEAD);
    html.push_str("<body>\n");

    let _ = writeln!(
        html,
        "<div class=\"backdrop\" data-open=\"{}\" data-click-outside-close=\"{}\" {}>",
        modal.is_open(),
        modal.click_outside_close(),
        if modal.is_open() { "" } else { "hidden" }
    );
    html.push_str("<div class=\"modal\">\n");
    let _ = writeln!(
        html,
        "<a class=\"dismiss\" href=\"/main/certificate/result/{}\" aria-label=\"닫기\">×</a>",
        view.id
    );
    for kind in PanelKind::ALL {
        let _ = writeln!(
            html,
            "<section class=\"overlay-panel\" data-panel=\"{}\" data-scroll=\"{}\"><h3>{}</h3>\
             <pre>{}</pre></section>",
            panel_key(kind),
            modal.panel(kind).scroll,
            kind.heading(),
            html_escape(overlay.panel(kind))
        );
    }
    html.push_str("</div></div>\n");
    html.push_str(MODAL_SCRIPT);
    html.push_str("</body></html>\n");
    html
}

fn panel_key(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Original => "original",
        PanelKind::RelatedLaw => "related-law",
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="ko"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>내용증명서</title>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,'Pretendard',sans-serif;background:#F4F4F6;color:#1C1C1E;line-height:1.5}
.center{display:flex;align-items:center;justify-content:center;min-height:100vh}
.error{color:#E5484D}
.back{text-align:center;font-weight:600;padding:20px}
.sheet{max-width:640px;margin:0 auto;background:#fff;border-radius:40px 40px 0 0;padding-bottom:40px}
.title{padding:20px;text-align:center;font-size:1.6rem;font-weight:800}
hr{border:0;border-top:1px solid #E5E5EA}
.panel{padding:28px 32px 0}
.panel h3{font-size:1.5rem;font-weight:600;margin-bottom:20px;color:#1C1C1E}
.info{display:flex;border:1px solid #E5E5EA;border-radius:20px}
.thumb{width:160px;height:220px;margin:16px;border-radius:12px;object-fit:contain}
.placeholder{background:#F2F2F7}
.parties{flex:1}
.party{padding:16px;border-bottom:1px solid #E5E5EA}
.party:last-child{border-bottom:0}
.label{font-weight:600;margin-bottom:8px}
.summary{border:1px solid #E5E5EA;border-radius:20px;padding:24px;white-space:pre-wrap}
.counts{margin-top:8px;color:#8E8E93;font-size:.9rem}
.suggestions{display:flex;gap:24px}
.suggestions button{flex:1;padding:24px 0;border-radius:20px;border:1px solid #E5E5EA;background:#fff;font-size:1.35rem;font-weight:600}
.submit{display:block;margin:56px 32px 0;padding:20px;border-radius:16px;background:#6000FF;color:#fff;text-align:center;font-size:1.8rem;font-weight:600;text-decoration:none}
.backdrop{position:fixed;inset:0;background:rgba(0,0,0,.45);display:flex;align-items:center;justify-content:center}
.backdrop[hidden]{display:none}
.modal{position:relative;background:#fff;border-radius:24px;width:min(92vw,640px);max-height:86vh;display:flex;flex-direction:column;gap:16px;padding:48px 24px 24px}
.dismiss{position:absolute;top:12px;right:20px;font-size:1.8rem;color:#8E8E93;text-decoration:none}
.overlay-panel{flex:1;min-height:0;overflow-y:auto;border:1px solid #E5E5EA;border-radius:16px;padding:16px}
.overlay-panel pre{white-space:pre-wrap;font-family:inherit}
</style></head>
"##;

/// Closes the overlay on a backdrop click when the modal allows it.
const MODAL_SCRIPT: &str = r#"<script>
document.querySelectorAll('.backdrop').forEach(function (el) {
  el.addEventListener('click', function (ev) {
    if (ev.target === el && el.dataset.clickOutsideClose === 'true') {
      el.hidden = true;
      el.dataset.open = 'false';
    }
  });
});
</script>
"#;
