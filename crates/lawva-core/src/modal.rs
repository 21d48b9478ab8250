//! Modal overlay state for the result page.
//!
//! One modal holds two stacked panels, the original document and the
//! related law. They share a single open flag but scroll independently.

/// Which overlay panel an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// The full text of the original notice.
    Original,
    /// Statutes cited by the notice.
    RelatedLaw,
}

impl PanelKind {
    /// Both panels, in stacking order.
    pub const ALL: [Self; 2] = [Self::Original, Self::RelatedLaw];

    /// Heading shown above the panel.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Original => "원본 보기",
            Self::RelatedLaw => "관련 법령",
        }
    }
}

/// Scroll position of one panel, in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelState {
    pub scroll: u32,
}

/// Open/closed state of the overlay and its panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    open: bool,
    click_outside_close: bool,
    original: PanelState,
    related_law: PanelState,
}

impl Default for ModalState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ModalState {
    /// A closed modal. `click_outside_close` decides whether a click on the
    /// backdrop dismisses it.
    pub fn new(click_outside_close: bool) -> Self {
        Self {
            open: false,
            click_outside_close,
            original: PanelState::default(),
            related_law: PanelState::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn click_outside_close(&self) -> bool {
        self.click_outside_close
    }

    /// Show the overlay with both panels scrolled to the top.
    pub fn open(&mut self) {
        self.open = true;
        self.original = PanelState::default();
        self.related_law = PanelState::default();
    }

    /// Close via the dismiss icon. Always closes.
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    /// Handle a click on the backdrop.
    ///
    /// Returns whether the modal closed.
    pub fn click_outside(&mut self) -> bool {
        if self.open && self.click_outside_close {
            self.open = false;
            return true;
        }
        false
    }

    /// Scroll one panel by `delta` lines, clamped at the top.
    ///
    /// Ignored while the modal is closed.
    pub fn scroll(&mut self, kind: PanelKind, delta: i32) {
        if !self.open {
            return;
        }
        let panel = self.panel_mut(kind);
        panel.scroll = panel.scroll.saturating_add_signed(delta);
    }

    pub fn panel(&self, kind: PanelKind) -> PanelState {
        match kind {
            PanelKind::Original => self.original,
            PanelKind::RelatedLaw => self.related_law,
        }
    }

    fn panel_mut(&mut self, kind: PanelKind) -> &mut PanelState {
        match kind {
            PanelKind::Original => &mut self.original,
            PanelKind::RelatedLaw => &mut self.related_law,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_and_closes_on_outside_click() {
        let mut modal = ModalState::new(true);
        assert!(!modal.is_open());

        modal.open();
        assert!(modal.is_open());

        assert!(modal.click_outside());
        assert!(!modal.is_open());
    }

    #[test]
    fn outside_click_ignored_when_disabled() {
        let mut modal = ModalState::new(false);
        modal.open();

        assert!(!modal.click_outside());
        assert!(modal.is_open());
    }

    #[test]
    fn dismiss_closes_regardless_of_outside_flag() {
        for flag in [true, false] {
            let mut modal = ModalState::new(flag);
            modal.open();
            modal.dismiss();
            assert!(!modal.is_open(), "dismiss must close with click_outside_close={flag}");
        }
    }

    #[test]
    fn panels_scroll_independently() {
        let mut modal = ModalState::default();
        modal.open();

        modal.scroll(PanelKind::Original, 12);
        modal.scroll(PanelKind::RelatedLaw, 3);
        modal.scroll(PanelKind::RelatedLaw, -10);

        assert_eq!(modal.panel(PanelKind::Original).scroll, 12);
        assert_eq!(modal.panel(PanelKind::RelatedLaw).scroll, 0);
    }

    #[test]
    fn reopening_resets_scroll() {
        let mut modal = ModalState::default();
        modal.open();
        modal.scroll(PanelKind::Original, 5);
        modal.dismiss();

        modal.scroll(PanelKind::Original, 5);
        modal.open();
        assert_eq!(modal.panel(PanelKind::Original).scroll, 0);
    }
}
