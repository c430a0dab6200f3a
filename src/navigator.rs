use tracing::debug;

use crate::guard::{DirtyGuard, LeaveDecision, LeavePrompt};
use crate::models::View;

/// Widths below this collapse the layout to the overlay side panel.
pub const NARROW_VIEWPORT_PX: u32 = 920;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Narrow,
    Wide,
}

impl Viewport {
    pub fn from_width(width: u32) -> Self {
        if width <= NARROW_VIEWPORT_PX {
            Viewport::Narrow
        } else {
            Viewport::Wide
        }
    }
}

/// `open` is the overlay panel on narrow screens, `collapsed` the docked
/// panel on wide ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SidePanel {
    pub open: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNavigator {
    current: View,
    history: Vec<View>,
    viewport: Viewport,
    panel: SidePanel,
}

impl ViewNavigator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            current: View::Home,
            history: Vec::new(),
            viewport,
            panel: SidePanel::default(),
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// The navigation control drawn as active.
    pub fn active_nav(&self) -> View {
        self.current
    }

    pub fn breadcrumb(&self) -> &'static str {
        self.current.label()
    }

    #[cfg(test)]
    pub fn history(&self) -> &[View] {
        &self.history
    }

    pub fn stack_top(&self) -> Option<View> {
        self.history.last().copied()
    }

    pub fn panel(&self) -> SidePanel {
        self.panel
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Forward navigation. A cancelled leave prompt aborts with no change.
    pub fn navigate(
        &mut self,
        target: View,
        guard: &mut DirtyGuard,
        prompt: &mut dyn LeavePrompt,
    ) -> LeaveDecision {
        if guard.confirm_leave(prompt).is_cancel() {
            return LeaveDecision::Cancel;
        }

        if self.current != target {
            self.history.push(self.current);
        }
        self.show(target);
        LeaveDecision::Proceed
    }

    /// Pops the history; an empty history lands on home. Never pushes.
    pub fn go_back(&mut self, guard: &mut DirtyGuard, prompt: &mut dyn LeavePrompt) -> LeaveDecision {
        if guard.confirm_leave(prompt).is_cancel() {
            return LeaveDecision::Cancel;
        }

        let target = self.history.pop().unwrap_or(View::Home);
        self.show(target);
        LeaveDecision::Proceed
    }

    fn show(&mut self, view: View) {
        debug!(from = %self.current, to = %view, depth = self.history.len(), "show view");
        self.current = view;
        if self.viewport == Viewport::Narrow {
            self.panel.open = false;
        }
    }

    pub fn toggle_panel(&mut self) {
        match self.viewport {
            Viewport::Narrow => self.panel.open = !self.panel.open,
            Viewport::Wide => self.panel.collapsed = !self.panel.collapsed,
        }
    }

    pub fn resize(&mut self, width: u32) {
        self.viewport = Viewport::from_width(width);
        if self.viewport == Viewport::Wide {
            self.panel.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::ScriptedPrompt;

    fn wide() -> ViewNavigator {
        ViewNavigator::new(Viewport::Wide)
    }

    #[test]
    fn starts_home_with_empty_history() {
        let nav = wide();
        assert_eq!(nav.current(), View::Home);
        assert_eq!(nav.breadcrumb(), "Home");
        assert!(nav.history().is_empty());
    }

    #[test]
    fn forward_then_back_retraces_steps() {
        let mut nav = wide();
        let mut guard = DirtyGuard::new();
        let mut prompt = ScriptedPrompt::default();

        nav.navigate(View::Notes, &mut guard, &mut prompt);
        nav.navigate(View::Calendar, &mut guard, &mut prompt);
        assert_eq!(nav.history(), &[View::Home, View::Notes]);
        assert_eq!(nav.active_nav(), View::Calendar);

        nav.go_back(&mut guard, &mut prompt);
        assert_eq!(nav.current(), View::Notes);
        nav.go_back(&mut guard, &mut prompt);
        assert_eq!(nav.current(), View::Home);
        nav.go_back(&mut guard, &mut prompt);
        assert_eq!(nav.current(), View::Home);
        assert!(nav.history().is_empty());
    }

    #[test]
    fn navigating_to_current_view_keeps_history() {
        let mut nav = wide();
        let mut guard = DirtyGuard::new();
        let mut prompt = ScriptedPrompt::default();
        nav.navigate(View::MyGroup, &mut guard, &mut prompt);
        let history = nav.history().to_vec();

        nav.navigate(View::MyGroup, &mut guard, &mut prompt);
        assert_eq!(nav.history(), history.as_slice());
        assert!(prompt.questions.is_empty());
    }

    #[test]
    fn navigating_to_current_view_still_clears_dirty_after_prompt() {
        let mut nav = wide();
        let mut guard = DirtyGuard::new();
        guard.enter();
        guard.mark_dirty();
        let mut prompt = ScriptedPrompt::answering(&[true]);

        nav.navigate(View::Home, &mut guard, &mut prompt);
        assert!(!guard.is_dirty());
        assert!(nav.history().is_empty());
    }

    #[test]
    fn stack_top_never_matches_current_view() {
        let mut nav = wide();
        let mut guard = DirtyGuard::new();
        let mut prompt = ScriptedPrompt::default();
        let script = [
            Some(View::Notes),
            Some(View::Home),
            Some(View::Notes),
            None,
            Some(View::Calendar),
            Some(View::Calendar),
            Some(View::Materials),
            None,
            None,
            Some(View::Announcements),
            Some(View::Home),
            None,
            None,
            None,
            None,
        ];

        for step in script {
            match step {
                Some(view) => {
                    nav.navigate(view, &mut guard, &mut prompt);
                    assert_eq!(nav.current(), view);
                }
                None => {
                    nav.go_back(&mut guard, &mut prompt);
                }
            }
            assert_ne!(nav.stack_top(), Some(nav.current()));
        }
    }

    #[test]
    fn cancelled_prompt_blocks_navigation() {
        let mut nav = wide();
        let mut guard = DirtyGuard::new();
        let mut prompt = ScriptedPrompt::default();
        nav.navigate(View::Notes, &mut guard, &mut prompt);

        guard.enter();
        guard.mark_dirty();
        let before = (nav.clone(), guard.clone());
        let mut refusing = ScriptedPrompt::answering(&[false, false]);

        assert_eq!(
            nav.navigate(View::Calendar, &mut guard, &mut refusing),
            LeaveDecision::Cancel
        );
        assert_eq!(nav.go_back(&mut guard, &mut refusing), LeaveDecision::Cancel);
        assert_eq!((nav, guard), before);
    }

    #[test]
    fn narrow_viewport_closes_panel_on_navigation() {
        let mut nav = ViewNavigator::new(Viewport::from_width(600));
        let mut guard = DirtyGuard::new();
        let mut prompt = ScriptedPrompt::default();

        nav.toggle_panel();
        assert!(nav.panel().open);
        nav.navigate(View::Materials, &mut guard, &mut prompt);
        assert!(!nav.panel().open);
    }

    #[test]
    fn wide_viewport_collapses_and_resize_closes_overlay() {
        let mut nav = ViewNavigator::new(Viewport::from_width(600));
        nav.toggle_panel();
        nav.resize(1280);
        assert_eq!(nav.viewport(), Viewport::Wide);
        assert!(!nav.panel().open);

        nav.toggle_panel();
        assert!(nav.panel().collapsed);
    }
}
