use runtime::HistoryStack;

use crate::board::CellId;
use crate::view::{Page, PageEffect, PageEvent, ViewFlags, view_flags};

/// Page navigation synchronized with an explicit history stack.
///
/// Forward transitions push the new page; dismissing a slide pops; the
/// menu affordance unwinds to the root so a later host "forward" replays
/// a consistent sequence. The stack can only ever look like
/// `[Menu]`, `[Menu, Game]` or `[Menu, Game, Slide]`.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: HistoryStack<Page>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            history: HistoryStack::new(Page::Menu),
        }
    }

    pub fn page(&self) -> Page {
        *self.history.current()
    }

    pub fn flags(&self) -> ViewFlags {
        view_flags(self.page())
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn depth(&self) -> usize {
        self.history.depth()
    }

    fn apply_forward(&mut self, event: PageEvent) -> PageEffect {
        let current = self.page();
        let (next, effect) = current.handle(event);
        if next != current {
            self.history.push(next);
        }
        effect
    }

    /// Menu -> Game on a confirmed team count.
    pub fn confirm_teams(&mut self) -> PageEffect {
        self.apply_forward(PageEvent::ConfirmTeams)
    }

    /// Game -> Slide. Returns `PageEffect::None` (and pushes nothing) when
    /// a slide is already up: rapid double-activation cannot stack a
    /// second question context.
    pub fn open_cell(&mut self, cell: CellId) -> PageEffect {
        self.apply_forward(PageEvent::OpenCell(cell))
    }

    /// Slide -> Game via the explicit close affordance. Pops the slide
    /// entry so host history stays in step.
    pub fn dismiss_slide(&mut self) -> PageEffect {
        if !self.page().is_slide() {
            return PageEffect::None;
        }
        self.history.pop();
        PageEffect::DetachQuestion
    }

    /// The menu affordance: unwinds one or two entries depending on depth
    /// so the root menu entry becomes current again.
    pub fn go_menu(&mut self) -> PageEffect {
        match self.page() {
            Page::Menu => PageEffect::None,
            Page::Game => {
                self.history.unwind(1);
                PageEffect::None
            }
            Page::Slide { .. } => {
                self.history.unwind(2);
                PageEffect::DetachQuestion
            }
        }
    }

    /// A host back gesture: pops one entry and returns the page to
    /// replay, or `None` at the root. The caller must re-derive all
    /// visual state (and question attachment) from the returned page
    /// alone — nothing else survives consecutive backs.
    pub fn back(&mut self) -> Option<Page> {
        self.history.pop().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_grow_the_stack() {
        let mut nav = Navigator::new();
        assert_eq!(nav.depth(), 1);

        nav.confirm_teams();
        assert_eq!(nav.page(), Page::Game);
        assert_eq!(nav.depth(), 2);

        let cell = CellId::new(2, 1);
        let effect = nav.open_cell(cell);
        assert_eq!(effect, PageEffect::AttachQuestion(cell));
        assert_eq!(nav.page(), Page::Slide { cell });
        assert_eq!(nav.depth(), 3);
    }

    #[test]
    fn double_activation_does_not_stack_slides() {
        let mut nav = Navigator::new();
        nav.confirm_teams();
        let cell = CellId::new(0, 0);
        nav.open_cell(cell);
        assert_eq!(nav.open_cell(cell), PageEffect::None);
        assert_eq!(nav.open_cell(CellId::new(1, 1)), PageEffect::None);
        assert_eq!(nav.depth(), 3);
        assert_eq!(nav.page(), Page::Slide { cell });
    }

    #[test]
    fn dismiss_pops_back_to_game() {
        let mut nav = Navigator::new();
        nav.confirm_teams();
        nav.open_cell(CellId::new(0, 0));

        assert_eq!(nav.dismiss_slide(), PageEffect::DetachQuestion);
        assert_eq!(nav.page(), Page::Game);
        assert_eq!(nav.depth(), 2);

        // Not a slide anymore: nothing to dismiss.
        assert_eq!(nav.dismiss_slide(), PageEffect::None);
        assert_eq!(nav.depth(), 2);
    }

    #[test]
    fn menu_unwinds_one_entry_from_game_and_two_from_slide() {
        let mut nav = Navigator::new();
        nav.confirm_teams();
        nav.go_menu();
        assert_eq!(nav.page(), Page::Menu);
        assert_eq!(nav.depth(), 1);

        nav.confirm_teams();
        nav.open_cell(CellId::new(3, 3));
        assert_eq!(nav.go_menu(), PageEffect::DetachQuestion);
        assert_eq!(nav.page(), Page::Menu);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn consecutive_backs_replay_each_state_then_stop_at_root() {
        let mut nav = Navigator::new();
        nav.confirm_teams();
        let cell = CellId::new(4, 0);
        nav.open_cell(cell);

        assert_eq!(nav.back(), Some(Page::Game));
        assert_eq!(nav.back(), Some(Page::Menu));
        assert_eq!(nav.back(), None);
        assert_eq!(nav.page(), Page::Menu);
    }
}
