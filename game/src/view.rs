use serde::{Deserialize, Serialize};

use crate::board::CellId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Menu,
    Game,
    Slide { cell: CellId },
}

impl Default for Page {
    fn default() -> Self {
        Self::Menu
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The menu's team count was confirmed (Start/Continue).
    ConfirmTeams,
    /// A grid cell was activated.
    OpenCell(CellId),
    /// The slide modal was dismissed.
    Dismiss,
    /// The menu affordance.
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEffect {
    None,
    /// Entering the game: size/seed the roster and focus the first cell.
    SeedRoster,
    /// Entering a slide: build the question context and attach media.
    AttachQuestion(CellId),
    /// Leaving a slide: tear the question context and media down.
    DetachQuestion,
}

impl Page {
    /// Pure transition function for the page state machine.
    ///
    /// Side-effects (roster seeding, question attach/detach) are reported
    /// via `PageEffect`; history pushes/pops are the navigator's job so
    /// that host-driven replays can reuse the same table.
    pub fn handle(self, event: PageEvent) -> (Page, PageEffect) {
        match (self, event) {
            (Page::Menu, PageEvent::ConfirmTeams) => (Page::Game, PageEffect::SeedRoster),

            (Page::Game, PageEvent::OpenCell(cell)) => {
                (Page::Slide { cell }, PageEffect::AttachQuestion(cell))
            }
            (Page::Game, PageEvent::Menu) => (Page::Menu, PageEffect::None),

            (Page::Slide { .. }, PageEvent::Dismiss) => (Page::Game, PageEffect::DetachQuestion),
            (Page::Slide { .. }, PageEvent::Menu) => (Page::Menu, PageEffect::DetachQuestion),
            // A slide is modal: further activations cannot stack a second
            // question context.
            (Page::Slide { cell }, PageEvent::OpenCell(_)) => {
                (Page::Slide { cell }, PageEffect::None)
            }

            (state, _) => (state, PageEffect::None),
        }
    }

    pub fn is_slide(self) -> bool {
        matches!(self, Page::Slide { .. })
    }
}

/// Everything the host needs to show for a page, derived from the page
/// alone so history replays cannot depend on stale ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub menu_visible: bool,
    pub footer_visible: bool,
    pub modal_visible: bool,
    pub board_blurred: bool,
}

pub fn view_flags(page: Page) -> ViewFlags {
    match page {
        Page::Menu => ViewFlags {
            menu_visible: true,
            footer_visible: false,
            modal_visible: false,
            board_blurred: false,
        },
        Page::Game => ViewFlags {
            menu_visible: false,
            footer_visible: true,
            modal_visible: false,
            board_blurred: false,
        },
        Page::Slide { .. } => ViewFlags {
            menu_visible: false,
            footer_visible: true,
            modal_visible: true,
            board_blurred: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_menu() {
        assert_eq!(Page::default(), Page::Menu);
    }

    #[test]
    fn confirm_teams_enters_game_and_seeds_roster() {
        assert_eq!(
            Page::Menu.handle(PageEvent::ConfirmTeams),
            (Page::Game, PageEffect::SeedRoster)
        );
    }

    #[test]
    fn open_cell_from_game_attaches_question() {
        let cell = CellId::new(1, 2);
        assert_eq!(
            Page::Game.handle(PageEvent::OpenCell(cell)),
            (Page::Slide { cell }, PageEffect::AttachQuestion(cell))
        );
    }

    #[test]
    fn open_cell_is_ignored_while_a_slide_is_up() {
        let cell = CellId::new(1, 2);
        let page = Page::Slide { cell };
        assert_eq!(
            page.handle(PageEvent::OpenCell(CellId::new(3, 3))),
            (page, PageEffect::None)
        );
    }

    #[test]
    fn open_cell_is_unreachable_from_menu() {
        let cell = CellId::new(0, 0);
        assert_eq!(
            Page::Menu.handle(PageEvent::OpenCell(cell)),
            (Page::Menu, PageEffect::None)
        );
    }

    #[test]
    fn dismiss_returns_to_game_and_detaches() {
        let page = Page::Slide {
            cell: CellId::new(0, 0),
        };
        assert_eq!(
            page.handle(PageEvent::Dismiss),
            (Page::Game, PageEffect::DetachQuestion)
        );
    }

    #[test]
    fn menu_is_reachable_from_game_and_slide() {
        assert_eq!(
            Page::Game.handle(PageEvent::Menu),
            (Page::Menu, PageEffect::None)
        );
        let slide = Page::Slide {
            cell: CellId::new(2, 0),
        };
        assert_eq!(
            slide.handle(PageEvent::Menu),
            (Page::Menu, PageEffect::DetachQuestion)
        );
    }

    #[test]
    fn view_flags_derive_from_the_page_alone() {
        assert!(view_flags(Page::Menu).menu_visible);
        assert!(!view_flags(Page::Menu).footer_visible);

        let game = view_flags(Page::Game);
        assert!(game.footer_visible && !game.modal_visible && !game.board_blurred);

        let slide = view_flags(Page::Slide {
            cell: CellId::new(0, 0),
        });
        assert!(slide.modal_visible && slide.board_blurred && slide.footer_visible);
    }
}
