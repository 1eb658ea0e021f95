use crate::board::{CellId, GridDir};
use crate::scoring::ScoreSign;
use crate::team::Roster;

/// Host-independent key vocabulary; adapters map their own key codes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Enter,
    Space,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub alt: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, alt: false }
    }

    pub fn with_alt(key: Key) -> Self {
        Self { key, alt: true }
    }
}

/// Where the press landed, resolved by the host before dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusContext {
    pub cell: Option<CellId>,
    pub cell_inert: bool,
    pub in_text_field: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    None,
    ToggleAutoplay,
    /// A team id (0-based) was armed by the digit accumulator.
    SelectTeam(usize),
    DeselectTeam,
    AdjustSelectedTeam(ScoreSign),
    CloseSlide,
    RevealSlide,
    ActivateCell(CellId),
    MoveFocus(GridDir),
}

/// Classifies key events by focus and modal state.
///
/// Priority mirrors the shipped handler: an armed team owns Escape and
/// the vertical arrows, then the open modal owns Escape/Space, then the
/// focused grid cell gets activation and traversal.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    accumulator: usize,
    selected: Option<usize>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_team(&self) -> Option<usize> {
        self.selected
    }

    /// A click anywhere outside the armed team disarms it. Returns
    /// whether a deselection happened.
    pub fn on_click_outside_team(&mut self) -> bool {
        let was = self.selected.is_some();
        self.disarm();
        was
    }

    /// Entering the menu resets the transient selection.
    pub fn deselect(&mut self) {
        self.disarm();
    }

    fn disarm(&mut self) {
        self.accumulator = 0;
        self.selected = None;
    }

    pub fn dispatch(
        &mut self,
        press: KeyPress,
        focus: FocusContext,
        modal_open: bool,
        roster: &Roster,
    ) -> Intent {
        if press.alt && matches!(press.key, Key::Char('a') | Key::Char('A')) {
            return Intent::ToggleAutoplay;
        }

        if !focus.in_text_field {
            if let Key::Digit(n) = press.key {
                return self.accumulate_digit(n, roster);
            }
        }

        if self.accumulator != 0 {
            return match press.key {
                Key::Escape => {
                    self.disarm();
                    Intent::DeselectTeam
                }
                Key::Up => Intent::AdjustSelectedTeam(ScoreSign::Plus),
                Key::Down => Intent::AdjustSelectedTeam(ScoreSign::Minus),
                _ => Intent::None,
            };
        }

        if modal_open {
            return match press.key {
                Key::Escape => Intent::CloseSlide,
                Key::Space => Intent::RevealSlide,
                _ => Intent::None,
            };
        }

        if let Some(cell) = focus.cell {
            return match press.key {
                Key::Enter | Key::Space if !focus.cell_inert => Intent::ActivateCell(cell),
                Key::Left => Intent::MoveFocus(GridDir::Left),
                Key::Right => Intent::MoveFocus(GridDir::Right),
                Key::Up => Intent::MoveFocus(GridDir::Up),
                Key::Down => Intent::MoveFocus(GridDir::Down),
                _ => Intent::None,
            };
        }

        Intent::None
    }

    /// Digits accumulate into a multi-digit team number, re-evaluated on
    /// every keystroke. A number with no matching visible team clears the
    /// accumulator (and any armed team) rather than staying on a prefix.
    fn accumulate_digit(&mut self, n: u8, roster: &Roster) -> Intent {
        self.accumulator = self.accumulator.saturating_mul(10) + n as usize;
        match roster.selectable(self.accumulator) {
            Some(id) => {
                self.selected = Some(id);
                Intent::SelectTeam(id)
            }
            None => {
                let had_selection = self.selected.is_some();
                self.disarm();
                if had_selection {
                    Intent::DeselectTeam
                } else {
                    Intent::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(count: usize) -> Roster {
        let mut roster = Roster::new();
        roster.resize(count);
        roster
    }

    fn plain(key: Key) -> KeyPress {
        KeyPress::plain(key)
    }

    #[test]
    fn digits_arm_a_team_and_vertical_arrows_score_it() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        let focus = FocusContext::default();

        assert_eq!(
            d.dispatch(plain(Key::Digit(2)), focus, false, &roster),
            Intent::SelectTeam(1)
        );
        assert_eq!(
            d.dispatch(plain(Key::Up), focus, false, &roster),
            Intent::AdjustSelectedTeam(ScoreSign::Plus)
        );
        assert_eq!(
            d.dispatch(plain(Key::Down), focus, false, &roster),
            Intent::AdjustSelectedTeam(ScoreSign::Minus)
        );
        assert_eq!(
            d.dispatch(plain(Key::Escape), focus, false, &roster),
            Intent::DeselectTeam
        );
        assert_eq!(d.selected_team(), None);
    }

    #[test]
    fn multi_digit_selection_builds_through_prefixes() {
        let roster = roster(12);
        let mut d = InputDispatcher::new();
        let focus = FocusContext::default();

        assert_eq!(
            d.dispatch(plain(Key::Digit(1)), focus, false, &roster),
            Intent::SelectTeam(0)
        );
        assert_eq!(
            d.dispatch(plain(Key::Digit(2)), focus, false, &roster),
            Intent::SelectTeam(11)
        );
    }

    #[test]
    fn a_number_with_no_team_clears_the_accumulator() {
        let roster = roster(5);
        let mut d = InputDispatcher::new();
        let focus = FocusContext::default();

        d.dispatch(plain(Key::Digit(1)), focus, false, &roster);
        // 1 -> 12: no team 12, so the whole selection drops.
        assert_eq!(
            d.dispatch(plain(Key::Digit(2)), focus, false, &roster),
            Intent::DeselectTeam
        );
        assert_eq!(d.selected_team(), None);
        // And the next digit starts fresh.
        assert_eq!(
            d.dispatch(plain(Key::Digit(3)), focus, false, &roster),
            Intent::SelectTeam(2)
        );
    }

    #[test]
    fn digits_inside_text_fields_are_left_alone() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        let focus = FocusContext {
            in_text_field: true,
            ..FocusContext::default()
        };
        assert_eq!(
            d.dispatch(plain(Key::Digit(2)), focus, false, &roster),
            Intent::None
        );
        assert_eq!(d.selected_team(), None);
    }

    #[test]
    fn armed_team_takes_priority_over_the_open_modal() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        let focus = FocusContext::default();
        d.dispatch(plain(Key::Digit(1)), focus, false, &roster);

        // Escape disarms the team; it does not close the modal.
        assert_eq!(
            d.dispatch(plain(Key::Escape), focus, true, &roster),
            Intent::DeselectTeam
        );
        // With nothing armed the modal owns Escape/Space again.
        assert_eq!(
            d.dispatch(plain(Key::Escape), focus, true, &roster),
            Intent::CloseSlide
        );
        assert_eq!(
            d.dispatch(plain(Key::Space), focus, true, &roster),
            Intent::RevealSlide
        );
    }

    #[test]
    fn focused_cells_activate_and_traverse() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        let on_cell = FocusContext {
            cell: Some(CellId::new(1, 1)),
            ..FocusContext::default()
        };

        assert_eq!(
            d.dispatch(plain(Key::Enter), on_cell, false, &roster),
            Intent::ActivateCell(CellId::new(1, 1))
        );
        assert_eq!(
            d.dispatch(plain(Key::Right), on_cell, false, &roster),
            Intent::MoveFocus(GridDir::Right)
        );

        let inert = FocusContext {
            cell_inert: true,
            ..on_cell
        };
        assert_eq!(d.dispatch(plain(Key::Space), inert, false, &roster), Intent::None);
    }

    #[test]
    fn alt_a_toggles_autoplay_from_anywhere() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        let focus = FocusContext::default();
        assert_eq!(
            d.dispatch(KeyPress::with_alt(Key::Char('a')), focus, true, &roster),
            Intent::ToggleAutoplay
        );
    }

    #[test]
    fn click_outside_the_armed_team_disarms_it() {
        let roster = roster(3);
        let mut d = InputDispatcher::new();
        d.dispatch(plain(Key::Digit(1)), FocusContext::default(), false, &roster);
        assert!(d.on_click_outside_team());
        assert!(!d.on_click_outside_team());
    }
}
