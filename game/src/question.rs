use crate::board::{Cell, CellId};

pub const HINT_USED_SUFFIX: &str = " (Hint Used)";

/// Reveal sub-state of an open slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    PromptShown,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// First reveal: the caller marks the cell answered and persists.
    Revealed,
    /// Repeated activation; nothing further changes.
    AlreadyRevealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintOutcome {
    /// The hint was consumed; the slide title now shows `display_points`.
    Applied { display_points: i64 },
    /// Already used, already revealed, disabled, or no hint text.
    Unavailable,
}

/// The ephemeral context of the one open question. Created when a slide
/// opens, destroyed when it closes; `hint_used` only ever goes false ->
/// true within that lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContext {
    pub cell: CellId,
    pub base_points: i64,
    pub category: String,
    hint_text: String,
    hints_enabled: bool,
    reveal: RevealState,
    hint_used: bool,
    title_highlighted: bool,
}

impl QuestionContext {
    pub fn open(cell: &Cell, category: &str, hints_enabled: bool) -> Self {
        Self {
            cell: cell.id,
            base_points: cell.points,
            category: category.to_string(),
            hint_text: cell.hint_text.clone(),
            hints_enabled,
            reveal: RevealState::default(),
            hint_used: false,
            title_highlighted: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.reveal == RevealState::Revealed
    }

    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    /// The modal header: category and the points currently at stake.
    pub fn title(&self) -> String {
        if self.hint_used {
            format!(
                "{} - {}{}",
                self.category,
                self.base_points / 2,
                HINT_USED_SUFFIX
            )
        } else {
            format!("{} - {}", self.category, self.base_points)
        }
    }

    /// Whether the hint control is offered right now. Revealing hides it
    /// (the full response is already on screen), as does consuming it.
    pub fn hint_offered(&self) -> bool {
        self.hints_enabled
            && !self.hint_text.trim().is_empty()
            && !self.hint_used
            && !self.is_revealed()
    }

    /// The hint text to display, once consumed or once revealed.
    pub fn visible_hint_text(&self) -> Option<&str> {
        if self.hints_enabled
            && !self.hint_text.trim().is_empty()
            && (self.hint_used || self.is_revealed())
        {
            Some(self.hint_text.as_str())
        } else {
            None
        }
    }

    /// Idempotent: the second and later calls change nothing. The first
    /// call is what permanently marks the underlying cell answered (done
    /// by the caller, which owns the board).
    pub fn reveal(&mut self) -> RevealOutcome {
        if self.is_revealed() {
            return RevealOutcome::AlreadyRevealed;
        }
        self.reveal = RevealState::Revealed;
        RevealOutcome::Revealed
    }

    /// One-shot per open question: halves the points at stake (floor) and
    /// highlights the title. Repeat attempts do not re-halve or re-append
    /// the annotation.
    pub fn use_hint(&mut self) -> HintOutcome {
        if !self.hint_offered() {
            return HintOutcome::Unavailable;
        }
        self.hint_used = true;
        self.title_highlighted = true;
        HintOutcome::Applied {
            display_points: self.base_points / 2,
        }
    }

    /// The magnitude a scoring action applies while this question is open.
    pub fn scoring_value(&self) -> i64 {
        if self.hint_used {
            self.base_points / 2
        } else {
            self.base_points
        }
    }

    pub fn title_highlighted(&self) -> bool {
        self.title_highlighted
    }

    /// Scoring clears the hint highlight from the title.
    pub fn clear_highlight(&mut self) {
        self.title_highlighted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CellId;

    fn cell_with_hint(points: i64, hint: &str) -> Cell {
        let mut cell = Cell::empty(CellId::new(3, 0));
        cell.points = points;
        cell.hint_text = hint.to_string();
        cell
    }

    #[test]
    fn reveal_is_idempotent() {
        let cell = cell_with_hint(400, "a hint");
        let mut q = QuestionContext::open(&cell, "HISTORY", true);
        assert_eq!(q.reveal(), RevealOutcome::Revealed);
        let after_first = q.clone();
        assert_eq!(q.reveal(), RevealOutcome::AlreadyRevealed);
        assert_eq!(q, after_first);
    }

    #[test]
    fn hint_is_one_shot_and_halves_with_floor() {
        let cell = cell_with_hint(500, "a hint");
        let mut q = QuestionContext::open(&cell, "MUSIC", true);
        assert_eq!(q.title(), "MUSIC - 500");

        assert_eq!(q.use_hint(), HintOutcome::Applied { display_points: 250 });
        assert_eq!(q.title(), "MUSIC - 250 (Hint Used)");
        assert_eq!(q.scoring_value(), 250);
        assert!(q.title_highlighted());

        // Second activation: no re-halving, no duplicate annotation.
        assert_eq!(q.use_hint(), HintOutcome::Unavailable);
        assert_eq!(q.title(), "MUSIC - 250 (Hint Used)");
        assert_eq!(q.scoring_value(), 250);
    }

    #[test]
    fn odd_points_floor_when_halved() {
        let cell = cell_with_hint(300, "hm");
        let mut q = QuestionContext::open(&cell, "X", true);
        q.use_hint();
        assert_eq!(q.scoring_value(), 150);

        let cell = cell_with_hint(25, "hm");
        let mut q = QuestionContext::open(&cell, "X", true);
        q.use_hint();
        assert_eq!(q.scoring_value(), 12);
    }

    #[test]
    fn reveal_disables_further_hint_activation() {
        let cell = cell_with_hint(400, "a hint");
        let mut q = QuestionContext::open(&cell, "X", true);
        q.reveal();
        assert!(!q.hint_offered());
        assert_eq!(q.use_hint(), HintOutcome::Unavailable);
        // Revealing shows the hint text but charges no penalty.
        assert_eq!(q.visible_hint_text(), Some("a hint"));
        assert_eq!(q.scoring_value(), 400);
    }

    #[test]
    fn hints_disabled_globally_or_empty_offer_nothing() {
        let cell = cell_with_hint(400, "a hint");
        let mut q = QuestionContext::open(&cell, "X", false);
        assert!(!q.hint_offered());
        assert_eq!(q.use_hint(), HintOutcome::Unavailable);
        q.reveal();
        assert_eq!(q.visible_hint_text(), None);

        let blank = cell_with_hint(400, "   ");
        let q = QuestionContext::open(&blank, "X", true);
        assert!(!q.hint_offered());
    }

    #[test]
    fn scoring_clears_the_title_highlight() {
        let cell = cell_with_hint(400, "a hint");
        let mut q = QuestionContext::open(&cell, "X", true);
        q.use_hint();
        assert!(q.title_highlighted());
        q.clear_highlight();
        assert!(!q.title_highlighted());
        // The annotation itself stays; only the highlight clears.
        assert_eq!(q.title(), "X - 200 (Hint Used)");
    }
}
