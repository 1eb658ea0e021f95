//! The one explicit runtime context: created at document load, torn down
//! on navigation away. Owns the board, roster, navigator, session store,
//! media controller, settings and debouncers, and holds direct references
//! (`focused_cell`, the dispatcher's armed team) instead of re-deriving
//! them from rendered markup.

use std::time::Instant;

use runtime::fit::{FitOutcome, TextMeasurer};
use runtime::store::StateStore;

use crate::board::{Board, CellId, neighbor};
use crate::document::{self, DocumentIdentity, element_id, parse_element_id};
use crate::editor::QuizDraft;
use crate::input::{FocusContext, InputDispatcher, Intent, KeyPress};
use crate::layout::{
    BoardLayout, LayoutController, PLAY_QUESTION_SCALE, Viewport, fit_slide, relayout,
};
use crate::media::MediaController;
use crate::nav::Navigator;
use crate::question::{QuestionContext, RevealOutcome};
use crate::scoring::{self, ScoreError, ScoreSign};
use crate::session::{SessionSnapshot, SessionStore};
use crate::settings::PlaySettings;
use crate::team::Roster;
use crate::view::{Page, PageEffect, ViewFlags};

pub struct PlayRuntime {
    board: Board,
    identity: DocumentIdentity,
    store: Box<dyn StateStore>,
    session: SessionStore,
    /// Loaded exactly once at boot, before the first menu render.
    restored: Option<SessionSnapshot>,
    roster: Roster,
    nav: Navigator,
    media: MediaController,
    settings: PlaySettings,
    input: InputDispatcher,
    layout: LayoutController,
    question: Option<QuestionContext>,
    focused_cell: Option<CellId>,
    first_render: bool,
    alert: Option<String>,
}

impl PlayRuntime {
    pub fn boot(
        board: Board,
        identity: DocumentIdentity,
        store: Box<dyn StateStore>,
        media: MediaController,
        viewport: Viewport,
    ) -> Self {
        let session = SessionStore::new(identity.storage_key.clone());
        let restored = session.load(&*store);
        let settings = PlaySettings::boot(board.hints_enabled, &*store);
        Self {
            board,
            identity,
            store,
            session,
            restored,
            roster: Roster::new(),
            nav: Navigator::new(),
            media,
            settings,
            input: InputDispatcher::new(),
            layout: LayoutController::new(viewport),
            question: None,
            focused_cell: None,
            first_render: true,
            alert: None,
        }
    }

    pub fn from_draft(
        draft: &QuizDraft,
        store: Box<dyn StateStore>,
        media: MediaController,
        viewport: Viewport,
    ) -> Self {
        let identity = crate::document::identity(draft);
        Self::boot(draft.to_board(), identity, store, media, viewport)
    }

    pub fn page(&self) -> Page {
        self.nav.page()
    }

    pub fn flags(&self) -> ViewFlags {
        self.nav.flags()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn question(&self) -> Option<&QuestionContext> {
        self.question.as_ref()
    }

    pub fn media(&self) -> &MediaController {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaController {
        &mut self.media
    }

    pub fn settings(&self) -> PlaySettings {
        self.settings
    }

    pub fn focused_cell(&self) -> Option<CellId> {
        self.focused_cell
    }

    pub fn selected_team(&self) -> Option<usize> {
        self.input.selected_team()
    }

    /// The blocking alert raised by the last operation, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Menu copy: "Continue" when a prior session exists (or the game has
    /// already been entered once this load), else "Start".
    pub fn menu_offers_continue(&self) -> bool {
        self.restored.is_some() || !self.first_render
    }

    /// Pre-selects the restored session's team count in the menu chooser.
    pub fn restored_team_count(&self) -> Option<usize> {
        self.restored.as_ref().map(|s| s.teams.len())
    }

    /// Menu -> Game with the confirmed team count. On the first entry a
    /// restored session seeds names, points and answered marks.
    pub fn confirm_teams(&mut self, count: usize, now: Instant) {
        if self.nav.confirm_teams() != PageEffect::SeedRoster {
            return;
        }
        self.roster.resize(count);

        if self.first_render {
            if let Some(snapshot) = self.restored.clone() {
                for (i, team) in snapshot.teams.iter().take(count).enumerate() {
                    if let Some(t) = self.roster.team_mut(i) {
                        t.name = team.name.clone();
                        t.points_text = team.points.clone();
                    }
                }
                for eid in snapshot.inerts.keys() {
                    // Ids from another document revision fail the suffix
                    // check and are skipped, like a failed lookup.
                    if let Some(id) = parse_element_id(eid) {
                        if element_id(id, self.identity.element_suffix) == *eid {
                            if let Some(cell) = self.board.cell_mut(id) {
                                cell.mark_answered();
                            }
                        }
                    }
                }
            }
        }
        self.first_render = false;
        self.focused_cell = Some(self.board.first_question_cell());
        self.layout.request(now);
    }

    /// Game -> Slide. Answered cells reopen fine (review flow); a slide
    /// already being up is a no-op.
    pub fn open_cell(&mut self, id: CellId, _now: Instant) -> bool {
        if self.board.cell(id).is_none() {
            return false;
        }
        match self.nav.open_cell(id) {
            PageEffect::AttachQuestion(id) => {
                self.attach_question(id);
                self.focused_cell = Some(id);
                true
            }
            _ => false,
        }
    }

    fn attach_question(&mut self, id: CellId) {
        let Some(cell) = self.board.cell(id) else {
            return;
        };
        let category = self.board.category(id.col);
        self.question = Some(QuestionContext::open(cell, category, self.settings.hints_enabled));
        self.media.attach(cell);
    }

    /// Slide -> Game via the close affordance; focus returns to the
    /// originating cell.
    pub fn close_slide(&mut self, _now: Instant) {
        if self.nav.dismiss_slide() == PageEffect::DetachQuestion {
            let origin = self.question.take().map(|q| q.cell);
            self.media.detach();
            if let Some(cell) = origin {
                self.focused_cell = Some(cell);
            }
        }
    }

    /// Reveal the open question's response. Idempotent; the first call
    /// permanently marks the cell answered and persists.
    pub fn reveal(&mut self, now: Instant) {
        let Some(question) = self.question.as_mut() else {
            return;
        };
        if question.reveal() == RevealOutcome::Revealed {
            let cell = question.cell;
            if let Some(cell) = self.board.cell_mut(cell) {
                cell.mark_answered();
            }
            self.request_save(now);
        }
    }

    /// One-shot hint for the open question.
    pub fn use_hint(&mut self) {
        if let Some(question) = self.question.as_mut() {
            question.use_hint();
        }
    }

    /// Applies a +/- to a team. With a question open, the cell goes
    /// inert and the hint highlight clears. A non-numeric score surfaces
    /// the blocking alert and mutates nothing.
    pub fn adjust_score(
        &mut self,
        team_id: usize,
        sign: ScoreSign,
        now: Instant,
    ) -> Result<i64, ScoreError> {
        let fallback = self.board.fallback_points();
        let Some(team) = self.roster.team_mut(team_id) else {
            return Ok(0);
        };
        match scoring::adjust(team, sign, self.question.as_ref(), fallback) {
            Ok(delta) => {
                if let Some(question) = self.question.as_mut() {
                    question.clear_highlight();
                    let cell = question.cell;
                    if let Some(cell) = self.board.cell_mut(cell) {
                        cell.mark_answered();
                    }
                }
                self.request_save(now);
                Ok(delta)
            }
            Err(err) => {
                self.alert = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Roster edits persist (debounced) like any other scoring action.
    pub fn edit_team_name(&mut self, team_id: usize, name: &str, now: Instant) {
        if let Some(team) = self.roster.team_mut(team_id) {
            team.name = name.to_string();
            self.request_save(now);
        }
    }

    pub fn edit_team_points(&mut self, team_id: usize, points_text: &str, now: Instant) {
        if let Some(team) = self.roster.team_mut(team_id) {
            team.points_text = points_text.to_string();
            self.request_save(now);
        }
    }

    /// The menu affordance from anywhere; transient selection resets.
    pub fn go_menu(&mut self, _now: Instant) {
        if self.nav.go_menu() == PageEffect::DetachQuestion {
            self.question = None;
            self.media.detach();
        }
        self.input.deselect();
    }

    /// User-confirmed reset: forgets the saved session and restores
    /// defaults for the visible roster and the board.
    pub fn reset(&mut self, _now: Instant) {
        self.session.clear(self.store.as_mut());
        self.restored = None;
        self.roster.reset_visible();
        self.board.clear_answered();
    }

    /// A host back gesture. The replayed page alone decides the visual
    /// state: question context and media are rebuilt or torn down to
    /// match, tolerant of consecutive backs.
    pub fn on_host_back(&mut self, _now: Instant) {
        let Some(page) = self.nav.back() else {
            return;
        };
        self.question = None;
        self.media.detach();
        match page {
            Page::Slide { cell } => self.attach_question(cell),
            Page::Game => {}
            Page::Menu => self.input.deselect(),
        }
    }

    pub fn on_resize(&mut self, viewport: Viewport, now: Instant) {
        self.layout.on_resize(viewport, now);
    }

    pub fn on_click_outside_team(&mut self) {
        self.input.on_click_outside_team();
    }

    /// Routes a key press and applies the resulting intent.
    pub fn handle_key(&mut self, press: KeyPress, in_text_field: bool, now: Instant) -> Intent {
        let focus = FocusContext {
            cell: match self.page() {
                Page::Game => self.focused_cell,
                _ => None,
            },
            cell_inert: self
                .focused_cell
                .and_then(|id| self.board.cell(id))
                .map(|c| c.answered)
                .unwrap_or(false),
            in_text_field,
        };
        let modal_open = self.page().is_slide();
        let intent = self.input.dispatch(press, focus, modal_open, &self.roster);

        match intent {
            Intent::ToggleAutoplay => {
                self.settings.toggle_autoplay(self.store.as_mut());
            }
            Intent::AdjustSelectedTeam(sign) => {
                if let Some(team) = self.input.selected_team() {
                    let _ = self.adjust_score(team, sign, now);
                }
            }
            Intent::CloseSlide => self.close_slide(now),
            Intent::RevealSlide => self.reveal(now),
            Intent::ActivateCell(id) => {
                self.open_cell(id, now);
            }
            Intent::MoveFocus(dir) => {
                if let Some(from) = self.focused_cell {
                    if let Some(to) = neighbor(from, dir) {
                        self.focused_cell = Some(to);
                    }
                }
            }
            Intent::SelectTeam(_) | Intent::DeselectTeam | Intent::None => {}
        }
        intent
    }

    /// Fits the open slide's payload into the modal pane. `Deferred`
    /// means an image has not reported its size yet; the host re-invokes
    /// once it has (fitting is idempotent, so a superseded retry is just
    /// redundant).
    pub fn fit_open_slide(
        &self,
        measurer: &mut dyn TextMeasurer,
        pane_w: u32,
        pane_h: u32,
    ) -> Option<FitOutcome> {
        let question = self.question.as_ref()?;
        let cell = self.board.cell(question.cell)?;
        Some(fit_slide(
            measurer,
            &document::slide_payload(cell),
            pane_w,
            pane_h,
        ))
    }

    /// The periodic tick: flushes the debounced session save, polls the
    /// media controller for end-of-track, and runs the coalesced relayout
    /// when one is due.
    pub fn tick(&mut self, measurer: &mut dyn TextMeasurer, now: Instant) -> Option<BoardLayout> {
        self.session.flush_due(self.store.as_mut(), now);
        self.media.poll_ended();
        if self.layout.relayout_due(now) {
            Some(relayout(
                measurer,
                &self.board,
                self.layout.viewport(),
                PLAY_QUESTION_SCALE,
            ))
        } else {
            None
        }
    }

    pub fn inert_element_ids(&self) -> Vec<String> {
        self.board
            .cells()
            .iter()
            .filter(|c| c.answered)
            .map(|c| element_id(c.id, self.identity.element_suffix))
            .collect()
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.roster, self.inert_element_ids())
    }

    fn request_save(&mut self, now: Instant) {
        let snapshot = self.snapshot();
        self.session.request_save(snapshot, now);
    }

    /// Teardown: anything pending is written out immediately.
    pub fn shutdown(&mut self) {
        let snapshot = self.snapshot();
        self.session.save_now(self.store.as_mut(), &snapshot);
    }
}
