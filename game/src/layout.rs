use std::time::Instant;

use runtime::debounce::Debouncer;
use runtime::fit::{Fit, FitOutcome, TextMeasurer, fit_with_scale};

use crate::board::{Board, CellId, GRID_COLS, GRID_ROWS};

// Geometry fixed by the generated document's stylesheet.
pub const VIEWPORT_PADDING: u32 = 20;
pub const FOOTER_HEIGHT: u32 = 140;
pub const GRID_BOTTOM_MARGIN: u32 = 10;
pub const GRID_GAP: u32 = 10;
pub const GRID_MAX_WIDTH: u32 = 1600;

/// Inner padding subtracted from a cell box before fitting.
pub const CELL_PADDING: u32 = 10;
/// Cap for cell text: single short strings fit far below this.
pub const CELL_FONT_CAP: u32 = 40;
/// Cap for the slide modal pane.
pub const SLIDE_FONT_CAP: u32 = 48;
pub const HEADER_MIN_ROW_HEIGHT: u32 = 60;
/// Question cells render at reduced scale during play.
pub const PLAY_QUESTION_SCALE: f32 = 0.6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub w: u32,
    pub h: u32,
}

impl Viewport {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellBox {
    pub w: u32,
    pub h: u32,
}

/// The uniform cell box for the current viewport: six rows (header plus
/// five question rows) and five columns, gaps between, the footer and
/// page padding carved off first.
pub fn grid_geometry(viewport: Viewport) -> CellBox {
    let grid_w = viewport
        .w
        .saturating_sub(VIEWPORT_PADDING * 2)
        .min(GRID_MAX_WIDTH);
    let grid_h = viewport
        .h
        .saturating_sub(VIEWPORT_PADDING + FOOTER_HEIGHT + GRID_BOTTOM_MARGIN);

    let rows = GRID_ROWS as u32 + 1;
    let cols = GRID_COLS as u32;
    CellBox {
        w: grid_w.saturating_sub((cols - 1) * GRID_GAP) / cols,
        h: grid_h.saturating_sub((rows - 1) * GRID_GAP) / rows,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    /// `max(tallest fitted header, 60)`.
    pub header_row_height: u32,
    /// Per-column header fits.
    pub headers: Vec<Fit>,
    /// Per-cell point-label fits, row-major.
    pub cells: Vec<(CellId, Fit)>,
}

/// One full board pass: headers first (their natural heights set the
/// header row height), then every question cell's point label at the
/// given play scale.
///
/// Cell labels and categories are plain text, so this pass cannot defer;
/// only slide payloads carry images.
pub fn relayout(
    measurer: &mut dyn TextMeasurer,
    board: &Board,
    viewport: Viewport,
    question_scale: f32,
) -> BoardLayout {
    let cell = grid_geometry(viewport);

    let mut headers = Vec::with_capacity(GRID_COLS);
    let mut tallest: u32 = 0;
    for col in 0..GRID_COLS {
        let text = crate::document::scaler_text(board.category(col as u8));
        let max_w = cell.w.saturating_sub(CELL_PADDING);
        // Headers size to their content: fit against the width alone,
        // then let the measured height drive the row.
        let fit = fit_with_scale(measurer, &text, max_w, u32::MAX, CELL_FONT_CAP, 1)
            .fitted()
            .unwrap_or(Fit {
                font_size: 1,
                scale: 1.0,
            });
        let (_, natural_h) = measurer.natural_size(&text, fit.font_size, max_w, u32::MAX);
        tallest = tallest.max(natural_h.ceil() as u32);
        headers.push(fit);
    }

    let scaled_w = (cell.w as f32 * question_scale) as u32;
    let scaled_h = (cell.h as f32 * question_scale) as u32;
    let max_w = scaled_w.saturating_sub(CELL_PADDING);
    let max_h = scaled_h.saturating_sub(CELL_PADDING);

    let mut cells = Vec::with_capacity(GRID_ROWS * GRID_COLS);
    for row in board.cells().chunks(GRID_COLS) {
        for c in row {
            let text = crate::document::scaler_text(&c.points.to_string());
            let fit = fit_with_scale(measurer, &text, max_w, max_h, CELL_FONT_CAP, 1)
                .fitted()
                .unwrap_or(Fit {
                    font_size: 1,
                    scale: 1.0,
                });
            cells.push((c.id, fit));
        }
    }

    BoardLayout {
        header_row_height: tallest.max(HEADER_MIN_ROW_HEIGHT),
        headers,
        cells,
    }
}

/// Fits a slide payload (prompt + response, possibly with images) into
/// the modal pane. Defers while any contained image is still loading.
pub fn fit_slide(
    measurer: &mut dyn TextMeasurer,
    payload: &str,
    pane_w: u32,
    pane_h: u32,
) -> FitOutcome {
    fit_with_scale(measurer, payload, pane_w, pane_h, SLIDE_FONT_CAP, 1)
}

/// Resize handling: resize bursts coalesce into one relayout per
/// quiescent window.
#[derive(Debug)]
pub struct LayoutController {
    debounce: Debouncer,
    viewport: Viewport,
}

impl LayoutController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            debounce: Debouncer::new(Debouncer::DEFAULT_WINDOW),
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn on_resize(&mut self, viewport: Viewport, now: Instant) {
        self.viewport = viewport;
        self.debounce.notify(now);
    }

    /// Arms an immediate-ish relayout outside of any resize burst
    /// (entering the game re-runs the pass).
    pub fn request(&mut self, now: Instant) {
        self.debounce.notify(now);
    }

    /// True once per quiescent window; the caller then runs [`relayout`].
    pub fn relayout_due(&mut self, now: Instant) -> bool {
        self.debounce.fire_due(now)
    }
}
