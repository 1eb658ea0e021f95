use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{
    Board, CellId, DEFAULT_IMAGE_EXT, GRID_COLS, GRID_ROWS, ROW_POINTS, audio_filename,
    image_filename,
};
use crate::document;

/// One cell as authored: newline-delimited multi-line text, not yet
/// break-converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDraft {
    pub points: i64,
    pub prompt: String,
    pub response: String,
    pub hint: String,
    pub audio: bool,
    pub image: bool,
    pub image_ext: String,
}

impl CellDraft {
    fn empty(points: i64) -> Self {
        Self {
            points,
            prompt: String::new(),
            response: String::new(),
            hint: String::new(),
            audio: false,
            image: false,
            image_ext: DEFAULT_IMAGE_EXT.to_string(),
        }
    }
}

/// Authoring status shown per cell in the editor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Empty,
    Ready,
}

/// The editor's normalized quiz data, keyed `"row-col"`: what the export
/// codec consumes and the import codec reconstructs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    pub hints_enabled: bool,
    pub categories: [String; GRID_COLS],
    cells: BTreeMap<String, CellDraft>,
}

impl QuizDraft {
    /// An empty 5x5 draft with the standard row point values.
    pub fn new(title: impl Into<String>) -> Self {
        let mut cells = BTreeMap::new();
        for r in 0..GRID_ROWS {
            for c in 0..GRID_COLS {
                let id = CellId::new(r as u8, c as u8);
                cells.insert(id.key(), CellDraft::empty(ROW_POINTS[r]));
            }
        }
        Self {
            title: title.into(),
            hints_enabled: true,
            categories: Default::default(),
            cells,
        }
    }

    pub fn cell(&self, id: CellId) -> Option<&CellDraft> {
        self.cells.get(&id.key())
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut CellDraft> {
        self.cells.get_mut(&id.key())
    }

    /// A cell counts as ready once its response is filled in.
    pub fn status(&self, id: CellId) -> CellStatus {
        match self.cell(id) {
            Some(cell) if !cell.response.trim().is_empty() => CellStatus::Ready,
            _ => CellStatus::Empty,
        }
    }

    /// The asset the player will need next to the document, shown in the
    /// editor so authors name files exactly right.
    pub fn required_audio_file(&self, id: CellId) -> String {
        audio_filename(id)
    }

    pub fn required_image_file(&self, id: CellId) -> String {
        let ext = self
            .cell(id)
            .map(|c| c.image_ext.as_str())
            .unwrap_or(DEFAULT_IMAGE_EXT);
        image_filename(id, ext)
    }

    /// Builds the playable board: text is escaped and break-converted
    /// here, after which cells are immutable except for `answered`.
    pub fn to_board(&self) -> Board {
        let mut board = Board::new(self.title.clone(), self.categories.clone());
        board.hints_enabled = self.hints_enabled;
        for (key, draft) in &self.cells {
            let Some(id) = CellId::parse_key(key) else {
                continue;
            };
            if let Some(cell) = board.cell_mut(id) {
                cell.points = draft.points;
                cell.prompt_html = document::encode_rich_text(&draft.prompt);
                cell.response_html = document::encode_rich_text(&draft.response);
                cell.hint_text = draft.hint.clone();
                cell.audio_enabled = draft.audio;
                cell.image_enabled = draft.image;
                cell.image_ext = draft.image_ext.clone();
            }
        }
        board
    }
}
