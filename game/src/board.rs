use serde::{Deserialize, Serialize};

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;
pub const ROW_POINTS: [i64; GRID_ROWS] = [100, 200, 300, 400, 500];
pub const DEFAULT_IMAGE_EXT: &str = "jpg";

/// A grid coordinate. `row`/`col` are 0-based; the wire formats that need
/// 1-based values (asset filenames, `data-row`) convert at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub row: u8,
    pub col: u8,
}

impl CellId {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// The `"row-col"` key used by the editor and import collaborators.
    pub fn key(&self) -> String {
        format!("{}-{}", self.row, self.col)
    }

    pub fn parse_key(key: &str) -> Option<Self> {
        let (row, col) = key.split_once('-')?;
        let row: u8 = row.parse().ok()?;
        let col: u8 = col.parse().ok()?;
        if (row as usize) < GRID_ROWS && (col as usize) < GRID_COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDir {
    Left,
    Right,
    Up,
    Down,
}

/// Arrow-key adjacency: left/right stay within the row, up/down keep the
/// column. The category header row is not a question row, so there is no
/// neighbor above row 0.
pub fn neighbor(id: CellId, dir: GridDir) -> Option<CellId> {
    match dir {
        GridDir::Left => (id.col > 0).then(|| CellId::new(id.row, id.col - 1)),
        GridDir::Right => {
            ((id.col as usize) + 1 < GRID_COLS).then(|| CellId::new(id.row, id.col + 1))
        }
        GridDir::Up => (id.row > 0).then(|| CellId::new(id.row - 1, id.col)),
        GridDir::Down => {
            ((id.row as usize) + 1 < GRID_ROWS).then(|| CellId::new(id.row + 1, id.col))
        }
    }
}

/// Asset filename protocol, bit-exact: the generator and the player agree
/// on these names relative to the document location.
pub fn image_filename(id: CellId, ext: &str) -> String {
    format!("Image {}-{}.{}", id.col + 1, id.row + 1, ext)
}

pub fn audio_filename(id: CellId) -> String {
    format!("Song {}-{}.mp3", id.col + 1, id.row + 1)
}

/// One playable question. Immutable after generation except `answered`,
/// which only ever transitions false -> true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub points: i64,
    pub prompt_html: String,
    pub response_html: String,
    pub hint_text: String,
    pub audio_enabled: bool,
    pub image_enabled: bool,
    pub image_ext: String,
    pub answered: bool,
}

impl Cell {
    pub fn empty(id: CellId) -> Self {
        Self {
            id,
            points: ROW_POINTS[id.row as usize],
            prompt_html: String::new(),
            response_html: String::new(),
            hint_text: String::new(),
            audio_enabled: false,
            image_enabled: false,
            image_ext: DEFAULT_IMAGE_EXT.to_string(),
            answered: false,
        }
    }

    pub fn mark_answered(&mut self) {
        self.answered = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub title: String,
    pub categories: [String; GRID_COLS],
    pub hints_enabled: bool,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(title: impl Into<String>, categories: [String; GRID_COLS]) -> Self {
        let cells = (0..GRID_ROWS)
            .flat_map(|r| (0..GRID_COLS).map(move |c| Cell::empty(CellId::new(r as u8, c as u8))))
            .collect();
        Self {
            title: title.into(),
            categories,
            hints_enabled: true,
            cells,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells
            .get(id.row as usize * GRID_COLS + id.col as usize)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells
            .get_mut(id.row as usize * GRID_COLS + id.col as usize)
    }

    pub fn category(&self, col: u8) -> &str {
        &self.categories[col as usize]
    }

    /// Focus target when entering the game: the first cell of the first
    /// question row.
    pub fn first_question_cell(&self) -> CellId {
        CellId::new(0, 0)
    }

    /// Manual-scoring fallback magnitude: the first grid cell's value.
    pub fn fallback_points(&self) -> i64 {
        self.cells.first().map(|c| c.points).unwrap_or(0)
    }

    pub fn clear_answered(&mut self) {
        for cell in &mut self.cells {
            cell.answered = false;
        }
    }
}
