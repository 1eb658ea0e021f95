//! Export codec: the quiz draft becomes a self-contained HTML document.
//!
//! Only the parts with a wire contract live here — the grid fragment with
//! its data attributes and inner nodes, the inline settings script, the
//! title, the derived storage key, and the text transforms shared with
//! the fit engine. Styling is the template's business, not ours.

use runtime::fit::BREAK_MARKER;
use runtime::store::document_key;

use crate::board::{Cell, CellId, GRID_COLS, GRID_ROWS, image_filename};
use crate::editor::QuizDraft;

pub const HINTS_FLAG_NAME: &str = "GLOBAL_HINTS_ENABLED";
pub const STORAGE_KEY_NAME: &str = "GAME_STORAGE_KEY";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Authored text -> stored cell HTML: escape, then newline -> `<br>`.
pub fn encode_rich_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Stored cell HTML -> authored text (the import direction).
pub fn decode_rich_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    // <br>, <br/>, <br /> in any case.
    while let Some(pos) = find_br(rest) {
        text.push_str(&rest[..pos]);
        text.push('\n');
        let after = &rest[pos..];
        let close = after.find('>').map(|i| i + 1).unwrap_or(after.len());
        rest = &after[close..];
    }
    text.push_str(rest);
    unescape_html(&text)
}

fn find_br(html: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    lower.find("<br")
}

/// Plain text -> measurement payload: escaped, with explicit break
/// markers the measurer understands.
pub fn scaler_text(text: &str) -> String {
    escape_html(text).replace('\n', BREAK_MARKER)
}

/// Stored cell HTML -> measurement payload.
pub fn html_to_scaler(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = find_br(rest) {
        out.push_str(&rest[..pos]);
        out.push_str(BREAK_MARKER);
        let after = &rest[pos..];
        let close = after.find('>').map(|i| i + 1).unwrap_or(after.len());
        rest = &after[close..];
    }
    out.push_str(rest);
    out
}

/// Drops leading and trailing blank lines from a measurement payload so
/// stray breaks around the authored text do not inflate the fitted box.
pub fn trim_scaler(payload: &str) -> String {
    let segments: Vec<&str> = payload.split(BREAK_MARKER).collect();
    let first = segments
        .iter()
        .position(|s| !s.trim().is_empty())
        .unwrap_or(segments.len());
    let last = segments.iter().rposition(|s| !s.trim().is_empty());
    match last {
        Some(last) => segments[first..=last].join(BREAK_MARKER).trim().to_string(),
        None => String::new(),
    }
}

/// The slide modal's measurement payload: prompt, response, and the
/// image placeholder when the cell carries one.
pub fn slide_payload(cell: &Cell) -> String {
    let mut payload = trim_scaler(&html_to_scaler(&cell.prompt_html));
    let response = trim_scaler(&html_to_scaler(&cell.response_html));
    if !response.is_empty() {
        if !payload.is_empty() {
            payload.push_str(BREAK_MARKER);
        }
        payload.push_str(&response);
    }
    if cell.image_enabled {
        if !payload.is_empty() {
            payload.push_str(BREAK_MARKER);
        }
        payload.push_str(&format!(
            "<IMG:{}>",
            image_filename(cell.id, &cell.image_ext)
        ));
    }
    payload
}

/// Fixed identifiers derived from the document content: the storage key
/// the session persists under, and the suffix baked into cell element
/// ids. Deterministic, so re-exporting the same quiz keeps saved
/// sessions valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdentity {
    pub storage_key: String,
    pub element_suffix: u16,
}

pub fn identity(draft: &QuizDraft) -> DocumentIdentity {
    let mut payload = String::new();
    for r in 0..GRID_ROWS {
        for c in 0..GRID_COLS {
            let id = CellId::new(r as u8, c as u8);
            if let Some(cell) = draft.cell(id) {
                payload.push_str(&format!(
                    "{}|{}|{}|{}|{}|{}|{}|{}\n",
                    id.key(),
                    cell.points,
                    cell.prompt,
                    cell.response,
                    cell.hint,
                    cell.audio,
                    cell.image,
                    cell.image_ext
                ));
            }
        }
    }
    let storage_key = document_key(&draft.title, &payload);
    let element_suffix = u16::from_str_radix(&storage_key["game-".len().."game-".len() + 4], 16)
        .unwrap_or(0)
        % 10_000;
    DocumentIdentity {
        storage_key,
        element_suffix,
    }
}

pub fn element_id(id: CellId, suffix: u16) -> String {
    format!("cell-{}{}-{}", id.row, id.col, suffix)
}

pub fn parse_element_id(element_id: &str) -> Option<CellId> {
    let rest = element_id.strip_prefix("cell-")?;
    let (pos, _) = rest.split_once('-')?;
    let mut chars = pos.chars();
    let row = chars.next()?.to_digit(10)? as u8;
    let col = chars.next()?.to_digit(10)? as u8;
    if chars.next().is_some() || row as usize >= GRID_ROWS || col as usize >= GRID_COLS {
        return None;
    }
    Some(CellId::new(row, col))
}

/// Exported filename: non-alphanumerics collapse to underscores,
/// lowercased.
pub fn filename_slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{slug}.html")
}

/// The per-row grid fragment contract: `data-row` is 1-based, `data-col`
/// 0-based, and each cell carries `.front.answer`, `.back.question` and
/// `.hint-data` nodes with break-converted HTML.
pub fn grid_html(draft: &QuizDraft, identity: &DocumentIdentity) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"grid-row grid-row-cats\" role=\"row\">\n");
    for category in &draft.categories {
        html.push_str(&format!(
            "<div class=\"grid-cell\"><div class=\"cell\"><div class=\"cell-inner cat-cell\" role=\"columnheader\">{}</div></div></div>\n",
            escape_html(category)
        ));
    }
    html.push_str("</div>\n");

    for r in 0..GRID_ROWS {
        let mut classes = String::from("grid-row grid-row-questions");
        if r == 0 {
            classes.push_str(" grid-first-row");
        }
        if r == GRID_ROWS - 1 {
            classes.push_str(" grid-last-row");
        }
        html.push_str(&format!("<div class=\"{classes}\" role=\"row\">\n"));

        for c in 0..GRID_COLS {
            let id = CellId::new(r as u8, c as u8);
            let Some(cell) = draft.cell(id) else {
                continue;
            };
            let category = escape_html(&draft.categories[c]);
            html.push_str(&format!(
                concat!(
                    "<div class=\"cell-group grid-cell\" role=\"cell\" id=\"{eid}\" tabindex=\"0\" ",
                    "aria-label=\"{points}\" data-row=\"{row}\" data-col=\"{col}\" ",
                    "data-audio=\"{audio}\" data-image=\"{image}\" data-image-ext=\"{ext}\">\n",
                    "<div class=\"cell points\">\n",
                    "<div class=\"cell-inner\" data-category=\"{category}\">{points}</div>\n",
                    "<div class=\"front answer\" tabindex=\"0\"><p>{prompt}</p></div>\n",
                    "<div class=\"back question\" tabindex=\"0\"><p>{response}</p></div>\n",
                    "<div class=\"hint-data\">{hint}</div>\n",
                    "</div>\n",
                    "</div>\n",
                ),
                eid = element_id(id, identity.element_suffix),
                points = cell.points,
                row = r + 1,
                col = c,
                audio = cell.audio,
                image = cell.image,
                ext = escape_html(&cell.image_ext),
                category = category,
                prompt = encode_rich_text(&cell.prompt),
                response = encode_rich_text(&cell.response),
                hint = encode_rich_text(&cell.hint),
            ));
        }
        html.push_str("</div>\n");
    }

    html
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub html: String,
    pub identity: DocumentIdentity,
}

/// Assembles the full offline document: title, the inline settings
/// script, and the grid fragment inside the gameplay shell.
pub fn export(draft: &QuizDraft) -> ExportedDocument {
    let identity = identity(draft);
    let html = format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n<head>\n<meta charset=\"utf-8\">\n",
            "<title>{title}</title>\n",
            "<script>var {hints_flag} = {hints};var {key_name} = \"{key}\";</script>\n",
            "</head>\n<body>\n",
            "<div id=\"gameplay\">\n",
            "<div class=\"grid-container\">\n",
            "<div class=\"grid grid-play\" role=\"table\" aria-label=\"Game Board\">\n",
            "{grid}",
            "</div>\n</div>\n</div>\n",
            "</body>\n</html>\n",
        ),
        title = escape_html(&draft.title),
        hints_flag = HINTS_FLAG_NAME,
        hints = draft.hints_enabled,
        key_name = STORAGE_KEY_NAME,
        key = identity.storage_key,
        grid = grid_html(draft, &identity),
    );
    ExportedDocument {
        filename: filename_slug(&draft.title),
        html,
        identity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn escape_and_unescape_are_inverse() {
        let text = "a < b & \"c\" > 'd'";
        assert_eq!(unescape_html(&escape_html(text)), text);
    }

    #[test]
    fn rich_text_round_trips_newlines() {
        let text = "first line\nsecond & third\nlast";
        let html = encode_rich_text(text);
        assert_eq!(html, "first line<br>second &amp; third<br>last");
        assert_eq!(decode_rich_text(&html), text);
    }

    #[test]
    fn decode_accepts_self_closing_and_uppercase_breaks() {
        assert_eq!(decode_rich_text("a<BR>b<br/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn trim_scaler_drops_blank_edges_only() {
        assert_eq!(trim_scaler("<BR> <BR>mid<BR>dle<BR><BR>"), "mid<BR>dle");
        assert_eq!(trim_scaler("<BR><BR>"), "");
    }

    #[test]
    fn slide_payload_combines_prompt_response_and_image() {
        let mut cell = Cell::empty(CellId::new(0, 1));
        cell.prompt_html = "Name this tune<br>".to_string();
        cell.response_html = "What is Zanarkand?".to_string();
        cell.image_enabled = true;
        cell.image_ext = "png".to_string();
        assert_eq!(
            slide_payload(&cell),
            "Name this tune<BR>What is Zanarkand?<BR><IMG:Image 2-1.png>"
        );
    }

    #[test]
    fn identity_is_stable_and_content_sensitive() {
        let draft = QuizDraft::new("Merry Quizmas");
        let a = identity(&draft);
        let b = identity(&draft);
        assert_eq!(a, b);

        let mut changed = draft.clone();
        changed.cell_mut(CellId::new(0, 0)).unwrap().prompt = "new".to_string();
        assert_ne!(identity(&changed).storage_key, a.storage_key);
    }

    #[test]
    fn element_ids_round_trip() {
        let id = CellId::new(4, 2);
        let eid = element_id(id, 1234);
        assert_eq!(eid, "cell-42-1234");
        assert_eq!(parse_element_id(&eid), Some(id));
        assert_eq!(parse_element_id("cell-99-1"), None);
        assert_eq!(parse_element_id("nope"), None);
    }

    #[test]
    fn filename_slug_flattens_and_lowercases() {
        assert_eq!(filename_slug("Merry Quizmas 2024!"), "merry_quizmas_2024_.html");
    }

    #[test]
    fn grid_html_carries_the_wire_attributes() {
        let mut draft = QuizDraft::new("Quiz");
        draft.categories[0] = "MUSIC".to_string();
        let cell = draft.cell_mut(CellId::new(0, 0)).unwrap();
        cell.prompt = "Q".to_string();
        cell.response = "A".to_string();
        cell.audio = true;

        let doc = export(&draft);
        assert!(doc.html.contains("data-row=\"1\" data-col=\"0\""));
        assert!(doc.html.contains("data-audio=\"true\""));
        assert!(doc.html.contains("data-image=\"false\""));
        assert!(doc.html.contains("class=\"front answer\""));
        assert!(doc.html.contains("class=\"back question\""));
        assert!(doc.html.contains("class=\"hint-data\""));
        assert!(doc.html.contains("var GLOBAL_HINTS_ENABLED = true"));
        assert!(doc.html.contains(&doc.identity.storage_key));
        assert_eq!(doc.filename, "quiz.html");
    }
}
