//! Import codec: recover the editor draft from a previously exported
//! document.
//!
//! Tolerant by design — it accepts both the editor's single-`<p>`-with-
//! `<br>` cell shape and the legacy multi-`<p>` shape, defaults the
//! hints flag on when the inline setting is absent, and skips cells with
//! out-of-range coordinates. A document with no recognizable grid at all
//! is malformed, and nothing partial is applied: the caller only ever
//! sees a fully parsed draft.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::board::{CellId, DEFAULT_IMAGE_EXT, GRID_COLS};
use crate::document::{HINTS_FLAG_NAME, unescape_html};
use crate::editor::QuizDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportError {
    Malformed,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Malformed => {
                f.write_str("Error parsing file. Ensure it is a valid HTML file.")
            }
        }
    }
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn cat_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<div[^>]*class="[^"]*cat-cell[^"]*"[^>]*>(.*?)</div>"#).unwrap()
    })
}

fn cell_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<div[^>]*class="cell-group[^"]*"[^>]*>"#).unwrap())
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(data-[a-z-]+)="([^"]*)""#).unwrap())
}

fn front_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<div[^>]*class="front answer"[^>]*>(.*?)</div>"#).unwrap()
    })
}

fn back_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<div[^>]*class="back question"[^>]*>(.*?)</div>"#).unwrap()
    })
}

fn hint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<div[^>]*class="hint-data"[^>]*>(.*?)</div>"#).unwrap())
}

fn p_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap())
}

fn br_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

/// Multi-line text recovery from a cell container, handling both cell
/// shapes the wild contains.
fn parse_complex_html(container: &str) -> String {
    let paragraphs: Vec<&str> = p_tag_re()
        .captures_iter(container)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if paragraphs.len() > 1 {
        // Legacy shape: one <p> per line.
        return paragraphs
            .iter()
            .map(|p| strip_to_text(p))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }

    // Editor shape: breaks inside a single paragraph. Closing </p> also
    // counts as a line boundary in case of odd nesting.
    let with_breaks = br_re().replace_all(container, "\n");
    let with_breaks = with_breaks.replace("</p>", "\n").replace("</P>", "\n");
    strip_to_text(&with_breaks).trim().to_string()
}

fn strip_to_text(html: &str) -> String {
    let stripped = tag_re().replace_all(html, "");
    unescape_html(stripped.trim())
}

/// Parses an exported document back into the editor draft.
pub fn import(html: &str) -> Result<QuizDraft, ImportError> {
    let mut draft = QuizDraft::new("");

    if let Some(title) = title_re()
        .captures(html)
        .and_then(|c| c.get(1).map(|m| m.as_str()))
    {
        draft.title = unescape_html(title.trim());
    }

    // Older documents predate the setting and mean "enabled".
    let flag_assignment = format!("var {HINTS_FLAG_NAME}");
    draft.hints_enabled = if html.contains(&flag_assignment) {
        !html.contains(&format!("var {HINTS_FLAG_NAME} = false"))
    } else {
        true
    };

    for (i, cap) in cat_cell_re().captures_iter(html).take(GRID_COLS).enumerate() {
        if let Some(m) = cap.get(1) {
            draft.categories[i] = strip_to_text(m.as_str());
        }
    }

    let opens: Vec<_> = cell_group_re().find_iter(html).collect();
    if opens.is_empty() {
        return Err(ImportError::Malformed);
    }

    for (i, open) in opens.iter().enumerate() {
        let body_end = opens
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(html.len());
        let body = &html[open.end()..body_end];

        let mut row_attr = None;
        let mut col_attr = None;
        let mut audio = false;
        let mut image = false;
        let mut image_ext = DEFAULT_IMAGE_EXT.to_string();
        for attr in attr_re().captures_iter(open.as_str()) {
            let value = attr.get(2).map(|m| m.as_str()).unwrap_or("");
            match attr.get(1).map(|m| m.as_str()) {
                Some("data-row") => row_attr = value.parse::<i32>().ok(),
                Some("data-col") => col_attr = value.parse::<i32>().ok(),
                Some("data-audio") => audio = value == "true",
                Some("data-image") => image = value == "true",
                Some("data-image-ext") if !value.is_empty() => {
                    image_ext = unescape_html(value);
                }
                _ => {}
            }
        }

        // data-row is 1-based on the wire.
        let (Some(row), Some(col)) = (row_attr.map(|r| r - 1), col_attr) else {
            continue;
        };
        let Some(id) = (u8::try_from(row).ok())
            .zip(u8::try_from(col).ok())
            .map(|(r, c)| CellId::new(r, c))
            .filter(|id| CellId::parse_key(&id.key()).is_some())
        else {
            continue;
        };

        let prompt = front_re()
            .captures(body)
            .and_then(|c| c.get(1).map(|m| parse_complex_html(m.as_str())))
            .unwrap_or_default();
        let response = back_re()
            .captures(body)
            .and_then(|c| c.get(1).map(|m| parse_complex_html(m.as_str())))
            .unwrap_or_default();
        let hint = hint_re()
            .captures(body)
            .and_then(|c| c.get(1).map(|m| parse_complex_html(m.as_str())))
            .unwrap_or_default();

        if let Some(cell) = draft.cell_mut(id) {
            cell.prompt = prompt;
            cell.response = response;
            cell.hint = hint;
            cell.audio = audio;
            cell.image = image;
            cell.image_ext = image_ext;
        }
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::export;

    #[test]
    fn garbage_is_rejected_whole() {
        assert_eq!(import("not html at all"), Err(ImportError::Malformed));
        assert_eq!(
            ImportError::Malformed.to_string(),
            "Error parsing file. Ensure it is a valid HTML file."
        );
    }

    #[test]
    fn missing_hints_flag_defaults_to_enabled() {
        let mut draft = QuizDraft::new("Old Quiz");
        draft.cell_mut(CellId::new(0, 0)).unwrap().response = "A".to_string();
        let html = export(&draft)
            .html
            .replace(&format!("var {HINTS_FLAG_NAME} = true;"), "");
        let imported = import(&html).unwrap();
        assert!(imported.hints_enabled);
    }

    #[test]
    fn disabled_hints_flag_imports_as_disabled() {
        let mut draft = QuizDraft::new("Quiz");
        draft.hints_enabled = false;
        let imported = import(&export(&draft).html).unwrap();
        assert!(!imported.hints_enabled);
    }

    #[test]
    fn legacy_multi_paragraph_cells_join_with_newlines() {
        let container = "<p>first line</p><p>second line</p><p>third</p>";
        assert_eq!(parse_complex_html(container), "first line\nsecond line\nthird");
    }

    #[test]
    fn editor_shape_breaks_convert_to_newlines() {
        let container = "<p>one<br>two<br/>three</p>";
        assert_eq!(parse_complex_html(container), "one\ntwo\nthree");
    }

    #[test]
    fn out_of_range_cells_are_skipped_not_fatal() {
        let mut draft = QuizDraft::new("Quiz");
        draft.cell_mut(CellId::new(0, 0)).unwrap().response = "keep".to_string();
        let html = export(&draft)
            .html
            .replace("data-row=\"5\"", "data-row=\"40\"");
        let imported = import(&html).unwrap();
        assert_eq!(imported.cell(CellId::new(0, 0)).unwrap().response, "keep");
    }

    #[test]
    fn full_round_trip_reproduces_the_draft() {
        let mut draft = QuizDraft::new("Merry Quizmas");
        draft.hints_enabled = true;
        draft.categories = [
            "MUSIC".to_string(),
            "FILM & TV".to_string(),
            "HISTORY".to_string(),
            "SCIENCE".to_string(),
            "GRAB BAG".to_string(),
        ];
        {
            let cell = draft.cell_mut(CellId::new(1, 2)).unwrap();
            cell.prompt = "Two lines\nof prompt".to_string();
            cell.response = "An \"answer\" with <angles> & ampersands".to_string();
            cell.hint = "It's obvious".to_string();
            cell.audio = true;
            cell.image = true;
            cell.image_ext = "png".to_string();
        }

        let exported = export(&draft);
        let imported = import(&exported.html).unwrap();
        assert_eq!(imported, draft);

        // export . import . export is a fixed point.
        assert_eq!(export(&imported).html, exported.html);
    }
}
