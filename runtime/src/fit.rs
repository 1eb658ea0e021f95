//! Content-fit: find the largest font size at which a text payload renders
//! inside a fixed box without overflowing.
//!
//! The search itself is measurement-agnostic: it only needs a monotonic
//! overflow oracle (if content fits at `s + 1` it must fit at `s`). Hosts
//! with a real rendering surface plug in their own [`TextMeasurer`];
//! [`CharGridMeasurer`] is the deterministic default and the test oracle.
//!
//! Each probe of the oracle is assumed to be expensive (on a live surface it
//! forces a layout pass), so the ladder of candidate sizes `0..=max` is
//! binary-searched rather than scanned: O(log n) measurements per fit.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Line breaks in a fit payload are normalized to this single marker.
pub const BREAK_MARKER: &str = "<BR>";

/// Embedded images are referenced by name: `<IMG:name>`.
pub const IMAGE_MARKER_OPEN: &str = "<IMG:";
pub const IMAGE_MARKER_CLOSE: &str = ">";

pub const DEFAULT_MIN_FONT_SIZE: u32 = 1;

/// Measurement capability consumed by the fit search.
pub trait TextMeasurer {
    /// Does `text` at `font_size` overflow a `max_w` x `max_h` box?
    fn overflows(&mut self, text: &str, font_size: u32, max_w: u32, max_h: u32) -> bool;

    /// The natural rendered size of `text` at `font_size` when wrapped to
    /// `max_w` (the box the scale factor is computed against).
    fn natural_size(&mut self, text: &str, font_size: u32, max_w: u32, max_h: u32) -> (f32, f32);

    /// Whether `text` references assets whose intrinsic size is not yet
    /// known. Intrinsic size affects wrapping, so fitting must wait.
    fn pending_assets(&mut self, _text: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    pub font_size: u32,
    /// Uniform shrink applied on top of the quantized font size so the
    /// rendered box meets the target exactly. Never above 1.
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitOutcome {
    Fitted(Fit),
    /// An image in the payload has not reported its size yet; re-invoke
    /// later. Fitting is idempotent, so a superseded retry is merely
    /// redundant.
    Deferred,
}

impl FitOutcome {
    pub fn fitted(self) -> Option<Fit> {
        match self {
            FitOutcome::Fitted(fit) => Some(fit),
            FitOutcome::Deferred => None,
        }
    }
}

/// Largest size in `[min_font, max_font]` that does not overflow the box,
/// or `min_font` when nothing in range fits (overflow is preferred to
/// failure).
pub fn largest_fitting_size(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    max_w: u32,
    max_h: u32,
    max_font: u32,
    min_font: u32,
) -> u32 {
    // Binary search for the smallest overflowing size on the 0..=max
    // ladder; the answer is one below it.
    let mut lo: i64 = -1;
    let mut hi: i64 = max_font as i64 + 1;
    while lo + 1 < hi {
        let mid = lo + (hi - lo) / 2;
        if measurer.overflows(text, mid as u32, max_w, max_h) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    (hi - 1).clamp(min_font as i64, max_font as i64) as u32
}

/// Fit without a live element: only the font size is computed.
pub fn fit(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    max_w: u32,
    max_h: u32,
    max_font: u32,
    min_font: u32,
) -> FitOutcome {
    if measurer.pending_assets(text) {
        return FitOutcome::Deferred;
    }
    let font_size = largest_fitting_size(measurer, text, max_w, max_h, max_font, min_font);
    FitOutcome::Fitted(Fit {
        font_size,
        scale: 1.0,
    })
}

/// Fit with sub-pixel scaling: after choosing the font size, measure the
/// natural rendered box and compute the uniform shrink that makes it meet
/// the target when quantization alone leaves it oversized.
pub fn fit_with_scale(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    max_w: u32,
    max_h: u32,
    max_font: u32,
    min_font: u32,
) -> FitOutcome {
    if measurer.pending_assets(text) {
        return FitOutcome::Deferred;
    }
    let font_size = largest_fitting_size(measurer, text, max_w, max_h, max_font, min_font);
    let (w, h) = measurer.natural_size(text, font_size, max_w, max_h);
    let scale = if w > 0.0 && h > 0.0 {
        (max_w as f32 / w).min(max_h as f32 / h).min(1.0)
    } else {
        1.0
    };
    FitOutcome::Fitted(Fit { font_size, scale })
}

/// Deterministic measurer over a fixed-metric glyph grid.
///
/// Glyphs advance `font_size * GLYPH_ASPECT` wide on lines
/// `font_size * LINE_HEIGHT` tall; text wraps greedily at word boundaries
/// (long words break mid-word). Images contribute registered block sizes;
/// an image whose load has only begun marks the payload pending.
#[derive(Debug, Default)]
pub struct CharGridMeasurer {
    image_sizes: HashMap<String, (u32, u32)>,
    loading: HashSet<String>,
}

pub const GLYPH_ASPECT: f32 = 0.6;
pub const LINE_HEIGHT: f32 = 1.2;

impl CharGridMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image's intrinsic size, completing any pending load.
    pub fn set_image_size(&mut self, name: &str, w: u32, h: u32) {
        self.loading.remove(name);
        self.image_sizes.insert(name.to_string(), (w, h));
    }

    pub fn begin_image_load(&mut self, name: &str) {
        if !self.image_sizes.contains_key(name) {
            self.loading.insert(name.to_string());
        }
    }

    fn layout(&self, text: &str, font_size: u32, max_w: u32) -> (f32, f32) {
        let glyph_w = font_size as f32 * GLYPH_ASPECT;
        let line_h = font_size as f32 * LINE_HEIGHT;

        let (plain, images) = strip_image_markers(text);
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for (img_w, img_h) in images
            .iter()
            .map(|name| self.image_sizes.get(name).copied().unwrap_or((0, 0)))
        {
            width = width.max(img_w as f32);
            height += img_h as f32;
        }

        if plain.split(BREAK_MARKER).all(|seg| seg.trim().is_empty()) && images.is_empty() {
            return (0.0, 0.0);
        }

        let cols = if glyph_w > 0.0 {
            ((max_w as f32 / glyph_w).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        for segment in plain.split(BREAK_MARKER) {
            let mut lines = 0usize;
            let mut longest = 0usize;
            let mut current = 0usize;
            for word in segment.split_whitespace() {
                let mut chars = word.chars().count();
                // Break oversized words into column-width chunks.
                while chars > cols {
                    lines += 1;
                    longest = longest.max(cols);
                    chars -= cols;
                }
                let needed = if current == 0 { chars } else { current + 1 + chars };
                if needed > cols && current > 0 {
                    lines += 1;
                    longest = longest.max(current);
                    current = chars;
                } else {
                    current = needed;
                }
            }
            if current > 0 {
                lines += 1;
                longest = longest.max(current);
            }
            // An explicit break still occupies a (possibly blank) line.
            lines = lines.max(1);
            width = width.max(longest as f32 * glyph_w);
            height += lines as f32 * line_h;
        }

        (width, height)
    }
}

impl TextMeasurer for CharGridMeasurer {
    fn overflows(&mut self, text: &str, font_size: u32, max_w: u32, max_h: u32) -> bool {
        let glyph_w = font_size as f32 * GLYPH_ASPECT;
        let (plain, _) = strip_image_markers(text);
        let has_text = plain.split(BREAK_MARKER).any(|seg| !seg.trim().is_empty());
        // A single glyph wider than the box overflows horizontally no
        // matter how the text wraps.
        if has_text && glyph_w > max_w as f32 {
            return true;
        }
        let (w, h) = self.layout(text, font_size, max_w);
        w > max_w as f32 || h > max_h as f32
    }

    fn natural_size(&mut self, text: &str, font_size: u32, max_w: u32, _max_h: u32) -> (f32, f32) {
        self.layout(text, font_size, max_w)
    }

    fn pending_assets(&mut self, text: &str) -> bool {
        let (_, images) = strip_image_markers(text);
        images.iter().any(|name| self.loading.contains(name))
    }
}

fn strip_image_markers(text: &str) -> (String, Vec<String>) {
    let mut plain = String::with_capacity(text.len());
    let mut images = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(IMAGE_MARKER_OPEN) {
        plain.push_str(&rest[..start]);
        let tail = &rest[start + IMAGE_MARKER_OPEN.len()..];
        match tail.find(IMAGE_MARKER_CLOSE) {
            Some(end) => {
                images.push(tail[..end].to_string());
                rest = &tail[end + IMAGE_MARKER_CLOSE.len()..];
            }
            None => {
                rest = "";
                break;
            }
        }
    }
    plain.push_str(rest);
    (plain, images)
}
