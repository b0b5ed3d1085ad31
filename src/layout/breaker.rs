use super::{RenderableWord, SubLine};
use crate::engine::config::FontFamily;
use crate::markup::{LogicalLine, StyleSet};
use crate::rendering::font::{FaceKey, FontError, FontProvider};

/// Split text into alternating word and whitespace units.
///
/// Whitespace is kept as its own unit so spacing survives re-wrapping and is
/// measured like any other text.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut in_whitespace = None;

    for (index, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match in_whitespace {
            Some(previous) if previous != is_space => {
                units.push(&text[start..index]);
                start = index;
            }
            _ => {}
        }
        in_whitespace = Some(is_space);
    }
    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

#[derive(Default)]
struct SubLineBuilder {
    words: Vec<RenderableWord>,
    width: f32,
    max_ascent: u32,
    max_descent: u32,
}

impl SubLineBuilder {
    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn has_visible_word(&self) -> bool {
        self.words.iter().any(|word| !word.is_whitespace())
    }

    fn push(&mut self, word: RenderableWord) {
        self.width += word.width;
        self.max_ascent = self.max_ascent.max(word.ascent);
        self.max_descent = self.max_descent.max(word.descent);
        self.words.push(word);
    }

    fn finish(self, available_width: f32) -> SubLine {
        // Trailing whitespace may hang past the edge; only visible text counts.
        let visible_width: f32 = match self.words.iter().rposition(|w| !w.is_whitespace()) {
            Some(last) => self.words[..=last].iter().map(|w| w.width).sum(),
            None => 0.0,
        };
        SubLine {
            height: self.max_ascent + self.max_descent,
            max_ascent: self.max_ascent,
            overflows: visible_width > available_width,
            words: self.words,
        }
    }
}

/// Greedily wrap one logical line at `font_size` into rows no wider than
/// `available_width`.
///
/// A word wider than the available width is never dropped: it gets a row of
/// its own, flagged as overflowing. A blank logical line produces exactly one
/// blank row with the regular face's line height. An empty result means not
/// even one word could be placed.
pub fn break_line(
    line: &LogicalLine,
    font_size: u32,
    family: FontFamily,
    available_width: f32,
    fonts: &dyn FontProvider,
) -> Result<Vec<SubLine>, FontError> {
    if line.is_blank() {
        let metrics = fonts.metrics(FaceKey::new(family, StyleSet::plain(), font_size))?;
        return Ok(vec![SubLine::blank(metrics.line_height())]);
    }

    let mut sub_lines = Vec::new();
    let mut current = SubLineBuilder::default();

    for run in &line.runs {
        let key = FaceKey::new(family, run.styles, font_size);
        let metrics = fonts.metrics(key)?;

        for unit in split_words(&run.text) {
            let word = RenderableWord {
                text: unit.to_string(),
                styles: run.styles,
                width: fonts.text_width(key, unit)?,
                ascent: metrics.ascent,
                descent: metrics.descent,
            };

            let breaks_here = !word.is_whitespace()
                && current.has_visible_word()
                && current.width + word.width > available_width;
            if breaks_here {
                let finished = std::mem::take(&mut current);
                sub_lines.push(finished.finish(available_width));
            }
            current.push(word);
        }
    }

    if !current.is_empty() {
        sub_lines.push(current.finish(available_width));
    }

    Ok(sub_lines)
}
