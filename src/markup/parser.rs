//! Markup parser for caption text
//!
//! Walks the quick-xml event stream with an explicit stack of open elements.
//! Each stack frame carries the style set accumulated up to that element, so
//! nested `<b><i>..</i></b>` yields runs that are both bold and italic.
//! Anything the reader cannot make sense of is skipped rather than reported.

use super::{has_visible_text, LogicalLine, StyleSet, StyledRun};
use std::borrow::Cow;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, warn};

struct OpenElement {
    tag: String,
    styles: StyleSet,
}

/// Style contributed by a tag, `None` for tags that only group content
fn tag_style(tag: &str) -> Option<StyleSet> {
    match tag {
        "b" | "strong" => Some(StyleSet::BOLD),
        "i" | "em" => Some(StyleSet::ITALIC),
        "u" | "ins" => Some(StyleSet::UNDERLINE),
        _ => None,
    }
}

fn is_line_break(tag: &str) -> bool {
    tag == "br"
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_ascii_lowercase()
}

/// Control characters (tabs, newlines) become a plain space; breaks are
/// structural only. Non-breaking spaces are kept as written.
fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Whether the `<` at the start of `rest` opens a tag, a comment or a CDATA
/// section.
fn opens_markup(rest: &str) -> bool {
    let after = &rest[1..];
    let after = after.strip_prefix('/').unwrap_or(after);
    after.starts_with(|c: char| c.is_ascii_alphabetic())
        || rest.starts_with("<!--")
        || rest.starts_with("<![CDATA[")
}

/// Escape every `<` that cannot start markup so it reads back as text.
fn escape_stray_angles(markup: &str) -> Cow<'_, str> {
    if !markup
        .match_indices('<')
        .any(|(index, _)| !opens_markup(&markup[index..]))
    {
        return Cow::Borrowed(markup);
    }

    let mut escaped = String::with_capacity(markup.len() + 8);
    let mut last = 0;
    for (index, _) in markup.match_indices('<') {
        if !opens_markup(&markup[index..]) {
            escaped.push_str(&markup[last..index]);
            escaped.push_str("&lt;");
            last = index + 1;
        }
    }
    escaped.push_str(&markup[last..]);
    Cow::Owned(escaped)
}

fn resolve_entity(name: &str) -> String {
    let raw = format!("&{};", name);
    match unescape_with(&raw, resolve_html5_entity) {
        Ok(resolved) => resolved.into_owned(),
        Err(_) => raw,
    }
}

struct LineBuilder {
    lines: Vec<LogicalLine>,
    stack: Vec<OpenElement>,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: vec![LogicalLine::default()],
            stack: Vec::new(),
        }
    }

    fn active_styles(&self) -> StyleSet {
        self.stack
            .last()
            .map(|open| open.styles)
            .unwrap_or_default()
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let styles = self.active_styles();
        if let Some(line) = self.lines.last_mut() {
            line.runs.push(StyledRun::new(normalize_text(text), styles));
        }
    }

    fn open(&mut self, tag: String) {
        let styles = match tag_style(&tag) {
            Some(style) => self.active_styles().with(style),
            None => self.active_styles(),
        };
        self.stack.push(OpenElement { tag, styles });
    }

    fn close(&mut self, tag: &str) {
        // Closing an outer element implicitly closes anything left open inside it.
        match self.stack.iter().rposition(|open| open.tag == tag) {
            Some(index) => self.stack.truncate(index),
            None => debug!(tag, "ignoring unmatched closing tag"),
        }
    }

    fn line_break(&mut self) {
        self.lines.push(LogicalLine::default());
    }

    fn finish(mut self) -> Vec<LogicalLine> {
        if self.lines.len() > 1 && self.lines.last().is_some_and(|l| l.runs.is_empty()) {
            self.lines.pop();
        }
        if !has_visible_text(&self.lines) {
            return vec![LogicalLine::default()];
        }
        self.lines
    }
}

/// Parse caption markup into logical lines.
///
/// Always returns at least one line. When the markup holds no visible text
/// the result is exactly one empty line, which callers treat as "no caption".
pub fn parse(markup: &str) -> Vec<LogicalLine> {
    let markup = escape_stray_angles(markup);
    let mut reader = Reader::from_str(&markup);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;
    }

    let mut builder = LineBuilder::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = tag_name(e.name().as_ref());
                if is_line_break(&tag) {
                    builder.line_break();
                } else {
                    builder.open(tag);
                }
            }
            Ok(Event::Empty(e)) => {
                if is_line_break(&tag_name(e.name().as_ref())) {
                    builder.line_break();
                }
            }
            Ok(Event::End(e)) => {
                let tag = tag_name(e.name().as_ref());
                if !is_line_break(&tag) {
                    builder.close(&tag);
                }
            }
            Ok(Event::Text(e)) => match e.decode() {
                Ok(text) => builder.push_text(&text),
                Err(err) => warn!(error = %err, "skipping undecodable caption text"),
            },
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                builder.push_text(&text);
            }
            Ok(Event::GeneralRef(e)) => match e.decode() {
                Ok(name) => builder.push_text(&resolve_entity(&name)),
                Err(err) => warn!(error = %err, "skipping undecodable entity"),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(
                    error = %err,
                    position = reader.buffer_position(),
                    "caption markup is malformed, keeping text parsed so far"
                );
                break;
            }
        }
    }

    builder.finish()
}
