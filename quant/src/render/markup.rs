//! Lightweight markup for assistant replies.
//!
//! Only headings, paragraphs, bulleted and numbered lists, and bold spans are
//! recognised. Anything else the parser reports (code, links, tables, images)
//! is flattened into plain text. Malformed input never fails: at worst it is
//! rendered verbatim as a paragraph.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::sanitize::strip_controls;

/// Shown when a reply has no text at all.
pub const EMPTY_PLACEHOLDER: &str = "(no response text)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<Vec<Span>>,
    },
}

impl Block {
    /// Concatenated text of the block without formatting.
    pub fn plain_text(&self) -> String {
        fn join(spans: &[Span]) -> String {
            spans.iter().map(|s| s.text.as_str()).collect()
        }

        match self {
            Block::Heading { spans, .. } | Block::Paragraph(spans) => join(spans),
            Block::List { items, .. } => items
                .iter()
                .map(|item| join(item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    bold_depth: usize,
    heading: Option<u8>,
    list: Option<(bool, u64, Vec<Vec<Span>>)>,
    list_depth: usize,
}

impl Builder {
    fn text(&mut self, text: &str) {
        let text = strip_controls(text);
        if text.is_empty() {
            return;
        }
        let bold = self.bold_depth > 0;
        match self.spans.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(&text),
            _ => self.spans.push(Span { text, bold }),
        }
    }

    fn take_spans(&mut self) -> Vec<Span> {
        let mut spans = std::mem::take(&mut self.spans);
        if let Some(last) = spans.last_mut() {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
        }
        spans.retain(|s| !s.text.is_empty());
        spans
    }

    /// Close whatever inline run is open into the right container.
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = self.take_spans();
        if spans.is_empty() {
            return;
        }
        if let Some((_, _, items)) = self.list.as_mut() {
            match items.last_mut() {
                Some(item) if !item.is_empty() => {
                    item.push(Span::plain(" "));
                    item.extend(spans);
                }
                Some(item) => *item = spans,
                None => items.push(spans),
            }
        } else if let Some(level) = self.heading {
            self.blocks.push(Block::Heading { level, spans });
        } else {
            self.blocks.push(Block::Paragraph(spans));
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(heading_level(level));
            }
            Tag::Paragraph => self.flush(),
            Tag::List(start) => {
                self.flush();
                self.list_depth += 1;
                // Nested lists fold into the outer list's items.
                if self.list_depth == 1 {
                    self.list = Some((start.is_some(), start.unwrap_or(1), Vec::new()));
                }
            }
            Tag::Item => {
                self.flush();
                if let Some((_, _, items)) = self.list.as_mut() {
                    items.push(Vec::new());
                }
            }
            Tag::Strong => self.bold_depth += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = None;
            }
            TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    if let Some((ordered, start, items)) = self.list.take() {
                        let items: Vec<_> = items.into_iter().filter(|i| !i.is_empty()).collect();
                        if !items.is_empty() {
                            self.blocks.push(Block::List {
                                ordered,
                                start,
                                items,
                            });
                        }
                    }
                }
            }
            TagEnd::Strong => self.bold_depth = self.bold_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        if let Some((ordered, start, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List {
                    ordered,
                    start,
                    items,
                });
            }
        }
        self.blocks
    }
}

/// Parse reply text into display blocks.
pub fn parse(text: &str) -> Vec<Block> {
    if text.trim().is_empty() {
        return vec![Block::Paragraph(vec![Span::plain(EMPTY_PLACEHOLDER)])];
    }

    let mut builder = Builder::default();
    for event in Parser::new_ext(text, Options::empty()) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(tag) => builder.end(tag),
            Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                builder.text(&t)
            }
            Event::SoftBreak | Event::HardBreak => builder.text(" "),
            _ => {}
        }
    }

    let blocks = builder.finish();
    if blocks.is_empty() {
        vec![Block::Paragraph(vec![Span::plain(strip_controls(text.trim()))])]
    } else {
        blocks
    }
}
