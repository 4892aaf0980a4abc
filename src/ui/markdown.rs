//! Markdown rendering for transcript messages.
//!
//! Folds pulldown-cmark events into styled ratatui lines. Total by
//! construction: anything the parser does not recognize degrades to literal
//! text, which is exactly what the typing effect needs when it re-renders a
//! half-revealed reply every tick.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    in_code_block: bool,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![Style::default()],
            list_stack: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        *self.style_stack.last().expect("style stack never empties")
    }

    fn push_style(&mut self, modify: impl FnOnce(Style) -> Style) {
        let top = self.style();
        self.style_stack.push(modify(top));
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.current
                .push(Span::styled(text.to_string(), self.style()));
        }
    }

    fn flush_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn blank_line(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
        if !matches!(self.lines.last(), Some(line) if line.spans.is_empty()) && !self.lines.is_empty()
        {
            self.lines.push(Line::from(""));
        }
    }

    fn begin_item(&mut self) {
        let depth = self.list_stack.len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(number)) => {
                let marker = format!("{indent}{number}. ");
                *number += 1;
                marker
            }
            _ => format!("{indent}• "),
        };
        self.current
            .push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.flush_line();
        }
        while matches!(self.lines.last(), Some(line) if line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render markdown source into display lines. Never fails; the worst input
/// comes back as plain text.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options);

    let mut builder = LineBuilder::new();

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {}
                Tag::Heading { .. } => {
                    builder
                        .push_style(|style| style.fg(Color::Cyan).add_modifier(Modifier::BOLD));
                }
                Tag::List(start) => {
                    builder.list_stack.push(match start {
                        Some(number) => ListKind::Ordered(number),
                        None => ListKind::Unordered,
                    });
                }
                Tag::Item => builder.begin_item(),
                Tag::CodeBlock(_) => {
                    builder.blank_line();
                    builder.in_code_block = true;
                    builder.push_style(|style| style.fg(Color::Green));
                }
                Tag::Emphasis => builder.push_style(|style| style.add_modifier(Modifier::ITALIC)),
                Tag::Strong => builder.push_style(|style| style.add_modifier(Modifier::BOLD)),
                Tag::Strikethrough => {
                    builder.push_style(|style| style.add_modifier(Modifier::CROSSED_OUT))
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Paragraph => builder.blank_line(),
                TagEnd::Heading(_) => {
                    builder.pop_style();
                    builder.blank_line();
                }
                TagEnd::List(_) => {
                    builder.list_stack.pop();
                    if builder.list_stack.is_empty() {
                        builder.blank_line();
                    }
                }
                TagEnd::Item => {
                    if !builder.current.is_empty() {
                        builder.flush_line();
                    }
                }
                TagEnd::CodeBlock => {
                    builder.pop_style();
                    builder.in_code_block = false;
                    builder.blank_line();
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => builder.pop_style(),
                _ => {}
            },
            Event::Text(text) => {
                if builder.in_code_block {
                    for line in text.lines() {
                        builder.push_text(&format!("  {line}"));
                        builder.flush_line();
                    }
                } else {
                    builder.push_text(&text);
                }
            }
            Event::Code(code) => {
                let style = builder.style().fg(Color::Yellow);
                builder.current.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => builder.push_text(" "),
            Event::HardBreak => builder.flush_line(),
            Event::Rule => {
                builder.blank_line();
                builder.current.push(Span::styled(
                    "────────".to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
                builder.blank_line();
            }
            Event::Html(html) | Event::InlineHtml(html) => builder.push_text(&html),
            _ => {}
        }
    }

    builder.finish()
}

/// Flatten rendered lines back to plain text, one string per line.
pub fn lines_to_plain_text(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect()
}
