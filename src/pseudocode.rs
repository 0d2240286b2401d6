use anyhow::bail;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;
use maud::{Markup, html};
use regex::Regex;

use crate::page::Page;

/// Selector marking blocks to be rendered.
pub const BLOCK_SELECTOR: &str = "pre.pseudocode";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// CSS length of one nesting level.
    pub indent_size: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_size: "1.5em".to_string(),
        }
    }
}

/// The rendering capability. Behind a trait so the CLI can run without one
/// (a silent no-op) and tests can inject failing implementations.
pub trait Render {
    fn render(&self, source: &str, options: &RenderOptions) -> anyhow::Result<String>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: usize,
    pub failed: usize,
}

/// Replace every pseudocode block on the page with rendered markup, in
/// document order. A failing block is left in place with one diagnostic;
/// the remaining blocks still render. With no renderer the page is
/// untouched.
pub fn render_blocks(
    page: &Page,
    renderer: Option<&dyn Render>,
    options: &RenderOptions,
) -> RenderReport {
    let mut report = RenderReport::default();
    let Some(renderer) = renderer else {
        return report;
    };
    let Ok(blocks) = page.document().select(BLOCK_SELECTOR) else {
        return report;
    };
    let blocks: Vec<_> = blocks.collect();
    for (index, block) in blocks.iter().enumerate() {
        let source = block.as_node().text_contents();
        let source = source.trim();
        match renderer.render(source, options) {
            Ok(markup) => {
                replace_node_with_markup(block.as_node(), &markup);
                report.rendered += 1;
            }
            Err(err) => {
                tracing::error!(block = index + 1, error = %err, "pseudocode render failed");
                report.failed += 1;
            }
        }
    }
    report
}

// Outer-markup replacement: parse the fragment, splice its body children in
// front of the block, drop the block.
fn replace_node_with_markup(node: &NodeRef, markup: &str) {
    let fragment = kuchiki::parse_html().one(markup);
    let replacements: Vec<NodeRef> = match fragment.select_first("body") {
        Ok(body) => body.as_node().children().collect(),
        Err(()) => fragment.children().collect(),
    };
    for replacement in replacements {
        node.insert_before(replacement);
    }
    node.detach();
}

/// Built-in renderer: one `div.ps-line` per source line, nesting depth from
/// leading whitespace, algorithm keywords wrapped in `span.ps-keyword`.
/// Text content is escaped by construction (maud).
pub struct BuiltinRenderer {
    keyword_re: Regex,
}

impl BuiltinRenderer {
    pub fn new() -> Self {
        let keyword_re = Regex::new(
            r"(?i)\b(algorithm|procedure|function|begin|end|if|then|else|elsif|while|for|foreach|do|repeat|until|return|break|continue|input|output|print|and|or|not)\b",
        )
        .expect("keyword regex");
        Self { keyword_re }
    }

    fn mark_keywords(&self, line: &str) -> Markup {
        let mut pieces: Vec<Markup> = Vec::new();
        let mut last = 0usize;
        for found in self.keyword_re.find_iter(line) {
            let before = &line[last..found.start()];
            pieces.push(html! {
                (before)
                span class="ps-keyword" { (found.as_str()) }
            });
            last = found.end();
        }
        let rest = &line[last..];
        html! {
            @for piece in &pieces { (piece) }
            (rest)
        }
    }
}

impl Default for BuiltinRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for BuiltinRenderer {
    fn render(&self, source: &str, options: &RenderOptions) -> anyhow::Result<String> {
        if source.is_empty() {
            bail!("empty pseudocode block");
        }
        let lines = layout_lines(source);
        let markup = html! {
            div class="pseudocode" {
                @for line in &lines {
                    @if line.depth == 0 {
                        div class="ps-line" { (self.mark_keywords(line.text)) }
                    } @else {
                        div class="ps-line"
                            style=(format!("margin-left: calc({} * {})", line.depth, options.indent_size)) {
                            (self.mark_keywords(line.text))
                        }
                    }
                }
            }
        };
        Ok(markup.into_string())
    }
}

struct Line<'a> {
    depth: usize,
    text: &'a str,
}

// Depth from leading whitespace: one level per smallest nonzero indent seen
// in the block, tabs counted as four columns.
fn layout_lines(source: &str) -> Vec<Line<'_>> {
    let widths: Vec<usize> = source.lines().map(indent_width).collect();
    let unit = widths.iter().copied().filter(|w| *w > 0).min().unwrap_or(1);
    source
        .lines()
        .zip(widths)
        .map(|(line, width)| Line {
            depth: width / unit,
            text: line.trim_start(),
        })
        .collect()
}

fn indent_width(line: &str) -> usize {
    let mut width = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}
