//! Code Block Parser — pulls the fenced `html`, `css` and `js` blocks out of the
//! stage-2 model reply.
//!
//! Best effort by contract: a block that is absent or never closed yields an empty
//! string, never an error. Only `js` has a non-empty fallback.

use serde::Serialize;

const FENCE: &str = "```";

/// Written to `script.js` when the reply carries no usable `js` block.
pub const JS_FALLBACK: &str = "console.log('Portfolio loaded');";

/// Outcome of looking for one labeled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// Trimmed text between the opening marker and the next fence.
    Found(&'a str),
    /// No ```` ```label ```` marker in the reply.
    Missing,
    /// Opening marker present but no closing fence after it (truncated reply).
    Unterminated,
}

impl<'a> Block<'a> {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn content(&self) -> &'a str {
        match *self {
            Block::Found(content) => content,
            Block::Missing | Block::Unterminated => "",
        }
    }
}

/// Locates the first ```` ```label ```` marker (fence and label adjacent, exact casing)
/// and returns the text up to the next bare fence.
///
/// The marker is a plain substring match: ```` ```js ```` also matches the start of
/// ```` ```json ````.
pub fn find_block<'a>(raw: &'a str, label: &str) -> Block<'a> {
    let marker = format!("{FENCE}{label}");
    let Some(start) = raw.find(&marker) else {
        return Block::Missing;
    };

    let rest = &raw[start + marker.len()..];
    match rest.find(FENCE) {
        Some(end) => Block::Found(rest[..end].trim()),
        None => Block::Unterminated,
    }
}

/// `find_block` flattened to a string: `""` unless the block was found.
#[cfg_attr(not(test), allow(dead_code))]
pub fn extract_block(raw: &str, label: &str) -> String {
    find_block(raw, label).content().to_string()
}

/// The three files of the generated website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSite {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockIssue {
    Missing,
    Unterminated,
    Empty,
}

/// A block the model did not deliver. The site is still packaged; callers surface these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputWarning {
    pub block: &'static str,
    pub issue: BlockIssue,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ParsedSite {
    pub site: GeneratedSite,
    pub warnings: Vec<OutputWarning>,
}

/// Extracts all three blocks and applies the `js` fallback.
pub fn parse_site(raw: &str) -> ParsedSite {
    let mut warnings = Vec::new();

    let html = take_block(raw, "html", "index.html will be empty", &mut warnings);
    let css = take_block(raw, "css", "style.css will be empty", &mut warnings);
    let mut js = take_block(raw, "js", "script.js uses a placeholder", &mut warnings);
    if js.is_empty() {
        js = JS_FALLBACK.to_string();
    }

    ParsedSite {
        site: GeneratedSite { html, css, js },
        warnings,
    }
}

fn take_block(
    raw: &str,
    label: &'static str,
    consequence: &str,
    warnings: &mut Vec<OutputWarning>,
) -> String {
    let issue = match find_block(raw, label) {
        Block::Found(content) if !content.is_empty() => return content.to_string(),
        Block::Found(_) => BlockIssue::Empty,
        Block::Missing => BlockIssue::Missing,
        Block::Unterminated => BlockIssue::Unterminated,
    };

    let problem = match issue {
        BlockIssue::Missing => format!("The model reply has no {FENCE}{label} block"),
        BlockIssue::Unterminated => format!("The {FENCE}{label} block in the model reply is never closed"),
        BlockIssue::Empty => format!("The {FENCE}{label} block in the model reply is empty"),
    };
    warnings.push(OutputWarning {
        block: label,
        issue,
        message: format!("{problem}; {consequence}."),
    });
    String::new()
}
