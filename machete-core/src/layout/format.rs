//! Layout text format parser and printer

use std::collections::HashSet;

use serde::Serialize;

use super::entry::{BranchLayout, LayoutEntry};
use crate::error::FormatError;

/// Indentation used by a layout file: one repeated character, `width` per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutFormat {
    indent_char: char,
    indent_width: usize,
}

impl LayoutFormat {
    /// Create a format; a zero width is treated as one
    pub fn new(indent_char: char, indent_width: usize) -> Self {
        Self {
            indent_char,
            indent_width: indent_width.max(1),
        }
    }

    /// The repeated indent character
    pub fn indent_char(&self) -> char {
        self.indent_char
    }

    /// Number of indent characters per level
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    fn indent(&self, depth: usize) -> String {
        std::iter::repeat(self.indent_char)
            .take(depth * self.indent_width)
            .collect()
    }
}

impl Default for LayoutFormat {
    fn default() -> Self {
        Self::new(' ', 2)
    }
}

/// How the parser learns the indentation of a text
#[derive(Debug, Clone, Copy)]
enum Indent {
    /// Every indented line must match this format
    Fixed(LayoutFormat),
    /// Detect from the first indented line; a flat text keeps `fallback`
    Detect { fallback: LayoutFormat },
}

/// Parse layout text, detecting the indentation from the first indented line
pub fn parse_layout(text: &str) -> Result<BranchLayout, FormatError> {
    parse(
        text,
        Indent::Detect {
            fallback: LayoutFormat::default(),
        },
    )
}

/// Parse layout text with a fixed indentation
pub fn parse_layout_with(text: &str, format: LayoutFormat) -> Result<BranchLayout, FormatError> {
    parse(text, Indent::Fixed(format))
}

/// Parse layout text, detecting its indentation and keeping `fallback` when it has none
///
/// Leading copies of the fallback's indent character count as indentation too,
/// so a file written with that format reads back unchanged.
pub fn parse_layout_or(text: &str, fallback: LayoutFormat) -> Result<BranchLayout, FormatError> {
    parse(text, Indent::Detect { fallback })
}

fn parse(text: &str, indent: Indent) -> Result<BranchLayout, FormatError> {
    let (mut format, fallback) = match indent {
        Indent::Fixed(format) => (Some(format), format),
        Indent::Detect { fallback } => (None, fallback),
    };
    let is_indent = |c: char| c == ' ' || c == '\t' || c == fallback.indent_char;
    let mut roots: Vec<LayoutEntry> = Vec::new();
    // open[d] is the most recent entry at depth d still accepting children
    let mut open: Vec<LayoutEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let content = raw.trim_start_matches(is_indent);
        let leading = &raw[..raw.len() - content.len()];
        let depth = indent_depth(leading, line, &mut format)?;

        if open.is_empty() && roots.is_empty() && depth > 0 {
            return Err(FormatError::IndentedFirstEntry { line });
        }
        if depth > open.len() {
            return Err(FormatError::SkippedLevel {
                line,
                depth,
                previous: open.len().saturating_sub(1),
            });
        }

        let entry = parse_entry(content);
        if !seen.insert(entry.name.clone()) {
            return Err(FormatError::DuplicateName {
                line,
                name: entry.name,
            });
        }

        close_to_depth(&mut open, &mut roots, depth);
        open.push(entry);
    }
    close_to_depth(&mut open, &mut roots, 0);

    Ok(BranchLayout::from_parts(roots, format.unwrap_or(fallback)))
}

fn indent_depth(
    indent: &str,
    line: usize,
    format: &mut Option<LayoutFormat>,
) -> Result<usize, FormatError> {
    let Some(first) = indent.chars().next() else {
        return Ok(0);
    };
    let found = indent.chars().count();
    let format = *format.get_or_insert_with(|| LayoutFormat::new(first, found));

    if let Some(other) = indent.chars().find(|&c| c != format.indent_char) {
        return Err(FormatError::MixedIndentCharacter {
            line,
            expected: format.indent_char,
            found: other,
        });
    }
    if found % format.indent_width != 0 {
        return Err(FormatError::NotMultipleOfWidth {
            line,
            found,
            width: format.indent_width,
        });
    }
    Ok(found / format.indent_width)
}

fn parse_entry(content: &str) -> LayoutEntry {
    match content.split_once(' ') {
        Some((name, annotation)) => LayoutEntry::new(name).with_annotation(annotation),
        None => LayoutEntry::new(content),
    }
}

fn close_to_depth(open: &mut Vec<LayoutEntry>, roots: &mut Vec<LayoutEntry>, depth: usize) {
    while open.len() > depth {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

/// Print a layout in its own indentation format, one line per entry
pub fn serialize_layout(layout: &BranchLayout) -> String {
    let mut out = String::new();
    write_entries(&mut out, layout.roots(), 0, layout.format());
    out
}

fn write_entries(out: &mut String, entries: &[LayoutEntry], depth: usize, format: LayoutFormat) {
    for entry in entries {
        out.push_str(&format.indent(depth));
        out.push_str(&entry.name);
        if let Some(annotation) = &entry.annotation {
            out.push(' ');
            out.push_str(annotation);
        }
        out.push('\n');
        write_entries(out, &entry.children, depth + 1, format);
    }
}
