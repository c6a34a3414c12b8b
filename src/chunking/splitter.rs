use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One section of a markdown document: the atomic retrieval unit.
///
/// Sections for a document form a forest stored as a flat array. Parent and
/// child links are indices into that array rather than references; links only
/// ever point backward (parents precede children), so the forest cannot
/// contain cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the owning document, stable across re-indexing
    pub path: String,
    /// 0-based position within the document's section sequence
    pub index: usize,
    /// Header depth 1-6; 0 means the document had no headers at all
    pub level: usize,
    /// Trimmed header line text (empty at level 0)
    pub header: String,
    /// Full span from this header (inclusive) to the next header or EOF
    pub content: String,
    /// Nearest preceding section with a strictly smaller level
    pub parent_index: Option<usize>,
    /// Indices of immediate children, in document order
    pub child_indices: Vec<usize>,
}

fn header_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 1-6 leading '#' followed by whitespace and the header text.
    // Seven or more '#' is not a header, matching common markdown rules.
    RE.get_or_init(|| Regex::new(r"(?m)^(#{1,6})\s+(.+)$").expect("invalid header regex"))
}

/// Split markdown text into sections based on headers while maintaining
/// hierarchy.
///
/// A document without any headers yields exactly one level-0 section whose
/// content is the whole input; this is the degenerate case, not an error.
/// Otherwise each header starts a section spanning to the next header (at any
/// level) or the end of the document. Text before the first header is not
/// represented.
///
/// Hierarchy assignment walks the headers in document order with a level
/// stack: a new header pops every open section at the same or a deeper level,
/// then attaches to whatever remains on top (or becomes a root).
pub fn split_sections(text: &str, path: &str) -> Vec<Section> {
    let headers: Vec<(usize, String, usize)> = header_pattern()
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("capture 0 always present");
            let hashes = caps.get(1).expect("level group").as_str();
            let header_text = caps.get(2).expect("text group").as_str();
            (hashes.len(), header_text.trim().to_string(), whole.start())
        })
        .collect();

    if headers.is_empty() {
        return vec![Section {
            path: path.to_string(),
            index: 0,
            level: 0,
            header: String::new(),
            content: text.to_string(),
            parent_index: None,
            child_indices: Vec::new(),
        }];
    }

    let mut sections: Vec<Section> = Vec::with_capacity(headers.len());
    // Stack of (section index, level) for currently open sections
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for (i, (level, header, start)) in headers.iter().enumerate() {
        let end = headers
            .get(i + 1)
            .map(|(_, _, next_start)| *next_start)
            .unwrap_or(text.len());
        let content = text[*start..end].trim().to_string();

        // A same-or-shallower header terminates all deeper open sections
        while stack.last().is_some_and(|(_, open_level)| *open_level >= *level) {
            stack.pop();
        }

        let parent_index = stack.last().map(|(parent, _)| *parent);
        if let Some(parent) = parent_index {
            sections[parent].child_indices.push(i);
        }

        sections.push(Section {
            path: path.to_string(),
            index: i,
            level: *level,
            header: header.clone(),
            content,
            parent_index,
            child_indices: Vec::new(),
        });
        stack.push((i, *level));
    }

    sections
}
