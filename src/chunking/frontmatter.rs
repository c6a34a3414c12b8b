use serde_yaml_ng::Value;
use std::collections::BTreeMap;

/// Parsed frontmatter key/value pairs
pub type Frontmatter = BTreeMap<String, Value>;

const OPEN_DELIMITER: &str = "---\n";
const CLOSE_DELIMITER: &str = "\n---\n";

/// Parse YAML frontmatter from the start of a markdown document.
///
/// Recognizes a leading `---` line, a YAML mapping, and a closing `---` line.
/// Returns the parsed mapping and the remainder of the document, which starts
/// at the first byte after the closing delimiter's newline.
///
/// Malformed frontmatter is never an error: a missing opener, a missing
/// closer, or YAML that does not parse as a mapping all yield an empty
/// mapping and the original text unchanged.
pub fn parse_frontmatter(text: &str) -> (Frontmatter, &str) {
    if !text.starts_with(OPEN_DELIMITER) {
        return (Frontmatter::new(), text);
    }

    // Search for the closing delimiter after the opening line
    let Some(close_at) = text[OPEN_DELIMITER.len()..].find(CLOSE_DELIMITER) else {
        return (Frontmatter::new(), text);
    };
    let close_at = close_at + OPEN_DELIMITER.len();

    let yaml = &text[OPEN_DELIMITER.len()..close_at];
    match serde_yaml_ng::from_str::<Frontmatter>(yaml) {
        Ok(mapping) => (mapping, &text[close_at + CLOSE_DELIMITER.len()..]),
        Err(e) => {
            log::debug!("frontmatter did not parse as a mapping: {}", e);
            (Frontmatter::new(), text)
        }
    }
}
