pub mod frontmatter;
pub mod splitter;

pub use frontmatter::parse_frontmatter;
pub use splitter::{split_sections, Section};
