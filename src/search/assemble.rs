use crate::index::ScoredChunk;
use std::collections::HashMap;

/// Search hits for one document, restored to document order
#[derive(Debug, Clone)]
pub struct DocumentHits {
    pub path: String,
    pub title: String,
    pub chunks: Vec<ScoredChunk>,
}

/// Regroup raw nearest-neighbor hits for presentation.
///
/// Hits arrive in similarity order, interleaved across documents. Groups are
/// formed per path in the order each path first appears among the hits (not
/// alphabetical), and within a group chunks are reordered by their original
/// section index so a reader sees coherent, in-order excerpts.
pub fn assemble(hits: Vec<ScoredChunk>) -> Vec<DocumentHits> {
    let mut groups: Vec<DocumentHits> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for hit in hits {
        let path = hit.section.path.clone();
        match position.get(&path) {
            Some(&at) => groups[at].chunks.push(hit),
            None => {
                position.insert(path.clone(), groups.len());
                groups.push(DocumentHits {
                    path,
                    title: hit.title.clone(),
                    chunks: vec![hit],
                });
            }
        }
    }

    for group in &mut groups {
        group.chunks.sort_by_key(|hit| hit.section.index);
    }

    groups
}

/// Render assembled results as markdown, one block per source document
pub fn render_markdown(groups: &[DocumentHits]) -> String {
    let mut out = String::new();

    for group in groups {
        out.push_str(&format!("PATH: {}\n\n", group.path));
        for hit in &group.chunks {
            if !hit.section.header.is_empty() {
                out.push_str(&format!("## {}\n\n", hit.section.header));
            }
            out.push_str(&format!("{}\n\n", hit.section.content));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Section;

    fn hit(path: &str, index: usize, similarity: f32) -> ScoredChunk {
        ScoredChunk {
            section: Section {
                path: path.to_string(),
                index,
                level: 1,
                header: format!("h{}", index),
                content: format!("content {} of {}", index, path),
                parent_index: None,
                child_indices: Vec::new(),
            },
            title: path.trim_end_matches(".md").to_string(),
            indexed_at: "2024-01-01T00:00:00Z".to_string(),
            similarity,
        }
    }

    #[test]
    fn test_groups_in_first_seen_order_sorted_by_index() {
        let hits = vec![hit("b.md", 2, 0.9), hit("a.md", 0, 0.8), hit("b.md", 0, 0.7)];

        let groups = assemble(hits);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].path, "b.md");
        let b_indices: Vec<usize> = groups[0].chunks.iter().map(|h| h.section.index).collect();
        assert_eq!(b_indices, vec![0, 2]);

        assert_eq!(groups[1].path, "a.md");
        assert_eq!(groups[1].chunks.len(), 1);
        assert_eq!(groups[1].chunks[0].section.index, 0);
    }

    #[test]
    fn test_empty_hits() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_document_restores_document_order() {
        let hits = vec![hit("a.md", 3, 0.9), hit("a.md", 1, 0.8), hit("a.md", 2, 0.95)];

        let groups = assemble(hits);
        assert_eq!(groups.len(), 1);
        let indices: Vec<usize> = groups[0].chunks.iter().map(|h| h.section.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_render_markdown() {
        let groups = assemble(vec![hit("a.md", 0, 0.9)]);
        let rendered = render_markdown(&groups);

        assert!(rendered.contains("PATH: a.md"));
        assert!(rendered.contains("## h0"));
        assert!(rendered.contains("content 0 of a.md"));
    }

    #[test]
    fn test_render_markdown_headerless_chunk() {
        let mut h = hit("plain.md", 0, 0.5);
        h.section.level = 0;
        h.section.header = String::new();

        let rendered = render_markdown(&assemble(vec![h]));
        assert!(rendered.contains("PATH: plain.md"));
        assert!(!rendered.contains("## \n"));
    }
}
