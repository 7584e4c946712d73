use serde::{Deserialize, Serialize};

/// Document reference: position of a document in `paths.json`
pub type DocRef = u32;

/// Ordered corpus paths, position = `ref`
pub type PathsIndex = Vec<String>;

/// Breadcrumb titles aligned 1:1 with [`PathsIndex`]
pub type NamesIndex = Vec<Vec<String>>;

/// Table-of-contents tree node
///
/// A node without a title is a transparent grouping node: its children are
/// lifted to its parent by [`lift_untitled`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocRef>,
    #[serde(default)]
    pub children: Vec<TocNode>,
}

impl TocNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            document_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_document(mut self, doc_ref: DocRef) -> Self {
        self.document_id = Some(doc_ref);
        self
    }

    pub fn with_children(mut self, children: Vec<TocNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node is a transparent grouping node
    pub fn is_transparent(&self) -> bool {
        self.title.as_deref().map_or(true, |t| t.trim().is_empty())
    }
}

/// Replace every untitled node by its (recursively lifted) children
pub fn lift_untitled(nodes: Vec<TocNode>) -> Vec<TocNode> {
    let mut lifted = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.is_transparent() {
            lifted.extend(lift_untitled(node.children));
        } else {
            let children = lift_untitled(node.children);
            lifted.push(TocNode { children, ..node });
        }
    }
    lifted
}

/// Context-to-document mapping rule, first match wins
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Regular expression source matched against a UI path
    pub pattern: String,
    /// Document path the rule points at
    pub doc: String,
}

impl MappingRule {
    pub fn new(pattern: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            doc: doc.into(),
        }
    }
}

/// Summary returned by a successful corpus consistency check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub documents: usize,
    pub indexed_documents: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_untitled_nodes() {
        let root = TocNode::default().with_children(vec![
            TocNode::new("Chains").with_children(vec![TocNode::default().with_children(vec![
                TocNode::new("Graph").with_document(3),
            ])]),
            TocNode::new("Library").with_document(7),
        ]);

        let lifted = lift_untitled(vec![root]);

        assert_eq!(lifted.len(), 2);
        assert_eq!(lifted[0].title.as_deref(), Some("Chains"));
        assert_eq!(lifted[0].children.len(), 1);
        assert_eq!(lifted[0].children[0].title.as_deref(), Some("Graph"));
        assert_eq!(lifted[0].children[0].document_id, Some(3));
        assert_eq!(lifted[1].document_id, Some(7));
    }

    #[test]
    fn test_toc_node_json_shape() {
        let json = r#"{"children":[{"title":"Intro","documentId":0}]}"#;
        let node: TocNode = serde_json::from_str(json).unwrap();
        assert!(node.is_transparent());
        assert_eq!(node.children[0].document_id, Some(0));
        assert!(node.children[0].children.is_empty());
    }

    #[test]
    fn test_blank_title_is_transparent() {
        assert!(TocNode::new("  ").is_transparent());
        assert!(!TocNode::new("Intro").is_transparent());
    }
}
