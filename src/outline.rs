//! Outline tree: numbered headings discovered while segmenting a file.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The root is
//! always node 0, has depth 0 and an empty name.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Serialize)]
pub struct OutlineNode {
    /// Dot-separated hierarchical index, e.g. `2.1.3`.
    pub name: String,
    pub heading: String,
    pub depth: usize,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    /// Closed by a literal code token rather than a close marker.
    pub closable: bool,
    /// Indentation column of the opening line; only set for closable nodes.
    pub close_offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Outline {
    nodes: Vec<OutlineNode>,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl Outline {
    pub fn new() -> Self {
        Self {
            nodes: vec![OutlineNode {
                name: String::new(),
                heading: String::new(),
                depth: 0,
                parent: None,
                children: Vec::new(),
                closable: false,
                close_offset: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    /// Append a child under `parent` and return its id.
    ///
    /// The name is fixed here from the sibling count and never renumbered.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        heading: &str,
        close_offset: Option<usize>,
    ) -> NodeId {
        let parent_node = &self.nodes[parent.0];
        let position = parent_node.children.len() + 1;
        let name = if parent_node.name.is_empty() {
            position.to_string()
        } else {
            format!("{}.{}", parent_node.name, position)
        };
        let depth = parent_node.depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(OutlineNode {
            name,
            heading: heading.trim().to_string(),
            depth,
            parent: Some(parent),
            children: Vec::new(),
            closable: close_offset.is_some(),
            close_offset,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// All nodes except the root, in creation order.
    pub fn headings(&self) -> impl Iterator<Item = &OutlineNode> {
        self.nodes.iter().skip(1)
    }

    /// Render as nested `<ul>` lists, depth-first in child order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_children(self.root(), &mut out);
        out
    }

    fn render_children(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if node.children.is_empty() {
            return;
        }
        out.push_str("<ul>");
        for &child in &node.children {
            let c = &self.nodes[child.0];
            out.push_str(&format!(
                "<li><a href=\"#{}\">{} {}</a>",
                c.name,
                c.name,
                html_escape::encode_text(&c.heading)
            ));
            self.render_children(child, out);
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }
}
