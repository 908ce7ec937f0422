use std::collections::HashMap;

use crate::core::Result;

/// Declaration-format node handed across the crate boundary. Whatever format
/// statements are declared in (XML, annotations, generated code), the host
/// parses it upstream and delivers this neutral tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    name: String,
    attributes: HashMap<String, String>,
    children: Vec<NodeContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Element(DeclarationNode),
    Text(String),
}

impl DeclarationNode {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append an element child.
    pub fn child(mut self, node: DeclarationNode) -> Self {
        self.children.push(NodeContent::Element(node));
        self
    }

    /// Append a text child.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(NodeContent::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[NodeContent] {
        &self.children
    }

    /// Concatenated direct text children.
    pub fn body_text(&self) -> String {
        let mut body = String::new();
        for child in &self.children {
            if let NodeContent::Text(text) = child {
                body.push_str(text);
            }
        }
        body
    }
}

/// Host capability for turning a script-wrapped statement body into a node
/// tree. Registered on the configuration; absent by default.
pub trait ScriptNodeParser: Send + Sync {
    fn parse(&self, body: &str) -> Result<DeclarationNode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let node = DeclarationNode::element("if")
            .attr("test", "name")
            .text("AND name = #{name}");

        assert_eq!(node.name(), "if");
        assert_eq!(node.attribute("test"), Some("name"));
        assert_eq!(node.attribute("missing"), None);
        assert_eq!(node.body_text(), "AND name = #{name}");
    }

    #[test]
    fn test_body_text_skips_element_children() {
        let node = DeclarationNode::element("select")
            .text("SELECT * FROM users")
            .child(DeclarationNode::element("if").attr("test", "id").text(" WHERE id = #{id}"))
            .text(" ORDER BY id");

        assert_eq!(node.body_text(), "SELECT * FROM users ORDER BY id");
        assert_eq!(node.children().len(), 3);
    }
}
