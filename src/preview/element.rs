use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rendered component: host elements and text, with function components
/// already resolved away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        props: Map<String, Value>,
        #[serde(default)]
        children: Vec<ElementNode>,
    },
}

impl ElementNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            ElementNode::Element { tag, .. } => Some(tag),
            ElementNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[ElementNode] {
        match self {
            ElementNode::Element { children, .. } => children,
            ElementNode::Text(_) => &[],
        }
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        match self {
            ElementNode::Element { props, .. } => props.get(name),
            ElementNode::Text(_) => None,
        }
    }

    /// A style property, accepting both the camelCase and kebab-case key.
    pub fn style(&self, name: &str) -> Option<&str> {
        let style = self.prop("style")?.as_object()?;
        style
            .get(name)
            .or_else(|| style.get(&camel_to_kebab(name)))
            .and_then(Value::as_str)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ElementNode::Text(text) => out.push_str(text),
            ElementNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// First element with `tag`, depth first, including `self`.
    pub fn find_tag(&self, tag: &str) -> Option<&ElementNode> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find_tag(tag))
    }
}

fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
