//! Element tree for Confluence storage format.
//!
//! Storage format is XHTML with `ac:` and `ri:` prefixed elements. The tree
//! keeps prefixed names as-is (`ac:structured-macro`) and uses the
//! text/tail model so mixed content survives parsing.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::convert_html_entities;
use crate::error::MarkupError;

/// Namespace declarations added to the synthetic root element.
const NAMESPACES: &[(&str, &str)] = &[
    ("ac", "http://www.atlassian.com/schema/confluence/4/ac/"),
    ("ri", "http://www.atlassian.com/schema/confluence/4/ri/"),
];

/// Element in a parsed storage document.
#[derive(Debug, Clone, Default)]
pub(crate) struct TreeNode {
    /// Qualified tag name.
    pub tag: String,
    /// Text before the first child.
    pub text: String,
    /// Text after the closing tag.
    pub tail: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Value of the `ac:parameter` child named `name`, for macros.
    pub fn macro_parameter(&self, name: &str) -> Option<String> {
        self.children
            .iter()
            .find(|child| child.tag == "ac:parameter" && child.attr("ac:name") == Some(name))
            .map(TreeNode::raw_text)
    }

    /// All text inside the element, whitespace untouched, tail excluded.
    pub fn raw_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.raw_text());
            out.push_str(&child.tail);
        }
        out
    }
}

/// Parse a storage-format fragment into a tree under a synthetic `root` node.
///
/// # Errors
///
/// Returns [`MarkupError::XmlParse`] when the fragment is not well-formed.
pub(crate) fn parse_storage(html: &str) -> Result<TreeNode, MarkupError> {
    let html = convert_html_entities(html);
    let namespace_decls = NAMESPACES
        .iter()
        .map(|(prefix, uri)| format!(r#"xmlns:{prefix}="{uri}""#))
        .collect::<Vec<_>>()
        .join(" ");
    let wrapped = format!("<root {namespace_decls}>{html}</root>");

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    // Skip the synthetic root start tag
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => break,
            Event::Eof => return Ok(TreeNode::default()),
            _ => {}
        }
        buf.clear();
    }

    let mut root = parse_children(&mut reader, "root")?;
    root.tag = "root".to_owned();
    Ok(root)
}

fn parse_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent_tag: &str,
) -> Result<TreeNode, MarkupError> {
    let mut buf = Vec::new();
    let mut node = TreeNode::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_name(reader, e.name().as_ref());
                let attrs = decode_attrs(reader, &e);
                let mut child = parse_children(reader, &tag)?;
                child.tag = tag;
                child.attrs = attrs;
                node.children.push(child);
            }
            Event::Empty(e) => {
                node.children.push(TreeNode {
                    tag: decode_name(reader, e.name().as_ref()),
                    attrs: decode_attrs(reader, &e),
                    ..Default::default()
                });
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                append_text(&mut node, &decode_entity(&entity));
            }
            Event::CData(e) => {
                append_text(&mut node, &String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                if decode_name(reader, e.name().as_ref()) == parent_tag {
                    return Ok(node);
                }
            }
            Event::Eof => return Ok(node),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> HashMap<String, String> {
    e.attributes()
        .flatten()
        .filter_map(|attr| {
            let key = decode_name(reader, attr.key.as_ref());
            if key.starts_with("xmlns") {
                return None;
            }
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            Some((key, value))
        })
        .collect()
}

/// Append text to the node's text, or to its last child's tail.
fn append_text(node: &mut TreeNode, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Resolve an XML entity or character reference.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_mixed_content() {
        let tree = parse_storage("<p><strong>Bold</strong> text</p>").unwrap();

        let p = &tree.children[0];
        assert_eq!(p.tag, "p");
        assert!(p.text.is_empty());
        assert_eq!(p.children[0].tag, "strong");
        assert_eq!(p.children[0].text, "Bold");
        assert_eq!(p.children[0].tail, " text");
    }

    #[test]
    fn test_parse_prefixed_elements_and_attrs() {
        let tree = parse_storage(
            r#"<ac:structured-macro ac:name="code"><ac:parameter ac:name="language">rust</ac:parameter><ac:plain-text-body><![CDATA[fn main() {}]]></ac:plain-text-body></ac:structured-macro>"#,
        )
        .unwrap();

        let code = &tree.children[0];
        assert_eq!(code.tag, "ac:structured-macro");
        assert_eq!(code.attr("ac:name"), Some("code"));
        assert_eq!(code.macro_parameter("language").as_deref(), Some("rust"));
        assert_eq!(
            code.child("ac:plain-text-body").unwrap().raw_text(),
            "fn main() {}"
        );
    }

    #[test]
    fn test_parse_entities() {
        let tree = parse_storage("<p>a&nbsp;&amp;&#x41;&#66;</p>").unwrap();
        assert_eq!(tree.children[0].text, "a\u{00a0}&AB");
    }

    #[test]
    fn test_parse_self_closing() {
        let tree = parse_storage("<p>Before<br />After</p>").unwrap();
        let p = &tree.children[0];
        assert_eq!(p.text, "Before");
        assert_eq!(p.children[0].tag, "br");
        assert_eq!(p.children[0].tail, "After");
    }

    #[test]
    fn test_parse_top_level_text() {
        let tree = parse_storage("plain <em>words</em>").unwrap();
        assert_eq!(tree.text, "plain ");
        assert_eq!(tree.raw_text(), "plain words");
    }

    #[test]
    fn test_parse_mismatched_tags_fails() {
        assert!(parse_storage("<p><strong>broken</p>").is_err());
    }
}
