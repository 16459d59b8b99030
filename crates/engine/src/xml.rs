use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("failed to read XML file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}:{column}: malformed XML: {message}")]
    Malformed {
        path: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },
    #[error("{path}: root element must be <{expected}>, found <{found}>")]
    InvalidRoot {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },
    #[error("{path}:{line}: <{parent}> has no <{node}> child")]
    MissingNode {
        path: PathBuf,
        line: u32,
        parent: String,
        node: &'static str,
    },
    #[error("{path}:{line}: <{node}> is missing attribute '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        line: u32,
        node: String,
        attribute: &'static str,
    },
    #[error("{path}:{line}: <{node}> has invalid {field} '{value}'")]
    InvalidValue {
        path: PathBuf,
        line: u32,
        node: String,
        field: &'static str,
        value: String,
    },
}

pub(crate) fn read_text(path: &Path) -> Result<String, XmlError> {
    fs::read_to_string(path).map_err(|source| XmlError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn parse<'input>(path: &Path, text: &'input str) -> Result<Document<'input>, XmlError> {
    Document::parse(text).map_err(|error| {
        let pos = error.pos();
        XmlError::Malformed {
            path: path.to_path_buf(),
            line: pos.row,
            column: pos.col,
            message: error.to_string(),
        }
    })
}

/// Parsed document plus its source path, so every lookup error can point at a
/// file and line.
pub(crate) struct XmlDoc<'a, 'input> {
    path: &'a Path,
    doc: &'a Document<'input>,
}

impl<'a, 'input> XmlDoc<'a, 'input> {
    pub(crate) fn new(path: &'a Path, doc: &'a Document<'input>) -> Self {
        Self { path, doc }
    }

    pub(crate) fn root(&self, expected: &'static str) -> Result<Node<'a, 'input>, XmlError> {
        let root = self.doc.root_element();
        if root.tag_name().name() != expected {
            return Err(XmlError::InvalidRoot {
                path: self.path.to_path_buf(),
                expected,
                found: root.tag_name().name().to_string(),
            });
        }
        Ok(root)
    }

    pub(crate) fn child(
        &self,
        parent: Node<'a, 'input>,
        name: &'static str,
    ) -> Result<Node<'a, 'input>, XmlError> {
        children(parent, name)
            .next()
            .ok_or_else(|| XmlError::MissingNode {
                path: self.path.to_path_buf(),
                line: self.line(parent),
                parent: parent.tag_name().name().to_string(),
                node: name,
            })
    }

    pub(crate) fn attribute<T: FromStr>(
        &self,
        node: Node<'a, 'input>,
        name: &'static str,
    ) -> Result<T, XmlError> {
        let raw = node
            .attribute(name)
            .ok_or_else(|| XmlError::MissingAttribute {
                path: self.path.to_path_buf(),
                line: self.line(node),
                node: node.tag_name().name().to_string(),
                attribute: name,
            })?;
        self.value(node, name, raw)
    }

    pub(crate) fn attribute_or<T: FromStr>(
        &self,
        node: Node<'a, 'input>,
        name: &'static str,
        default: T,
    ) -> Result<T, XmlError> {
        match node.attribute(name) {
            Some(raw) => self.value(node, name, raw),
            None => Ok(default),
        }
    }

    /// Trimmed text content; empty text is an invalid value.
    pub(crate) fn text(&self, node: Node<'a, 'input>) -> Result<&'a str, XmlError> {
        let text = node.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(self.invalid(node, "text", text));
        }
        Ok(text)
    }

    pub(crate) fn value<T: FromStr>(
        &self,
        node: Node<'a, 'input>,
        field: &'static str,
        raw: &str,
    ) -> Result<T, XmlError> {
        raw.trim()
            .parse::<T>()
            .map_err(|_| self.invalid(node, field, raw))
    }

    pub(crate) fn invalid(&self, node: Node<'a, 'input>, field: &'static str, raw: &str) -> XmlError {
        XmlError::InvalidValue {
            path: self.path.to_path_buf(),
            line: self.line(node),
            node: node.tag_name().name().to_string(),
            field,
            value: raw.to_string(),
        }
    }

    pub(crate) fn line(&self, node: Node<'a, 'input>) -> u32 {
        self.doc.text_pos_at(node.range().start).row
    }
}

pub(crate) fn children<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .children()
        .filter(move |node| node.is_element() && node.tag_name().name() == name)
}

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_carry_line() {
        let path = Path::new("anim.xml");
        let text = "<animations>\n  <animation name=\"walk\" start=\"x\"/>\n</animations>";
        let doc = parse(path, text).expect("parse");
        let xml = XmlDoc::new(path, &doc);
        let root = xml.root("animations").expect("root");
        let node = xml.child(root, "animation").expect("child");

        assert_eq!(xml.attribute::<String>(node, "name").expect("name"), "walk");
        assert_eq!(xml.attribute_or(node, "speed", 0.5).expect("default"), 0.5);
        match xml.attribute::<u32>(node, "start") {
            Err(XmlError::InvalidValue { line, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            xml.attribute::<u32>(node, "end"),
            Err(XmlError::MissingAttribute { attribute: "end", .. })
        ));
    }

    #[test]
    fn rejects_wrong_root_and_malformed_text() {
        let path = Path::new("x.xml");
        let doc = parse(path, "<other/>").expect("parse");
        assert!(matches!(
            XmlDoc::new(path, &doc).root("sheets"),
            Err(XmlError::InvalidRoot { .. })
        ));
        assert!(matches!(
            parse(path, "<sheets>"),
            Err(XmlError::Malformed { .. })
        ));
    }

    #[test]
    fn escape_reserved_characters() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
