//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to our arena format.
//! This is simpler and more reliable than implementing TreeSink directly.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use scour_dom::{Document, DomTree, ElementData, NodeId, QualName};

use crate::ParseError;

/// Parser settings
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Keep text nodes that contain only whitespace. Turning this off
    /// merges inline siblings such as `<b>a</b> <i>b</i>` in text content.
    pub keep_whitespace_text: bool,
    /// Reject documents larger than this many bytes
    pub max_document_bytes: Option<usize>,
    /// URL recorded on the resulting document
    pub url: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            keep_whitespace_text: true,
            max_document_bytes: None,
            url: "about:blank".to_string(),
        }
    }
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParserOptions,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with explicit options
    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_bytes(html.as_bytes())
    }

    /// Parse raw bytes into a Document. Input must be UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, ParseError> {
        if let Some(limit) = self.options.max_document_bytes {
            if bytes.len() > limit {
                return Err(ParseError::TooLarge { size: bytes.len(), limit });
            }
        }
        if let Err(e) = std::str::from_utf8(bytes) {
            return Err(ParseError::Encoding { valid_up_to: e.valid_up_to() });
        }

        tracing::debug!("Parsing HTML document: {} ({} bytes)", self.options.url, bytes.len());

        let mut input = bytes;
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut input)?;

        let mut document = Document::empty(&self.options.url);
        self.convert(&dom.document, document.tree_mut());

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert the RcDom rooted at `handle` into `tree`.
    ///
    /// Uses an explicit stack so deeply nested markup cannot exhaust the
    /// call stack. Arena order ends up as document (pre-)order.
    fn convert(&self, handle: &Handle, tree: &mut DomTree) {
        let mut stack: Vec<(Handle, NodeId)> = handle.children.borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), tree.root()))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            let Some(id) = self.convert_node(&node, tree) else {
                continue;
            };
            tree.append_child(parent, id);

            for child in node.children.borrow().iter().rev() {
                stack.push((child.clone(), id));
            }
        }
    }

    /// Create the arena node for one RcDom node (detached)
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
        match &handle.data {
            RcNodeData::Document => None,
            RcNodeData::Doctype { name, public_id, system_id } => {
                Some(tree.create_doctype(name, public_id, system_id))
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !self.options.keep_whitespace_text && text.trim().is_empty() {
                    return None;
                }
                Some(tree.create_text(&text))
            }
            RcNodeData::Comment { contents } => Some(tree.create_comment(contents)),
            RcNodeData::Element { name, attrs, .. } => {
                let interner = tree.interner_mut();
                let qname = QualName::new(interner.intern(&name.ns), interner.intern(&name.local));
                let mut elem = ElementData::new(qname);

                for attr in attrs.borrow().iter() {
                    let attr_name = QualName::new(
                        interner.intern(&attr.name.ns),
                        interner.intern(&attr.name.local),
                    );
                    let value = attr.value.to_string();

                    // Cache id and class
                    if attr.name.local.as_ref() == "id" {
                        elem.id = Some(interner.intern(&value));
                    } else if attr.name.local.as_ref() == "class" {
                        elem.classes = value.split_whitespace()
                            .map(|class| interner.intern(class))
                            .collect();
                    }

                    elem.set_attr(attr_name, value);
                }

                Some(tree.create_element_with(elem))
            }
            // Processing instructions do not occur in HTML documents
            RcNodeData::ProcessingInstruction { .. } => None,
        }
    }
}
