//! Capture specifications and record building
//!
//! A [`CaptureSpec`] says which facets of a matched element end up in its
//! [`ResultRecord`]. Fields are tri-state so a spec set on an inner node can
//! override only what it names; everything else is inherited from the
//! enclosing nodes, falling back to [`Capture::default`].

use scour_dom::{DomTree, HtmlSerializer, NodeId};
use serde::{Deserialize, Serialize};

use crate::store::{ChildMap, ResultRecord};
use crate::CaptureError;

/// Partial capture configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<bool>,
}

impl CaptureSpec {
    /// Spec that sets nothing
    pub const fn new() -> Self {
        Self { name: None, attributes: None, text_content: None, inner_html: None }
    }

    /// Spec that turns every facet on
    pub const fn everything() -> Self {
        Self {
            name: Some(true),
            attributes: Some(true),
            text_content: Some(true),
            inner_html: Some(true),
        }
    }

    /// Only the text content, every other facet off
    pub const fn text_only() -> Self {
        Self {
            name: Some(false),
            attributes: Some(false),
            text_content: Some(true),
            inner_html: Some(false),
        }
    }

    /// Only the inner HTML, every other facet off
    pub const fn html_only() -> Self {
        Self {
            name: Some(false),
            attributes: Some(false),
            text_content: Some(false),
            inner_html: Some(true),
        }
    }

    pub const fn name(mut self, on: bool) -> Self {
        self.name = Some(on);
        self
    }

    pub const fn attributes(mut self, on: bool) -> Self {
        self.attributes = Some(on);
        self
    }

    pub const fn text_content(mut self, on: bool) -> Self {
        self.text_content = Some(on);
        self
    }

    pub const fn inner_html(mut self, on: bool) -> Self {
        self.inner_html = Some(on);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    /// Overlay `deeper` on top of `self`: fields set in `deeper` win
    pub fn merge(self, deeper: CaptureSpec) -> CaptureSpec {
        CaptureSpec {
            name: deeper.name.or(self.name),
            attributes: deeper.attributes.or(self.attributes),
            text_content: deeper.text_content.or(self.text_content),
            inner_html: deeper.inner_html.or(self.inner_html),
        }
    }

    /// Fill unset fields from the defaults
    pub fn resolve(self) -> Capture {
        let d = Capture::default();
        Capture {
            name: self.name.unwrap_or(d.name),
            attributes: self.attributes.unwrap_or(d.attributes),
            text_content: self.text_content.unwrap_or(d.text_content),
            inner_html: self.inner_html.unwrap_or(d.inner_html),
        }
    }
}

/// Fully resolved capture flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capture {
    pub name: bool,
    pub attributes: bool,
    pub text_content: bool,
    pub inner_html: bool,
}

impl Default for Capture {
    fn default() -> Self {
        Self {
            name: true,
            attributes: true,
            text_content: true,
            inner_html: false,
        }
    }
}

/// Build the record for one matched element
pub(crate) fn build_record(
    tree: &DomTree,
    node: NodeId,
    capture: Capture,
    label: &str,
) -> Result<ResultRecord, CaptureError> {
    let elem = tree.get(node)
        .ok_or(CaptureError::NodeNotFound(node))?
        .as_element()
        .ok_or(CaptureError::NotAnElement(node))?;

    let attributes = capture.attributes.then(|| {
        elem.attrs.iter()
            .map(|a| (tree.resolve(a.name.local).to_string(), a.value.clone()))
            .collect()
    });

    Ok(ResultRecord {
        label: label.to_string(),
        name: capture.name.then(|| tree.resolve(elem.name.local).to_string()),
        attributes,
        text_content: capture.text_content.then(|| tree.text_content(node)),
        inner_html: capture.inner_html.then(|| HtmlSerializer::new().serialize_inner(tree, node)),
        children: ChildMap::new(),
    })
}
