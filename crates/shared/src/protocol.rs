use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{domain::WidgetValue, error::ProtocolError};

pub const ERROR_DISPLAY: &str = "error_display";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ClientReady {
        path: String,
    },
    Update {
        path: String,
        widget_id: String,
        value: WidgetValue,
    },
    ButtonPress {
        path: String,
        widget_id: String,
    },
    Navigate {
        path: String,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn path(&self) -> &str {
        match self {
            Self::ClientReady { path }
            | Self::Update { path, .. }
            | Self::ButtonPress { path, .. }
            | Self::Navigate { path } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientReady { .. } => "client_ready",
            Self::Update { .. } => "update",
            Self::ButtonPress { .. } => "button_press",
            Self::Navigate { .. } => "navigate",
        }
    }
}

/// One node of the rendered tree. Serialized flat: `type`, then the
/// attributes, then nested `content` or `columns` for containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Element>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Vec<Element>>>,
}

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: BTreeMap::new(),
            content: None,
            columns: None,
        }
    }

    pub fn error_display(message: impl Into<String>, backtrace: impl Into<String>) -> Self {
        Self::new(ERROR_DISPLAY)
            .with("message", message.into())
            .with("backtrace", backtrace.into())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_optional<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn with_content(mut self, content: Vec<Element>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_columns(mut self, columns: Vec<Vec<Element>>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.text("id")
    }

    pub fn is_error_display(&self) -> bool {
        self.kind == ERROR_DISPLAY
    }

    /// Direct children, whether nested under `content` or `columns`.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content
            .iter()
            .flatten()
            .chain(self.columns.iter().flatten().flatten())
    }

    /// Depth-first walk over this element and everything nested inside it.
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavbarConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub text: String,
    pub href: String,
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTree {
    pub elements: Vec<Element>,
    pub sidebar_elements: Vec<Element>,
    pub navbar: Option<NavbarConfig>,
}

impl PageTree {
    pub fn failure(error: Element) -> Self {
        Self {
            elements: vec![error],
            sidebar_elements: Vec::new(),
            navbar: None,
        }
    }

    pub fn error(&self) -> Option<&Element> {
        match self.elements.as_slice() {
            [only] if only.is_error_display() && self.sidebar_elements.is_empty() => Some(only),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Render,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Render {
        #[serde(rename = "type")]
        kind: FrameKind,
        elements: Vec<Element>,
        sidebar_elements: Vec<Element>,
        navbar: Option<NavbarConfig>,
    },
    Error {
        error: Element,
    },
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

impl From<PageTree> for ServerMessage {
    fn from(tree: PageTree) -> Self {
        if tree.error().is_some() {
            let error = tree
                .elements
                .into_iter()
                .next()
                .unwrap_or_else(|| Element::error_display("render failed", ""));
            return Self::Error { error };
        }
        Self::Render {
            kind: FrameKind::Render,
            elements: tree.elements,
            sidebar_elements: tree.sidebar_elements,
            navbar: tree.navbar,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
