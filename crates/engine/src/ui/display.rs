use serde_json::{json, Map, Value};
use shared::protocol::Element;

use super::Ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertStyle {
    #[default]
    Primary,
    Success,
    Warning,
    Error,
}

impl AlertStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Recursively overlays `overlay` onto `base`. Objects merge key by key;
/// anything else in `overlay` replaces what `base` had.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn chart_defaults() -> Value {
    json!({ "animation": { "duration": 0 }, "responsive": true })
}

impl Ui<'_> {
    /// `level` is clamped into 1..=6.
    pub fn heading(&mut self, level: u8, text: &str) {
        self.heading_element(level, text, None);
    }

    pub fn heading_with_id(&mut self, level: u8, text: &str, id: &str) {
        self.heading_element(level, text, Some(id));
    }

    fn heading_element(&mut self, level: u8, text: &str, id: Option<&str>) {
        let level = level.clamp(1, 6);
        self.add(
            Element::new(format!("heading{level}"))
                .with("text", text)
                .with_optional("id", id),
        );
    }

    pub fn paragraph(&mut self, text: &str) {
        self.add(Element::new("paragraph").with("text", text));
    }

    pub fn link(&mut self, text: &str, href: &str) {
        self.add(Element::new("link").with("text", text).with("href", href));
    }

    pub fn divider(&mut self) {
        self.add(Element::new("divider"));
    }

    pub fn code(&mut self, text: &str, language: Option<&str>) {
        self.add(
            Element::new("code")
                .with("text", text)
                .with_optional("language", language),
        );
    }

    pub fn alert(&mut self, text: &str, style: AlertStyle) {
        self.add(
            Element::new("alert")
                .with("text", text)
                .with("style", style.as_str()),
        );
    }

    pub fn image(&mut self, src: &str, caption: Option<&str>) {
        self.add(
            Element::new("image")
                .with("src", src)
                .with_optional("caption", caption),
        );
    }

    pub fn latex(&mut self, text: &str) {
        self.add(Element::new("latex").with("text", text));
    }

    pub fn spinner(&mut self, label: Option<&str>) {
        self.add(Element::new("spinner").with_optional("label", label));
    }

    pub fn table<H, C>(&mut self, headers: &[H], rows: &[Vec<C>])
    where
        H: AsRef<str>,
        C: Into<Value> + Clone,
    {
        let headers: Vec<Value> = headers.iter().map(|h| Value::from(h.as_ref())).collect();
        let rows: Vec<Value> = rows
            .iter()
            .map(|row| Value::Array(row.iter().cloned().map(Into::into).collect()))
            .collect();
        self.add(
            Element::new("table")
                .with("headers", headers)
                .with("data", rows),
        );
    }

    /// `columns` are grid column definitions, `rows` are records keyed by field.
    pub fn data_table(&mut self, id: &str, columns: Vec<Value>, rows: Vec<Map<String, Value>>) {
        let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
        self.add(
            Element::new("data_table")
                .with("id", id)
                .with("columns", columns)
                .with("data", rows),
        );
    }

    /// Chart.js-style config. `options` are merged over the defaults that
    /// disable animation and keep the canvas responsive.
    pub fn chart(&mut self, id: &str, data: Value, options: Value) {
        let mut merged = chart_defaults();
        deep_merge(&mut merged, options);
        self.add(
            Element::new("chart")
                .with("id", id)
                .with("data", data)
                .with("options", merged),
        );
    }
}
