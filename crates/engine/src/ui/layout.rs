use sha2::{Digest, Sha256};
use shared::{
    domain::WidgetValue,
    protocol::{Element, NavLink, NavbarConfig},
};

use super::Ui;
use crate::error::EngineError;

/// Handle passed to the body of [`Ui::columns`]; each call captures one column.
pub struct Columns<'u, 'a> {
    ui: &'u mut Ui<'a>,
    captured: Vec<Vec<Element>>,
}

impl<'a> Columns<'_, 'a> {
    pub fn column(
        &mut self,
        body: impl FnOnce(&mut Ui<'a>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let column = self.ui.capture(body)?;
        self.captured.push(column);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NavbarBuilder {
    config: NavbarConfig,
}

impl NavbarBuilder {
    pub fn brand(&mut self, title: impl Into<String>) -> &mut Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn link(&mut self, text: impl Into<String>, href: impl Into<String>) -> &mut Self {
        self.config.links.push(NavLink {
            text: text.into(),
            href: href.into(),
        });
        self
    }

    pub(super) fn finish(self) -> NavbarConfig {
        self.config
    }
}

/// `"expander_"` plus the label with whitespace runs collapsed to `_`, lowercased.
pub fn expander_id(label: &str) -> String {
    let mut id = String::from("expander_");
    let mut in_whitespace = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                id.push('_');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            id.extend(ch.to_lowercase());
        }
    }
    id
}

/// Stable across processes: derived from the ordered labels only.
pub fn tab_group_id<L: AsRef<str>>(labels: &[L]) -> String {
    let mut hasher = Sha256::new();
    for label in labels {
        hasher.update(label.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let hex: String = digest[..8].iter().map(|byte| format!("{byte:02x}")).collect();
    format!("tabs_{hex}")
}

pub fn tab_control_id(group_id: &str, label: &str) -> String {
    format!("{group_id}_{label}")
}

impl<'a> Ui<'a> {
    pub fn columns(
        &mut self,
        body: impl FnOnce(&mut Columns<'_, 'a>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let mut columns = Columns {
            ui: &mut *self,
            captured: Vec::new(),
        };
        body(&mut columns)?;
        let captured = columns.captured;
        self.add(Element::new("columns_container").with_columns(captured));
        Ok(())
    }

    /// Only the active tab's body runs. The body receives the active label.
    pub fn tabs<L: AsRef<str>>(
        &mut self,
        labels: &[L],
        body: impl FnOnce(&mut Self, &str) -> anyhow::Result<()>,
    ) -> anyhow::Result<String> {
        let labels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        let Some(first) = labels.first() else {
            return Err(EngineError::EmptyTabs.into());
        };

        let group_id = tab_group_id(&labels);
        let mut active = match self.stored(&group_id) {
            Some(WidgetValue::Text(stored)) if labels.contains(&stored) => stored,
            _ => first.clone(),
        };
        for label in &labels {
            if self.take_action(&tab_control_id(&group_id, label)) {
                active = label.clone();
                self.state.write(group_id.clone(), WidgetValue::Text(active.clone()));
            }
        }

        let content = self.capture(|ui| body(ui, &active))?;
        self.add(
            Element::new("tabs")
                .with("id", group_id)
                .with("labels", labels)
                .with("active_tab", active.clone())
                .with_content(content),
        );
        Ok(active)
    }

    /// Returns whether the body was shown this pass.
    pub fn expander(
        &mut self,
        label: &str,
        expanded_by_default: bool,
        body: impl FnOnce(&mut Self) -> anyhow::Result<()>,
    ) -> anyhow::Result<bool> {
        let id = expander_id(label);
        let mut expanded = self
            .stored(&id)
            .map(|value| value.as_bool())
            .unwrap_or(expanded_by_default);
        if self.take_action(&id) {
            expanded = !expanded;
            self.state.write(id.clone(), WidgetValue::Bool(expanded));
        }

        let content = if expanded {
            self.capture(body)?
        } else {
            Vec::new()
        };
        self.add(
            Element::new("expander")
                .with("id", id)
                .with("label", label)
                .with("expanded", expanded)
                .with_content(content),
        );
        Ok(expanded)
    }

    pub fn form_group(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let content = self.capture(body)?;
        self.add(
            Element::new("form_group")
                .with("label", label)
                .with_content(content),
        );
        Ok(())
    }
}
