use std::{collections::BTreeMap, fmt, sync::Arc};

use tracing::warn;

use crate::ui::Ui;

pub type PageFn = Arc<dyn Fn(&mut Ui<'_>) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Served once and then kept live over the websocket.
    Interactive,
    /// First paint only; the client never opens a socket.
    Static,
}

impl PageKind {
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

#[derive(Clone)]
pub struct Page {
    pub kind: PageKind,
    pub describe: PageFn,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page").field("kind", &self.kind).finish()
    }
}

/// Route path → page description. Built up front and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: BTreeMap<String, Page>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interactive<F>(mut self, path: &str, describe: F) -> Self
    where
        F: Fn(&mut Ui<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(path, PageKind::Interactive, describe);
        self
    }

    pub fn static_page<F>(mut self, path: &str, describe: F) -> Self
    where
        F: Fn(&mut Ui<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(path, PageKind::Static, describe);
        self
    }

    pub fn register<F>(&mut self, path: &str, kind: PageKind, describe: F)
    where
        F: Fn(&mut Ui<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let page = Page {
            kind,
            describe: Arc::new(describe),
        };
        if self.pages.insert(path.to_string(), page).is_some() {
            warn!(path, "page registered twice; keeping the latest description");
        }
    }

    pub fn get(&self, path: &str) -> Option<&Page> {
        self.pages.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.pages.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
