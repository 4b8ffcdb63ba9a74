//! Element-tree builder handed to page descriptions.
//!
//! Every component call appends to the active output list. Layout containers
//! open a capture frame on an explicit stack, run their nested block against
//! it, and pop the frame to obtain their children, so nested content never
//! lands in a sibling's or the parent's list.

mod display;
mod inputs;
mod layout;

use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

use chrono::{Local, NaiveDate};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::WidgetValue,
    protocol::{Element, NavbarConfig, PageTree},
};
use tracing::{debug, error};

use crate::{pages::PageFn, pending::PendingActionSet, session::PageState};

pub use display::AlertStyle;
pub use inputs::Theme;
pub use layout::{Columns, NavbarBuilder};

pub struct Ui<'a> {
    state: &'a mut PageState,
    pending: &'a mut PendingActionSet,
    main: Vec<Element>,
    side: Vec<Element>,
    captures: Vec<Vec<Element>>,
    in_sidebar: bool,
    navbar: Option<NavbarConfig>,
    today: NaiveDate,
}

impl<'a> Ui<'a> {
    pub fn new(state: &'a mut PageState, pending: &'a mut PendingActionSet) -> Self {
        Self {
            state,
            pending,
            main: Vec::new(),
            side: Vec::new(),
            captures: Vec::new(),
            in_sidebar: false,
            navbar: None,
            today: Local::now().date_naive(),
        }
    }

    /// Local date read once when the pass starts; date widget defaults use it
    /// so a pass spanning midnight stays consistent.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn finish(self) -> PageTree {
        PageTree {
            elements: self.main,
            sidebar_elements: self.side,
            navbar: self.navbar,
        }
    }

    /// Appends an element of any kind to the active output list.
    pub fn add(&mut self, element: Element) {
        debug!(kind = %element.kind, depth = self.captures.len(), sidebar = self.in_sidebar, "adding element");
        self.output().push(element);
    }

    fn output(&mut self) -> &mut Vec<Element> {
        if let Some(frame) = self.captures.last_mut() {
            frame
        } else if self.in_sidebar {
            &mut self.side
        } else {
            &mut self.main
        }
    }

    /// Runs `body` against a fresh output frame and returns what it produced.
    /// The frame is popped even when `body` fails.
    pub fn capture(
        &mut self,
        body: impl FnOnce(&mut Self) -> anyhow::Result<()>,
    ) -> anyhow::Result<Vec<Element>> {
        self.captures.push(Vec::new());
        let outcome = body(self);
        let captured = self.captures.pop().unwrap_or_default();
        outcome.map(|()| captured)
    }

    /// Routes top-level output to the sidebar while `body` runs. Inside a
    /// container the capture frame still wins.
    pub fn sidebar(&mut self, body: impl FnOnce(&mut Self) -> anyhow::Result<()>) -> anyhow::Result<()> {
        let previous = std::mem::replace(&mut self.in_sidebar, true);
        let outcome = body(self);
        self.in_sidebar = previous;
        outcome
    }

    pub fn navbar(&mut self, build: impl FnOnce(&mut NavbarBuilder)) {
        let mut builder = NavbarBuilder::default();
        build(&mut builder);
        self.navbar = Some(builder.finish());
    }

    pub fn state(&self) -> &PageState {
        &*self.state
    }

    pub fn value(&self, widget_id: &str) -> Option<&WidgetValue> {
        self.state.get(widget_id)
    }

    /// Explicit write from page code, e.g. a counter bumped by a button.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<WidgetValue>) {
        self.state.write(key, value.into());
    }

    pub fn memoize<T, F>(&mut self, key: &str, producer: F) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        Ok(self.state.memoize(key, producer)?)
    }

    /// Attaches a validation message to the latest element with this id in
    /// the active output list.
    pub fn mark_invalid(&mut self, widget_id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        match self
            .output()
            .iter_mut()
            .rev()
            .find(|element| element.id() == Some(widget_id))
        {
            Some(element) => {
                element.set("error", message);
                true
            }
            None => false,
        }
    }

    fn stored(&self, widget_id: &str) -> Option<WidgetValue> {
        self.state.get(widget_id).cloned()
    }

    fn take_action(&mut self, widget_id: &str) -> bool {
        self.pending.test_and_clear(widget_id)
    }
}

thread_local! {
    static RENDERING: Cell<bool> = const { Cell::new(false) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Panics raised while a page renders record their backtrace at the panic
/// site instead of printing; everything else goes to the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if RENDERING.with(Cell::get) {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

fn error_trace(err: &anyhow::Error) -> String {
    match err.backtrace().status() {
        BacktraceStatus::Captured => err.backtrace().to_string(),
        _ => format!("{err:?}"),
    }
}

/// Executes one render pass. Failures never escape: an `Err` or a panic from
/// the page description becomes a single `error_display` element. Actions
/// nobody consumed are dropped afterwards.
pub fn render_page(
    describe: &PageFn,
    state: &mut PageState,
    pending: &mut PendingActionSet,
) -> PageTree {
    install_panic_hook();
    RENDERING.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut ui = Ui::new(state, pending);
        describe(&mut ui).map(|()| ui.finish())
    }));
    RENDERING.with(|flag| flag.set(false));

    let tree = match outcome {
        Ok(Ok(tree)) => tree,
        Ok(Err(err)) => {
            let message = format!("{err:#}");
            error!(error = %message, "page description failed");
            PageTree::failure(Element::error_display(message, error_trace(&err)))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let trace = PANIC_TRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(|| Backtrace::force_capture().to_string());
            error!(error = %message, "page description panicked");
            PageTree::failure(Element::error_display(message, trace))
        }
    };

    let dropped = pending.sweep();
    if !dropped.is_empty() {
        debug!(?dropped, "dropping actions for widgets missing from this render");
    }
    tree
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "page description panicked".to_string()
    }
}

#[cfg(test)]
#[path = "../tests/ui_tests.rs"]
mod tests;
