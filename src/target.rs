use std::{cell::RefCell, collections::HashMap};

use serde_json::Value;

use crate::utils::CheapClone;

pub type EventHandler = Box<dyn Fn()>;

/// The widget a loader writes into.
///
/// Handles are shared with the rest of the widget system, so every method
/// takes `&self` and implementations use interior mutability.
pub trait Target {
    /// Reads the attribute `name`
    fn get(&self, name: &str) -> Option<Value>;
    /// Writes the attribute `name`
    fn set(&self, name: &str, value: Value);
    /// Calls `handler` every time `event` fires on this target
    fn on(&self, event: &str, handler: EventHandler);
    /// Identifies the rendered element of this target, if it has one
    fn element(&self) -> Option<String>;
}

/// An in-memory [`Target`]: an attribute map plus per-event handler lists.
///
/// Events are delivered synchronously by [`WidgetTarget::fire`].
#[derive(Default)]
pub struct WidgetTarget {
    element: Option<String>,
    attributes: RefCell<HashMap<String, Value>>,
    subscribers: RefCell<HashMap<String, Vec<CheapClone<dyn Fn()>>>>,
}

impl WidgetTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(element: impl Into<String>) -> Self {
        Self {
            element: Some(element.into()),
            ..Default::default()
        }
    }

    /// Invokes every handler subscribed to `event`, returning how many ran.
    ///
    /// Handlers may subscribe or fire again while running; those changes apply
    /// from the next call.
    pub fn fire(&self, event: &str) -> usize {
        let handlers = self
            .subscribers
            .borrow()
            .get(event)
            .cloned()
            .unwrap_or_default();
        log::debug!(
            "widget_target - Firing {event} event to {} subscribers",
            handlers.len()
        );
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers
            .borrow()
            .get(event)
            .map(|v| v.len())
            .unwrap_or_default()
    }
}

impl Target for WidgetTarget {
    fn get(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: Value) {
        log::debug!("widget_target - Setting attribute {name}");
        self.attributes.borrow_mut().insert(name.to_owned(), value);
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.subscribers
            .borrow_mut()
            .entry(event.to_owned())
            .or_default()
            .push(CheapClone::from(handler));
        log::debug!("widget_target - Subscribed to {event} events");
    }

    fn element(&self) -> Option<String> {
        self.element.clone()
    }
}

impl core::fmt::Debug for WidgetTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetTarget")
            .field("element", &self.element)
            .field("attributes", &self.attributes)
            .field(
                "subscribers",
                &self
                    .subscribers
                    .borrow()
                    .iter()
                    .map(|(event, handlers)| (event.clone(), handlers.len()))
                    .collect::<HashMap<_, _>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use serde_json::json;

    #[test]
    fn attributes_round_trip() {
        let target = WidgetTarget::with_element("#panel");
        assert_eq!(target.get("content"), None);
        target.set("content", json!("hello"));
        assert_eq!(target.get("content"), Some(json!("hello")));
        assert_eq!(target.element().as_deref(), Some("#panel"));
    }

    #[test]
    fn fire_reaches_only_matching_subscribers() {
        let target = WidgetTarget::new();
        let shown = CheapClone::new(Cell::new(0));
        let counter = shown.clone();
        target.on("show", Box::new(move || counter.set(counter.get() + 1)));

        assert_eq!(target.fire("hide"), 0);
        assert_eq!(target.fire("show"), 1);
        assert_eq!(target.fire("show"), 1);
        assert_eq!(shown.get(), 2);
        assert_eq!(target.subscriber_count("show"), 1);
    }

    #[test]
    fn handlers_may_subscribe_while_firing() {
        let target = CheapClone::new(WidgetTarget::new());
        let weak = CheapClone::downgrade(&target);
        target.on(
            "show",
            Box::new(move || {
                if let Some(target) = weak.upgrade() {
                    target.on("show", Box::new(|| ()));
                }
            }),
        );
        assert_eq!(target.fire("show"), 1);
        assert_eq!(target.subscriber_count("show"), 2);
    }
}
