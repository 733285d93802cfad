use crate::{config::LazyLoad, utils::CheapClone};

use super::{upgrade, Loader};

/// Subscribes `loader` to its lazy trigger event on the target.
///
/// Without a live target or a `lazy_load` option, nothing is bound. The
/// subscription only holds a weak reference to the loader.
pub(super) fn bind(loader: &Loader) {
    let (target, lazy_load) = {
        let state = loader.0.state.borrow();
        (upgrade(&state.target), state.config.lazy_load.clone())
    };
    let (Some(target), Some(lazy_load)) = (target, lazy_load) else {
        return;
    };

    let LazyLoad {
        trigger_event,
        repeat,
    } = lazy_load;
    let event = trigger_event.clone();
    let shared = CheapClone::downgrade(&loader.0);
    log::debug!("loader - Lazy load armed on {trigger_event} events (repeat={repeat})");
    target.on(
        &trigger_event,
        Box::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let loader = Loader(shared);
            if !loader.has_loaded() || repeat {
                log::debug!("loader - {event} fired, loading");
                // detached
                drop(loader.load());
            } else {
                log::debug!("loader - {event} fired, already loaded");
            }
        }),
    );
}
