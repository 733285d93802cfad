//! # Loader
//!
//! Attaches to a widget ([`Target`]) to fetch content through a [`Transport`] and
//! install it into one of the widget's attributes.
//!
//! Every call to [`Loader::load_with`] merges its parameters into the remembered
//! ones, in this order, rightmost winning:
//!
//! `last_params <- append_params <- call params`
//!
//! The merged set is sent with the request and kept as the new `last_params`,
//! so a later [`Loader::load`] without parameters replays the cumulative history.
//!
//! A loader built with `auto_load` loads once right away. Otherwise it seeds
//! `last_params` with the initial parameters and, if a `lazy_load` trigger is
//! configured, loads when that event fires on the target.
//!
//! Requests run as `tokio::task::spawn_local` tasks, so loading requires a
//! running [`tokio::task::LocalSet`]. Overlapping loads are not serialized:
//! whichever completes last wins the final write to the target.
//!
//! ```rust
//! use std::rc::Rc;
//! use widget_loader::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! # let dir = std::env::temp_dir();
//! # std::fs::write(dir.join("loader-doc.txt"), "<p>hi</p>").unwrap();
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async move {
//!         let target = Rc::new(WidgetTarget::with_element("#panel"));
//!         let loader = LoaderBuilder::new(LoaderConfig::content("loader-doc.txt"))
//!             .target(&target)
//!             .transport(FileTransport::with_root(dir))
//!             .build()
//!             .unwrap();
//!
//!         loader.initial_load().unwrap().await.unwrap().unwrap();
//!         assert_eq!(target.get("content"), Some("<p>hi</p>".into()));
//!     })
//!     .await;
//! # }
//! ```

mod hooks;
mod lazy;

use std::cell::RefCell;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    config::{LazyLoad, LoaderConfig, RequestOptions},
    error::{ConfigError, LoaderError, RenderError, Result, TransportError},
    mask::{Mask, MaskConfig, MaskFactory},
    params::{self, Params},
    target::Target,
    transport::{Request, Transport},
    utils::{CheapClone, WeakCheapClone},
};

pub use hooks::{identity, OnComplete, OnFailure, Renderer};

/// Completion of one dispatched request.
///
/// Resolves to `Err` when the success path could not run to its end (failing
/// renderer, missing target). Transport failures are routed to `on_failure`
/// and resolve to `Ok`.
pub type LoadHandle = JoinHandle<Result<()>>;

struct LoaderState {
    config: LoaderConfig,
    target: Option<WeakCheapClone<dyn Target>>,
    renderer: Renderer,
    on_complete: Option<OnComplete>,
    on_failure: Option<OnFailure>,
    last_params: Params,
    has_loaded: bool,
    mask: Option<CheapClone<dyn Mask>>,
    initial_load: Option<LoadHandle>,
}

struct Shared {
    state: RefCell<LoaderState>,
    transport: CheapClone<dyn Transport>,
}

/// A content loader bound to one widget.
///
/// Cloning is cheap and yields another handle on the same loader.
#[derive(Clone)]
pub struct Loader(CheapClone<Shared>);

/// Assembles a [`Loader`] from a [`LoaderConfig`] and its collaborators.
pub struct LoaderBuilder {
    config: LoaderConfig,
    target: Option<WeakCheapClone<dyn Target>>,
    transport: Option<CheapClone<dyn Transport>>,
    mask_factory: Option<CheapClone<dyn MaskFactory>>,
    renderer: Renderer,
    on_complete: Option<OnComplete>,
    on_failure: Option<OnFailure>,
}

impl LoaderBuilder {
    /// Starts from `config`, with the identity renderer and no callbacks.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            target: None,
            transport: None,
            mask_factory: None,
            renderer: identity(),
            on_complete: None,
            on_failure: None,
        }
    }

    /// Binds the loader to `target`. Only a weak reference is kept.
    pub fn target<T: Target + 'static>(mut self, target: &CheapClone<T>) -> Self {
        self.target = Some(downgrade_target(target));
        self
    }

    /// The transport carrying every request. Required.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(CheapClone::new(transport));
        self
    }

    /// Required when the config enables a mask and a target is set.
    pub fn mask_factory<F: MaskFactory + 'static>(mut self, factory: F) -> Self {
        self.mask_factory = Some(CheapClone::new(factory));
        self
    }

    /// Transforms the raw payload before it is written. Defaults to the identity.
    pub fn renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, RenderError> + 'static,
    {
        self.renderer = CheapClone::new(renderer);
        self
    }

    /// Called with the raw payload and the sent parameters after each successful write.
    pub fn on_complete<F: Fn(&Value, &Params) + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(CheapClone::new(callback));
        self
    }

    /// Called with the raw transport error and the sent parameters.
    pub fn on_failure<F: Fn(&TransportError, &Params) + 'static>(mut self, callback: F) -> Self {
        self.on_failure = Some(CheapClone::new(callback));
        self
    }

    /// Validates the configuration, builds the mask and runs the initial load
    /// or arms the lazy trigger.
    ///
    /// With `auto_load` and an address, this dispatches a request and must
    /// therefore run inside a [`tokio::task::LocalSet`].
    pub fn build(self) -> Result<Loader> {
        self.config.validate()?;
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;

        let mask = match (upgrade(&self.target), &self.config.mask) {
            (Some(target), mask_config) if mask_config.is_enabled() => {
                let factory = self.mask_factory.ok_or(ConfigError::MissingMaskFactory)?;
                mask_config
                    .options_for(target.element())
                    .map(|options| CheapClone::<dyn Mask>::from(factory.create(options)))
            }
            _ => None,
        };

        log::info!(
            "loader ({}) - created, auto_load={} lazy_load={:?} mask={}",
            self.config.address().unwrap_or("<no address>"),
            self.config.auto_load,
            self.config.lazy_load,
            mask.is_some()
        );

        let loader = Loader(CheapClone::new(Shared {
            state: RefCell::new(LoaderState {
                config: self.config,
                target: self.target,
                renderer: self.renderer,
                on_complete: self.on_complete,
                on_failure: self.on_failure,
                last_params: Params::new(),
                has_loaded: false,
                mask,
                initial_load: None,
            }),
            transport,
        }));
        loader.init();
        Ok(loader)
    }
}

impl Loader {
    fn init(&self) {
        let (auto_load, initial_params) = {
            let state = self.0.state.borrow();
            (state.config.auto_load, state.config.initial_params.clone())
        };
        if auto_load {
            let handle = self.load_with(initial_params);
            self.0.state.borrow_mut().initial_load = handle;
        } else {
            params::shallow_merge(&mut self.0.state.borrow_mut().last_params, &initial_params);
            lazy::bind(self);
        }
    }

    /// Takes the handle of the load dispatched at construction, if any.
    pub fn initial_load(&self) -> Option<LoadHandle> {
        self.0.state.borrow_mut().initial_load.take()
    }

    /// Loads with the remembered parameters only.
    pub fn load(&self) -> Option<LoadHandle> {
        self.load_with(Params::new())
    }

    /// Merges `call_params` over the remembered and appended parameters and
    /// dispatches one request with the result.
    ///
    /// Returns `None` without doing anything else when no address is set.
    pub fn load_with(&self, call_params: Params) -> Option<LoadHandle> {
        let (request, params) = {
            let mut state = self.0.state.borrow_mut();
            let LoaderState {
                config,
                last_params,
                ..
            } = &mut *state;
            params::deep_merge(last_params, &config.append_params);
            params::deep_merge(last_params, &call_params);
            let params = last_params.clone();

            let Some(address) = config.address() else {
                log::debug!("loader - No address, load skipped");
                return None;
            };
            let request = Request::new(
                address,
                &config.request_kind,
                params.clone(),
                &config.request_options,
            );
            (request, params)
        };

        self.on_before_load();
        self.0.state.borrow_mut().has_loaded = true;

        log::debug!(
            "loader ({}) - Dispatching {} request",
            request.address,
            request.method
        );
        let response = self.0.transport.send(request);
        let shared = CheapClone::downgrade(&self.0);
        Some(tokio::task::spawn_local(async move {
            let response = response.await;
            let Some(shared) = shared.upgrade() else {
                log::warn!("loader - Dropped before its request completed, response discarded");
                return Ok(());
            };
            let loader = Loader(shared);
            match response {
                Ok(data) => loader.on_load_success(data, params),
                Err(error) => {
                    loader.on_load_failure(error, params);
                    Ok(())
                }
            }
        }))
    }

    /// Shows the mask, if the loader has one.
    pub fn on_before_load(&self) {
        let mask = self.0.state.borrow().mask.clone();
        if let Some(mask) = mask {
            mask.show();
        }
    }

    /// Writes the rendered `data` to the target, hides the mask, then calls `on_complete`.
    ///
    /// A failing renderer or a missing target aborts before anything is written.
    pub fn on_load_success(&self, data: Value, params: Params) -> Result<()> {
        let (target, property, renderer, mask, on_complete) = {
            let state = self.0.state.borrow();
            (
                upgrade(&state.target),
                state.config.result_property.clone(),
                state.renderer.clone(),
                state.mask.clone(),
                state.on_complete.clone(),
            )
        };
        let value = renderer(&data)?;
        let target = target.ok_or_else(|| LoaderError::TargetUnavailable(property.clone()))?;
        log::debug!("loader - Loaded, writing {property}");
        target.set(&property, value);

        if let Some(mask) = mask {
            mask.hide();
        }
        if let Some(on_complete) = on_complete {
            on_complete(&data, &params);
        }
        Ok(())
    }

    /// Hands `error` to `on_failure`, if configured. Nothing is written to the target.
    pub fn on_load_failure(&self, error: TransportError, params: Params) {
        let (on_failure, mask) = {
            let state = self.0.state.borrow();
            let mask = if state.config.hide_mask_on_failure {
                state.mask.clone()
            } else {
                None
            };
            (state.on_failure.clone(), mask)
        };
        if let Some(mask) = mask {
            mask.hide();
        }
        match on_failure {
            Some(on_failure) => on_failure(&error, &params),
            None => log::debug!("loader - Load failed without failure callback: {error}"),
        }
    }

    /// Whether a request was ever dispatched by this loader.
    pub fn has_loaded(&self) -> bool {
        self.0.state.borrow().has_loaded
    }

    /// The parameters of the most recent merge.
    pub fn last_params(&self) -> Params {
        self.0.state.borrow().last_params.clone()
    }

    /// A snapshot of the current configuration.
    pub fn config(&self) -> LoaderConfig {
        self.0.state.borrow().config.clone()
    }

    /// The address, `None` when unset or empty.
    pub fn address(&self) -> Option<String> {
        self.0.state.borrow().config.address().map(str::to_owned)
    }

    /// Applies to the next load.
    pub fn set_address(&self, address: Option<String>) {
        self.0.state.borrow_mut().config.address = address;
    }

    /// The target attribute receiving results.
    pub fn result_property(&self) -> String {
        self.0.state.borrow().config.result_property.clone()
    }

    /// Applies to completions handled from now on, including outstanding ones.
    pub fn set_result_property(&self, property: impl Into<String>) {
        self.0.state.borrow_mut().config.result_property = property.into();
    }

    /// The target, while it is still alive.
    pub fn target(&self) -> Option<CheapClone<dyn Target>> {
        upgrade(&self.0.state.borrow().target)
    }

    /// Rebinds the loader. The mask and lazy trigger stay bound to the previous target.
    pub fn set_target<T: Target + 'static>(&self, target: &CheapClone<T>) {
        self.0.state.borrow_mut().target = Some(downgrade_target(target));
    }

    /// The lazy trigger given at construction.
    pub fn lazy_load(&self) -> Option<LazyLoad> {
        self.0.state.borrow().config.lazy_load.clone()
    }

    /// The recorded mask configuration.
    pub fn mask_config(&self) -> MaskConfig {
        self.0.state.borrow().config.mask.clone()
    }

    /// Records a new mask configuration. The mask itself is only built at construction.
    pub fn set_mask_config(&self, mask: impl Into<MaskConfig>) {
        self.0.state.borrow_mut().config.mask = mask.into();
    }

    /// Applies to the next load.
    pub fn set_request_kind(&self, kind: impl Into<String>) {
        self.0.state.borrow_mut().config.request_kind = kind.into();
    }

    /// Replaces the transport overrides of the next loads.
    pub fn set_request_options(&self, options: RequestOptions) {
        self.0.state.borrow_mut().config.request_options = options;
    }

    /// Parameters re-applied to every load.
    pub fn append_params(&self) -> Params {
        self.0.state.borrow().config.append_params.clone()
    }

    /// Replaces the parameters re-applied to every load.
    pub fn set_append_params(&self, params: Params) {
        self.0.state.borrow_mut().config.append_params = params;
    }

    /// Replaces the renderer used by the next completions.
    pub fn set_renderer<F>(&self, renderer: F)
    where
        F: Fn(&Value) -> Result<Value, RenderError> + 'static,
    {
        self.0.state.borrow_mut().renderer = CheapClone::new(renderer);
    }

    /// Replaces the success callback.
    pub fn set_on_complete<F: Fn(&Value, &Params) + 'static>(&self, callback: F) {
        self.0.state.borrow_mut().on_complete = Some(CheapClone::new(callback));
    }

    /// Replaces the failure callback.
    pub fn set_on_failure<F: Fn(&TransportError, &Params) + 'static>(&self, callback: F) {
        self.0.state.borrow_mut().on_failure = Some(CheapClone::new(callback));
    }
}

impl core::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Loader")
            .field("config", &state.config)
            .field("last_params", &state.last_params)
            .field("has_loaded", &state.has_loaded)
            .field("has_mask", &state.mask.is_some())
            .finish_non_exhaustive()
    }
}

fn downgrade_target<T: Target + 'static>(target: &CheapClone<T>) -> WeakCheapClone<dyn Target> {
    let target: CheapClone<dyn Target> = target.clone();
    CheapClone::downgrade(&target)
}

fn upgrade(target: &Option<WeakCheapClone<dyn Target>>) -> Option<CheapClone<dyn Target>> {
    target.as_ref().and_then(WeakCheapClone::upgrade)
}
