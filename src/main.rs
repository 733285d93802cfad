use std::{cell::RefCell, path::Path, rc::Rc};

use tokio::sync::oneshot;
use widget_loader::{log_error, prelude::*};

static USAGE: &str = "usage: widget-loader <loader-config.json>";

type Outcome = Result<(), TransportError>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    log::info!("starting widget-loader");
    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let local = tokio::task::LocalSet::new();
    match local.run_until(run(config_path)).await {
        Ok(content) => println!("{content}"),
        Err(_) => std::process::exit(1),
    }
}

/// Loads the widget described by the config at `config_path` and returns its
/// rendered attribute, pretty printed.
///
/// The load is the auto load when configured, else a firing of the lazy
/// trigger, else an explicit load.
async fn run(config_path: String) -> Result<String, String> {
    let config_path = Path::new(&config_path);
    let raw = tokio::fs::read_to_string(config_path)
        .await
        .map_err(|e| log_error(format!("cannot read {}: {e}", config_path.display())))?;
    let config: LoaderConfig = serde_json::from_str(&raw).map_err(log_error)?;
    let root = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let (done_tx, done_rx) = oneshot::channel::<Outcome>();
    let failure_tx = Rc::new(RefCell::new(Some(done_tx)));
    let complete_tx = failure_tx.clone();

    let target = Rc::new(WidgetTarget::with_element("#widget"));
    let loader = LoaderBuilder::new(config)
        .target(&target)
        .transport(FileTransport::with_root(root))
        .mask_factory(LogMaskFactory)
        .on_complete(move |_, params| {
            log::info!("loaded with params {params:?}");
            notify(&complete_tx, Ok(()));
        })
        .on_failure(move |error, _| notify(&failure_tx, Err(error.clone())))
        .build()
        .map_err(log_error)?;

    let handle = match (loader.initial_load(), loader.lazy_load()) {
        (Some(handle), _) => Some(handle),
        (None, Some(lazy_load)) => {
            target.fire(&lazy_load.trigger_event);
            None
        }
        (None, None) => loader.load(),
    };
    if !loader.has_loaded() {
        return Err(log_error("nothing was loaded, is an address configured?"));
    }
    if let Some(handle) = handle {
        handle.await.map_err(log_error)?.map_err(log_error)?;
    }

    match done_rx.await.map_err(log_error)? {
        Ok(()) => {
            let value = target.get(&loader.result_property()).unwrap_or_default();
            serde_json::to_string_pretty(&value).map_err(log_error)
        }
        Err(error) => Err(log_error(format!(
            "{error}: {}",
            error.message.as_deref().unwrap_or_default()
        ))),
    }
}

fn notify(slot: &RefCell<Option<oneshot::Sender<Outcome>>>, outcome: Outcome) {
    if let Some(tx) = slot.borrow_mut().take() {
        let _ = tx.send(outcome);
    }
}
