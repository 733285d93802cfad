use std::path::PathBuf;

use futures_util::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::{
    config::{Method, RequestOptions},
    error::TransportError,
    params::Params,
};

/// One outbound request, as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub address: String,
    /// Expected shape of the response (`"text"`, `"json"`, ...)
    pub kind: String,
    /// The merged parameters of this load
    pub data: Params,
    pub method: Method,
    pub cache: bool,
    pub timeout_ms: Option<u64>,
    pub extra: Params,
}

impl Request {
    /// Assembles a request, letting explicit `options` override `address` and `kind`.
    pub fn new(address: &str, kind: &str, data: Params, options: &RequestOptions) -> Self {
        Self {
            address: options
                .address
                .clone()
                .unwrap_or_else(|| address.to_owned()),
            kind: options.kind.clone().unwrap_or_else(|| kind.to_owned()),
            data,
            method: options.method,
            cache: options.cache,
            timeout_ms: options.timeout_ms,
            extra: options.extra.clone(),
        }
    }
}

/// The raw payload of a request, or why there is none.
pub type Response = Result<Value, TransportError>;
/// The pending [`Response`] returned by [`Transport::send`].
pub type ResponseFuture = LocalBoxFuture<'static, Response>;

/// Carries a [`Request`] somewhere and resolves with the raw payload.
///
/// `send` is called synchronously by [`Loader::load`](crate::loader::Loader::load);
/// the returned future is then driven on the current thread's `LocalSet`.
pub trait Transport {
    fn send(&self, request: Request) -> ResponseFuture;
}

impl<T: Transport + ?Sized> Transport for std::rc::Rc<T> {
    fn send(&self, request: Request) -> ResponseFuture {
        (**self).send(request)
    }
}

/// A [`Transport`] reading the request address as a local file path.
///
/// Relative addresses are resolved against `root` when one is set. Requests of
/// kind `"json"` are parsed, every other kind resolves with the file content as
/// a JSON string. Parameters are not used.
#[derive(Debug, Clone, Default)]
pub struct FileTransport {
    root: Option<PathBuf>,
}

impl FileTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, address: &str) -> PathBuf {
        let path = PathBuf::from(address);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl Transport for FileTransport {
    fn send(&self, request: Request) -> ResponseFuture {
        read_file(self.resolve(&request.address), request).boxed_local()
    }
}

async fn read_file(path: PathBuf, request: Request) -> Response {
    log::debug!(
        "file_transport - {} {} ({})",
        request.method,
        path.display(),
        request.kind
    );
    if !matches!(request.method, Method::Get | Method::Head) {
        return Err(TransportError::new("error")
            .with_status(405)
            .with_message(format!("{} is not supported on files", request.method)));
    }
    let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
        let error = TransportError::new("error").with_message(format!("{}: {e}", path.display()));
        match e.kind() {
            std::io::ErrorKind::NotFound => error.with_status(404),
            std::io::ErrorKind::PermissionDenied => error.with_status(403),
            _ => error,
        }
    })?;
    match request.kind.as_str() {
        "json" => serde_json::from_str(&text).map_err(|e| {
            TransportError::new("parsererror")
                .with_message(e.to_string())
                .with_body(Value::String(text.clone()))
        }),
        _ => Ok(Value::String(text)),
    }
}
