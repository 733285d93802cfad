#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    future::Future,
    rc::Rc,
};

use futures_util::FutureExt;
use serde_json::Value;
use tokio::{sync::oneshot, task::LocalSet};
use widget_loader::{
    prelude::*,
    transport::{Response, ResponseFuture},
};

pub fn params(value: Value) -> Params {
    to_params(value).expect("params must be a JSON object")
}

pub async fn local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

enum Reply {
    Now(Response),
    Later(oneshot::Receiver<Response>),
}

/// A transport recording every request and answering from a script.
///
/// Unscripted requests succeed immediately with `"ok"`.
#[derive(Default)]
pub struct MockTransport {
    requests: RefCell<Vec<Request>>,
    replies: RefCell<VecDeque<Reply>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply(&self, response: Response) {
        self.replies.borrow_mut().push_back(Reply::Now(response));
    }

    /// Queues a reply released only when the returned sender is used.
    pub fn defer(&self) -> oneshot::Sender<Response> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Reply::Later(rx));
        tx
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> ResponseFuture {
        self.requests.borrow_mut().push(request);
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            None => {
                let response: Response = Ok(Value::from("ok"));
                futures_util::future::ready(response).boxed_local()
            }
            Some(Reply::Now(response)) => futures_util::future::ready(response).boxed_local(),
            Some(Reply::Later(rx)) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(TransportError::new("abort")))
            }
            .boxed_local(),
        }
    }
}

/// Counts the visibility calls of the masks it builds.
#[derive(Debug, Default)]
pub struct MaskRecorder {
    pub created: Cell<usize>,
    pub shown: Cell<usize>,
    pub hidden: Cell<usize>,
    pub options: RefCell<Option<MaskOptions>>,
}

impl MaskRecorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn factory(self: &Rc<Self>) -> impl MaskFactory {
        let recorder = self.clone();
        move |options: MaskOptions| -> Box<dyn Mask> {
            recorder.created.set(recorder.created.get() + 1);
            *recorder.options.borrow_mut() = Some(options);
            Box::new(RecordingMask(recorder.clone()))
        }
    }

    pub fn visible(&self) -> bool {
        self.shown.get() > self.hidden.get()
    }
}

struct RecordingMask(Rc<MaskRecorder>);

impl Mask for RecordingMask {
    fn show(&self) {
        self.0.shown.set(self.0.shown.get() + 1);
    }
    fn hide(&self) {
        self.0.hidden.set(self.0.hidden.get() + 1);
    }
}
