use serde_json::Value;

use crate::{
    error::{RenderError, TransportError},
    params::Params,
    utils::CheapClone,
};

/// Turns the raw payload of a successful request into the value written to the target.
pub type Renderer = CheapClone<dyn Fn(&Value) -> Result<Value, RenderError>>;
/// Called after the target was written, with the raw payload and the request parameters.
pub type OnComplete = CheapClone<dyn Fn(&Value, &Params)>;
/// Called when the transport fails, with its raw error and the request parameters.
pub type OnFailure = CheapClone<dyn Fn(&TransportError, &Params)>;

/// The default renderer: writes the payload as received.
pub fn identity() -> Renderer {
    CheapClone::new(render_as_is)
}

fn render_as_is(raw: &Value) -> Result<Value, RenderError> {
    Ok(raw.clone())
}
