use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Why a page could not be loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("loading failed: {0}")]
    Failed(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("load was canceled")]
    Canceled,
}

impl LoadError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl From<JsValue> for LoadError {
    fn from(value: JsValue) -> Self {
        if let Some(err) = value.dyn_ref::<js_sys::Error>() {
            return Self::Js(err.message().into());
        }
        match value.as_string() {
            Some(msg) => Self::Js(msg),
            None => Self::Js(format!("{value:?}")),
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<futures::channel::oneshot::Canceled> for LoadError {
    fn from(_: futures::channel::oneshot::Canceled) -> Self {
        Self::Canceled
    }
}
