use wasm_bindgen::{prelude::Closure, JsValue};
use web_sys::Element;

mod raw {
    use wasm_bindgen::{
        prelude::{wasm_bindgen, Closure},
        JsValue,
    };
    use web_sys::Element;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(extends = ::js_sys::Object)]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub type ResizeObserver;
        #[wasm_bindgen(constructor, catch)]
        pub fn new(callback: &ResizeCallback) -> Result<ResizeObserver, JsValue>;
        #[wasm_bindgen(method, catch)]
        pub fn disconnect(this: &ResizeObserver) -> Result<(), JsValue>;
        #[wasm_bindgen(method, catch)]
        pub fn observe(this: &ResizeObserver, element: &Element) -> Result<(), JsValue>;
    }
    pub type ResizeFn = dyn FnMut(JsValue, JsValue);
    pub type ResizeCallback = Closure<ResizeFn>;
}

/// Calls back whenever the watched element changes size. Watching stops
/// when this is dropped.
pub struct SizeWatcher {
    observer: raw::ResizeObserver,
    _closure: raw::ResizeCallback,
}

impl SizeWatcher {
    pub fn watch<F>(element: &Element, mut on_resize: F) -> Result<SizeWatcher, JsValue>
    where
        F: 'static + FnMut(),
    {
        let closure = Closure::wrap(
            Box::new(move |_entries: JsValue, _this: JsValue| on_resize()) as Box<raw::ResizeFn>,
        );
        let observer = raw::ResizeObserver::new(&closure)?;
        observer.observe(element)?;
        Ok(SizeWatcher {
            observer,
            _closure: closure,
        })
    }
}

impl Drop for SizeWatcher {
    fn drop(&mut self) {
        if let Err(err) = self.observer.disconnect() {
            log::warn!("could not disconnect resize observer: {err:?}");
        }
    }
}
