//! Detects when the user scrolled close to the end of the list and asks for
//! the next page.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use gloo_timers::callback::Timeout;
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::{Element, HtmlElement, Window};
use yew::prelude::*;

use crate::{controller::ScrollController, resize::SizeWatcher};

#[derive(Default)]
struct ScrollShared {
    host: NodeRef,
    page_loaded: Cell<u32>,
    armed: Cell<bool>,
    use_window: Cell<bool>,
}

/// Shared access to an [`InfiniteScroll`]: its page counter, whether it may
/// request more pages, and its scroll position.
#[derive(Clone, Default)]
pub struct ScrollHandle {
    inner: Rc<ScrollShared>,
}

impl PartialEq for ScrollHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ScrollController for ScrollHandle {
    fn reset_to_top(&self) {
        if self.inner.use_window.get() {
            if let Some(window) = web_sys::window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
        } else if let Some(host) = self.inner.host.cast::<Element>() {
            host.set_scroll_top(0);
        }
    }

    fn set_page_counter(&self, page: u32) {
        self.inner.page_loaded.set(page);
    }

    fn page_counter(&self) -> u32 {
        self.inner.page_loaded.get()
    }

    fn set_armed(&self, armed: bool) {
        self.inner.armed.set(armed);
    }
}

impl ScrollHandle {
    /// Pixels left below the visible area, `None` while the list is not
    /// mounted or hidden.
    fn remaining(&self) -> Option<f64> {
        let host = self.inner.host.cast::<HtmlElement>()?;
        host.offset_parent()?;
        if self.inner.use_window.get() {
            let window = web_sys::window()?;
            let viewport = window.inner_height().ok()?.as_f64()?;
            Some(host.get_bounding_client_rect().bottom() - viewport)
        } else {
            Some(f64::from(
                host.scroll_height() - host.scroll_top() - host.client_height(),
            ))
        }
    }

    /// Decide whether to ask for another page given the space left below
    /// the list. Counts the page and disarms until whoever owns the data
    /// arms it again.
    fn next_page(&self, remaining: Option<f64>, threshold: i32) -> Option<u32> {
        if !self.inner.armed.get() {
            return None;
        }
        let remaining = remaining?;
        if remaining >= f64::from(threshold) {
            return None;
        }
        self.inner.armed.set(false);
        let page = self.inner.page_loaded.get() + 1;
        self.inner.page_loaded.set(page);
        log::trace!("{remaining}px left below the list, requesting page {page}");
        Some(page)
    }

    fn check(&self, threshold: i32, load_more: &Callback<u32>) {
        if !self.inner.armed.get() {
            return;
        }
        if let Some(page) = self.next_page(self.remaining(), threshold) {
            load_more.emit(page);
        }
    }
}

/// Listens to window scroll and resize events until dropped.
struct WindowListener {
    window: Window,
    closure: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
    const EVENTS: [&'static str; 2] = ["scroll", "resize"];

    fn attach<F>(mut on_event: F) -> Result<WindowListener, JsValue>
    where
        F: 'static + FnMut(),
    {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let closure = Closure::wrap(Box::new(move |_: Event| on_event()) as Box<dyn FnMut(Event)>);
        for event in Self::EVENTS {
            window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        }
        Ok(WindowListener { window, closure })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        for event in Self::EVENTS {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, self.closure.as_ref().unchecked_ref());
        }
    }
}

#[derive(PartialEq, Properties)]
pub struct InfiniteScrollProps {
    /// Called with the number of the page to load next.
    pub load_more: Callback<u32>,
    #[prop_or(true)]
    pub has_more: bool,
    #[prop_or(crate::DEFAULT_PAGE_START)]
    pub page_start: u32,
    /// Check the position right after mounting, filling the view if needed.
    #[prop_or_default]
    pub initial_load: bool,
    /// Watch the browser window instead of scrolling inside this component.
    #[prop_or_default]
    pub use_window: bool,
    #[prop_or(crate::DEFAULT_THRESHOLD)]
    pub threshold: i32,
    /// Share the scroll state with the owner of the data. A private handle
    /// is used when absent.
    #[prop_or_default]
    pub handle: Option<ScrollHandle>,
    #[prop_or_default]
    pub classes: Classes,
    #[prop_or_default]
    pub children: Children,
}

#[hook]
fn use_throttle(millis: u32, cb: Callback<()>) -> Callback<Event> {
    (*use_memo(
        |cb| {
            let cb = cb.clone();
            let pending = Rc::new(RefCell::new(None));
            Callback::from(move |_: Event| {
                let mut pending_ref = pending.borrow_mut();
                if pending_ref.is_some() {
                    return;
                }
                let cb = cb.clone();
                let pending = pending.clone();
                *pending_ref = Some(Timeout::new(millis, move || {
                    *pending.borrow_mut() = None;
                    cb.emit(());
                }));
            })
        },
        cb,
    ))
    .clone()
}

#[function_component]
pub fn InfiniteScroll(props: &InfiniteScrollProps) -> Html {
    let own_handle = use_memo(|_| ScrollHandle::default(), ());
    let handle = props
        .handle
        .clone()
        .unwrap_or_else(|| (*own_handle).clone());
    handle.set_armed(props.has_more);
    handle.inner.use_window.set(props.use_window);

    let trigger = use_mut_ref(|| (props.threshold, props.load_more.clone()));
    *trigger.borrow_mut() = (props.threshold, props.load_more.clone());

    let check = {
        let handle = handle.clone();
        let trigger = trigger.clone();
        move || {
            let (threshold, load_more) = trigger.borrow().clone();
            handle.check(threshold, &load_more);
        }
    };

    let content_ref = use_node_ref();
    {
        let handle = handle.clone();
        let content_ref = content_ref.clone();
        let check = check.clone();
        let page_start = props.page_start;
        let initial_load = props.initial_load;
        let use_window = props.use_window;
        use_effect_with_deps(
            move |_| {
                handle.set_page_counter(page_start);
                let window_listener = if use_window {
                    WindowListener::attach(check.clone())
                        .map_err(|err| log::warn!("cannot listen to window scrolling: {err:?}"))
                        .ok()
                } else {
                    None
                };
                let watcher = content_ref.cast::<Element>().and_then(|content| {
                    SizeWatcher::watch(&content, check.clone())
                        .map_err(|err| log::warn!("cannot watch list size: {err:?}"))
                        .ok()
                });
                if initial_load {
                    check();
                }
                move || {
                    drop(watcher);
                    drop(window_listener);
                }
            },
            (),
        );
    }

    let onscroll = {
        let cb = use_callback(move |(), _| check(), ());
        let throttled = use_throttle(50, cb);
        (!props.use_window).then_some(throttled)
    };

    let style = (!props.use_window).then_some("overflow-y: auto;");
    html! {
        <div ref={handle.inner.host.clone()} class={props.classes.clone()} {style} {onscroll}>
            <div ref={content_ref}>
                {props.children.clone()}
            </div>
        </div>
    }
}
