use std::{
    cell::{Cell, Ref, RefCell},
    future::Future,
    rc::Rc,
};

use futures::{future::LocalBoxFuture, FutureExt};

use crate::{
    error::LoadError,
    page::{Criteria, PageInfo, PageRequest, PageUpdate},
    pager::{LoadOutcome, LoadStep, PageState},
};

pub type LoadFuture<T> = LocalBoxFuture<'static, Result<PageUpdate<T>, LoadError>>;

/// Fetches one page. Two loaders are equal only if they are the same instance.
pub struct Loader<T> {
    load: Rc<dyn Fn(PageRequest) -> LoadFuture<T>>,
}

impl<T: 'static> Loader<T> {
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: 'static + Fn(PageRequest) -> Fut,
        Fut: 'static + Future<Output = Result<PageUpdate<T>, LoadError>>,
    {
        Self {
            load: Rc::new(move |request| load(request).boxed_local()),
        }
    }

    pub fn load(&self, request: PageRequest) -> LoadFuture<T> {
        (self.load)(request)
    }
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            load: self.load.clone(),
        }
    }
}

impl<T> PartialEq for Loader<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.load, &other.load)
    }
}

impl<T> std::fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Loader")
    }
}

/// What the list needs from whatever detects scrolling.
pub trait ScrollController {
    /// Scroll the list back to its first row.
    fn reset_to_top(&self);
    fn set_page_counter(&self, page: u32);
    fn page_counter(&self) -> u32;
    /// Allow or forbid asking for the next page.
    fn set_armed(&self, armed: bool);
}

/// Drives page loads for one list and keeps its state.
pub struct ListController<T> {
    state: RefCell<PageState<T>>,
    loader: RefCell<Option<Loader<T>>>,
    page_size: Cell<u32>,
    scroll: Rc<dyn ScrollController>,
    redraw: Box<dyn Fn()>,
}

impl<T: Clone + 'static> ListController<T> {
    pub fn new<F>(data_source: PageInfo<T>, scroll: Rc<dyn ScrollController>, redraw: F) -> Self
    where
        F: 'static + Fn(),
    {
        Self {
            state: RefCell::new(PageState::new(data_source)),
            loader: RefCell::default(),
            page_size: Cell::new(crate::DEFAULT_PAGE_SIZE),
            scroll,
            redraw: Box::new(redraw),
        }
    }

    /// Pick up the latest loader and page size from the component's props.
    pub fn configure(&self, loader: Option<Loader<T>>, page_size: u32) {
        *self.loader.borrow_mut() = loader;
        self.page_size.set(page_size);
    }

    pub fn state(&self) -> Ref<'_, PageState<T>> {
        self.state.borrow()
    }

    pub fn has_loader(&self) -> bool {
        self.loader.borrow().is_some()
    }

    fn publish(&self) {
        let armed = self.state.borrow().can_request_more();
        self.scroll.set_armed(armed);
        (self.redraw)();
    }

    pub async fn load_more(
        &self,
        page_num: u32,
        filters: Option<Criteria>,
        sorts: Option<Criteria>,
        is_reload: bool,
    ) -> LoadOutcome {
        let loader = match self.loader.borrow().clone() {
            Some(loader) => loader,
            None => return LoadOutcome::Skipped,
        };

        let step = self.state.borrow_mut().begin(
            page_num,
            self.page_size.get(),
            filters,
            sorts,
            is_reload,
        );
        let ticket = match step {
            LoadStep::Fetch(ticket) => ticket,
            LoadStep::Exhausted => {
                log::debug!("page {page_num} is past the end, no more pages");
                self.publish();
                return LoadOutcome::Exhausted;
            }
            LoadStep::Busy => {
                log::debug!("page {page_num} requested while another page is loading");
                // the scroll side already counted this page, hand it back
                if self.scroll.page_counter() == page_num {
                    self.scroll.set_page_counter(page_num.saturating_sub(1));
                }
                self.publish();
                return LoadOutcome::Busy;
            }
        };
        log::debug!(
            "loading page {page_num} (reload: {is_reload}, generation {})",
            ticket.generation
        );
        self.publish();

        let result = loader.load(ticket.request.clone()).await;

        if !self.state.borrow().is_current(&ticket) {
            log::debug!("dropping stale result for page {page_num}");
            return LoadOutcome::Stale;
        }
        if ticket.is_reload && result.is_ok() {
            self.scroll.set_page_counter(1);
            self.scroll.reset_to_top();
        }
        let outcome = self.state.borrow_mut().complete(&ticket, result);
        match &outcome {
            LoadOutcome::Applied => log::debug!(
                "page {page_num} applied, {} rows displayed",
                self.state.borrow().data_list().len()
            ),
            LoadOutcome::Failed(err) => log::warn!("loading page {page_num} failed: {err}"),
            other => log::debug!("page {page_num} finished as {other:?}"),
        }
        self.publish();
        outcome
    }

    /// Reload the first page with the criteria of a new handle.
    pub async fn reload_with(&self, data_source: PageInfo<T>) -> LoadOutcome {
        if !self.has_loader() {
            return LoadOutcome::Skipped;
        }
        let filters = Some(data_source.filters.clone());
        let sorts = Some(data_source.sorts.clone());
        self.state.borrow_mut().replace_source(data_source);
        self.load_more(1, filters, sorts, true).await
    }

    /// Issue the last failed load again.
    pub async fn retry(&self) -> LoadOutcome {
        let failed = self.state.borrow().failed().cloned();
        match failed {
            Some(failed) => {
                self.load_more(
                    failed.page_num,
                    failed.filters,
                    failed.sorts,
                    failed.is_reload,
                )
                .await
            }
            None => LoadOutcome::Skipped,
        }
    }

    /// Forget any load in flight, its result will be dropped when it arrives.
    pub fn cancel(&self) {
        self.state.borrow_mut().invalidate();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use futures::{channel::oneshot, executor::block_on};
    use serde_json::{json, Value};

    use super::*;

    #[derive(Default)]
    struct FakeScroll {
        counter: Cell<u32>,
        armed: Cell<bool>,
        resets: Cell<usize>,
    }

    impl ScrollController for FakeScroll {
        fn reset_to_top(&self) {
            self.resets.set(self.resets.get() + 1);
        }

        fn set_page_counter(&self, page: u32) {
            self.counter.set(page);
        }

        fn page_counter(&self) -> u32 {
            self.counter.get()
        }

        fn set_armed(&self, armed: bool) {
            self.armed.set(armed);
        }
    }

    struct Harness {
        controller: ListController<Value>,
        scroll: Rc<FakeScroll>,
        requests: Rc<RefCell<Vec<PageRequest>>>,
    }

    fn harness(
        data_source: PageInfo<Value>,
        respond: impl Fn(&PageRequest) -> Result<PageUpdate<Value>, LoadError> + 'static,
    ) -> Harness {
        let scroll = Rc::new(FakeScroll::default());
        let requests = Rc::new(RefCell::new(Vec::new()));
        let controller = ListController::new(data_source, scroll.clone(), || {});
        let seen = requests.clone();
        let respond = Rc::new(respond);
        controller.configure(
            Some(Loader::new(move |request: PageRequest| {
                seen.borrow_mut().push(request.clone());
                let respond = respond.clone();
                async move { respond(&request) }
            })),
            2,
        );
        Harness {
            controller,
            scroll,
            requests,
        }
    }

    fn rows(ids: &[u64]) -> Vec<Value> {
        ids.iter().map(|id| json!({ "id": id })).collect()
    }

    #[test]
    fn first_page_then_end_of_data() {
        let h = harness(PageInfo::default(), |_| {
            Ok(PageUpdate::page(rows(&[1, 2]), 1.0))
        });

        assert_eq!(
            block_on(h.controller.load_more(1, None, None, false)),
            LoadOutcome::Applied
        );
        assert_eq!(h.controller.state().data_list(), rows(&[1, 2]).as_slice());
        assert!(h.controller.state().has_more());
        assert!(h.scroll.armed.get());

        assert_eq!(
            block_on(h.controller.load_more(2, None, None, false)),
            LoadOutcome::Exhausted
        );
        assert_eq!(h.requests.borrow().len(), 1);
        assert!(!h.controller.state().has_more());
        assert!(!h.scroll.armed.get());
    }

    #[test]
    fn pages_are_appended_without_dedup() {
        let h = harness(PageInfo::default(), |req| {
            let page = u64::from(req.page_num);
            Ok(PageUpdate::page(rows(&[page, page + 1]), 3.0))
        });

        block_on(h.controller.load_more(1, None, None, false));
        block_on(h.controller.load_more(2, None, None, false));

        assert_eq!(
            h.controller.state().data_list(),
            rows(&[1, 2, 2, 3]).as_slice()
        );
        assert_eq!(h.requests.borrow()[1].page_num, 2);
        assert_eq!(h.requests.borrow()[1].page_size, 2);
    }

    #[test]
    fn reload_twice_keeps_only_latest_page() {
        let h = harness(PageInfo::default(), |_| {
            Ok(PageUpdate::page(rows(&[5]), 1.0))
        });
        h.scroll.counter.set(4);

        block_on(h.controller.load_more(1, None, None, true));
        block_on(h.controller.load_more(1, None, None, true));

        assert_eq!(h.controller.state().data_list(), rows(&[5]).as_slice());
        assert_eq!(h.scroll.counter.get(), 1);
        assert_eq!(h.scroll.resets.get(), 2);
    }

    #[test]
    fn new_data_source_reloads_with_its_criteria() {
        let h = harness(
            PageInfo {
                list: rows(&[1]),
                ..PageInfo::default()
            },
            |req| Ok(PageUpdate::page(rows(&[u64::from(req.page_num) * 10]), 2.0)),
        );
        let swapped = PageInfo::default()
            .with_filters(json!({"q": "x"}))
            .with_sorts(json!({"id": "asc"}));

        block_on(h.controller.reload_with(swapped));

        let request = h.requests.borrow()[0].clone();
        assert_eq!(request.page_num, 1);
        assert_eq!(request.filters, json!({"q": "x"}));
        assert_eq!(request.sorts, json!({"id": "asc"}));
        assert_eq!(h.controller.state().data_list(), rows(&[10]).as_slice());
        assert_eq!(h.scroll.resets.get(), 1);
    }

    #[test]
    fn failure_is_surfaced_and_retried() {
        let fail = Rc::new(Cell::new(true));
        let h = {
            let fail = fail.clone();
            harness(PageInfo::default(), move |_| {
                if fail.get() {
                    Err(LoadError::failed("timeout"))
                } else {
                    Ok(PageUpdate::page(rows(&[1]), 1.0))
                }
            })
        };

        let outcome = block_on(h.controller.load_more(1, None, None, true));
        assert_eq!(outcome, LoadOutcome::Failed(LoadError::failed("timeout")));
        assert!(!h.controller.state().loading());
        assert!(h.controller.state().error().is_some());
        assert!(!h.scroll.armed.get());
        assert_eq!(h.scroll.resets.get(), 0);

        fail.set(false);
        assert_eq!(block_on(h.controller.retry()), LoadOutcome::Applied);
        assert_eq!(h.controller.state().data_list(), rows(&[1]).as_slice());
        assert!(h.controller.state().error().is_none());
        assert!(h.scroll.armed.get());
    }

    #[test]
    fn reload_overtaking_an_append_drops_the_append() {
        let scroll = Rc::new(FakeScroll::default());
        let controller = ListController::new(
            PageInfo::<Value> {
                total_pages: 3.0,
                ..PageInfo::default()
            },
            scroll,
            || {},
        );
        let (append_tx, append_rx) = oneshot::channel();
        let (reload_tx, reload_rx) = oneshot::channel();
        let pending = Rc::new(RefCell::new(VecDeque::from([append_rx, reload_rx])));
        controller.configure(
            Some(Loader::new(move |_| {
                let rx = pending.borrow_mut().pop_front();
                async move {
                    match rx {
                        Some(rx) => Ok(rx.await?),
                        None => Err(LoadError::Canceled),
                    }
                }
            })),
            2,
        );

        let (append, reload, ()) = block_on(async {
            futures::join!(
                controller.load_more(2, None, None, false),
                controller.load_more(1, None, None, true),
                async move {
                    let _ = append_tx.send(PageUpdate::page(rows(&[1]), 3.0));
                    let _ = reload_tx.send(PageUpdate::page(rows(&[2]), 3.0));
                },
            )
        });

        assert_eq!(append, LoadOutcome::Stale);
        assert_eq!(reload, LoadOutcome::Applied);
        assert_eq!(controller.state().data_list(), rows(&[2]).as_slice());
        assert!(!controller.state().loading());
    }

    #[test]
    fn busy_request_hands_its_page_back_to_the_scroll_side() {
        let scroll = Rc::new(FakeScroll::default());
        let controller = ListController::new(
            PageInfo::<Value> {
                total_pages: 5.0,
                ..PageInfo::default()
            },
            scroll.clone(),
            || {},
        );
        let (page_tx, page_rx) = oneshot::channel();
        let pending = Rc::new(RefCell::new(Some(page_rx)));
        controller.configure(
            Some(Loader::new(move |_| {
                let rx = pending.borrow_mut().take();
                async move {
                    match rx {
                        Some(rx) => Ok(rx.await?),
                        None => Err(LoadError::Canceled),
                    }
                }
            })),
            2,
        );
        scroll.counter.set(2);

        let (first, busy, ()) = block_on(async {
            futures::join!(
                controller.load_more(2, None, None, false),
                async {
                    // the scroll side counts page 3 before asking for it
                    scroll.counter.set(3);
                    scroll.armed.set(true);
                    controller.load_more(3, None, None, false).await
                },
                async move {
                    let _ = page_tx.send(PageUpdate::page(rows(&[3, 4]), 5.0));
                },
            )
        });

        assert_eq!(busy, LoadOutcome::Busy);
        assert_eq!(first, LoadOutcome::Applied);
        assert_eq!(scroll.counter.get(), 2);
        assert!(scroll.armed.get());
        assert_eq!(controller.state().data_list(), rows(&[3, 4]).as_slice());
    }

    #[test]
    fn reload_without_loader_keeps_the_current_source() {
        let scroll = Rc::new(FakeScroll::default());
        let controller = ListController::new(
            PageInfo {
                list: rows(&[1]),
                ..PageInfo::default()
            },
            scroll,
            || {},
        );
        let swapped = PageInfo::default().with_filters(json!({"q": "y"}));

        assert_eq!(block_on(controller.reload_with(swapped)), LoadOutcome::Skipped);
        assert_eq!(controller.state().data_source().filters, Value::Null);
        assert_eq!(controller.state().data_source().list, rows(&[1]));
    }

    #[test]
    fn without_loader_nothing_happens() {
        let scroll = Rc::new(FakeScroll::default());
        let controller = ListController::new(PageInfo::<Value>::default(), scroll, || {});
        assert!(!controller.has_loader());
        assert_eq!(
            block_on(controller.load_more(1, None, None, false)),
            LoadOutcome::Skipped
        );
        assert!(!controller.state().loading());
    }
}
