//! An infinite scrolling, paginated list component for Yew.
//!
//! [`DataList`] asks a [`Loader`] for one page at a time and appends the rows
//! as the user scrolls towards the end. Handing it a different
//! [`PageInfo`] reloads the list from the first page.

mod controller;
mod error;
mod item;
mod page;
mod pager;
mod resize;
mod scroll;

use std::rc::Rc;

use yew::{platform::spawn_local, prelude::*};

pub use controller::{ListController, LoadFuture, Loader, ScrollController};
pub use error::LoadError;
pub use item::{CheckboxItem, DataRow, ListItem, Loading, RowMode, SelectType};
pub use page::{Criteria, PageInfo, PageRequest, PageUpdate};
pub use pager::{FailedLoad, LoadOutcome, PageState};
pub use scroll::{InfiniteScroll, InfiniteScrollProps, ScrollHandle};

use item::RowRenderer;

pub const DEFAULT_PAGE_START: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 30;
/// Distance in pixels from the end of the list at which the next page is requested.
pub const DEFAULT_THRESHOLD: i32 = 250;
pub const DEFAULT_ROW_KEY: &str = "id";
pub const DEFAULT_TITLE_KEY: &str = "title";

#[derive(PartialEq, Properties)]
pub struct DataListProps<T: DataRow> {
    /// Initial collection. Passing a different one reloads from page 1 with
    /// its filters and sorts.
    #[prop_or_default]
    pub data_source: Rc<PageInfo<T>>,
    #[prop_or_default]
    pub load_data: Option<Loader<T>>,
    /// When false the first page is loaded on mount. Also forwarded to the
    /// scroll detection, which then checks its position right away.
    #[prop_or_default]
    pub initial_load: bool,
    #[prop_or_default]
    pub select_type: SelectType,
    /// Row keys shown as checked in checkbox mode.
    #[prop_or_default]
    pub selected_keys: Vec<String>,
    #[prop_or_default]
    pub on_change: Option<Callback<T>>,
    #[prop_or(DEFAULT_PAGE_START)]
    pub page_start: u32,
    #[prop_or(DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
    #[prop_or(AttrValue::from(DEFAULT_ROW_KEY))]
    pub row_key: AttrValue,
    #[prop_or(AttrValue::from(DEFAULT_TITLE_KEY))]
    pub title_key: AttrValue,
    #[prop_or(true)]
    pub arrow: bool,
    #[prop_or_default]
    pub render_header: Option<Callback<(), Html>>,
    #[prop_or_default]
    pub render_footer: Option<Callback<(), Html>>,
    /// Renders a whole row, replacing the built-in list and checkbox items.
    #[prop_or_default]
    pub render_item: Option<Callback<T, Html>>,
    /// Renders the content inside a built-in row.
    #[prop_or_default]
    pub render: Option<Callback<T, Html>>,
    #[prop_or_default]
    pub use_window: bool,
    #[prop_or(DEFAULT_THRESHOLD)]
    pub threshold: i32,
    #[prop_or(AttrValue::from("Loading"))]
    pub loading_text: AttrValue,
    #[prop_or_default]
    pub classes: Classes,
}

#[function_component]
pub fn DataList<T>(props: &DataListProps<T>) -> Html
where
    T: DataRow,
{
    let update = use_force_update();
    let scroll = use_memo(|_| ScrollHandle::default(), ());
    let controller = {
        let scroll = scroll.clone();
        let data_source = props.data_source.clone();
        use_memo(
            move |_| {
                ListController::new(
                    (*data_source).clone(),
                    Rc::new((*scroll).clone()),
                    move || update.force_update(),
                )
            },
            (),
        )
    };
    controller.configure(props.load_data.clone(), props.page_size);

    {
        let controller = controller.clone();
        let initial_load = props.initial_load;
        use_effect_with_deps(
            move |_| {
                if !initial_load && controller.has_loader() {
                    let controller = controller.clone();
                    spawn_local(async move {
                        controller.load_more(1, None, None, false).await;
                    });
                }
                move || controller.cancel()
            },
            (),
        );
    }

    {
        let controller = controller.clone();
        let seen = use_mut_ref(|| props.data_source.clone());
        use_effect_with_deps(
            move |data_source: &Rc<PageInfo<T>>| {
                if *seen.borrow() != *data_source {
                    *seen.borrow_mut() = data_source.clone();
                    let data_source = (**data_source).clone();
                    spawn_local(async move {
                        controller.reload_with(data_source).await;
                    });
                }
                || {}
            },
            props.data_source.clone(),
        );
    }

    let load_more = {
        let controller = controller.clone();
        Callback::from(move |page: u32| {
            let controller = controller.clone();
            spawn_local(async move {
                controller.load_more(page, None, None, false).await;
            });
        })
    };
    let retry = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| {
            let controller = controller.clone();
            spawn_local(async move {
                controller.retry().await;
            });
        })
    };

    let state = controller.state();
    let renderer = RowRenderer {
        mode: RowMode::resolve(props.select_type, props.render_item.is_some()),
        row_key: &props.row_key,
        title_key: &props.title_key,
        arrow: props.arrow,
        selected_keys: &props.selected_keys,
        on_change: props.on_change.as_ref(),
        render: props.render.as_ref(),
        render_item: props.render_item.as_ref(),
    };
    let rows: Html = state
        .data_list()
        .iter()
        .enumerate()
        .map(|(pos, item)| renderer.render_row(pos, item))
        .collect();
    let has_more = state.can_request_more();
    let show_loading = state.loading() && state.has_more();
    let error = state.error().map(ToString::to_string);
    drop(state);

    let header = props.render_header.as_ref().map(|render| render.emit(()));
    let footer = props.render_footer.as_ref().map(|render| render.emit(()));

    html! {
        <InfiniteScroll
            classes={classes!("datalist", props.classes.clone())}
            initial_load={props.initial_load}
            use_window={props.use_window}
            page_start={props.page_start}
            threshold={props.threshold}
            {has_more}
            handle={(*scroll).clone()}
            {load_more}>
            <div class="datalist-list">
                if let Some(header) = header {
                    <div class="datalist-header">{header}</div>
                }
                <div class="datalist-body">
                    {rows}
                    if show_loading {
                        <Loading text={props.loading_text.clone()} />
                    }
                    if let Some(error) = error {
                        <div class="datalist-error">
                            <span class="datalist-error-text">{error}</span>
                            <button type="button" class="datalist-retry" onclick={retry}>
                                {"Retry"}
                            </button>
                        </div>
                    }
                </div>
                if let Some(footer) = footer {
                    <div class="datalist-footer">{footer}</div>
                }
            </div>
        </InfiniteScroll>
    }
}
