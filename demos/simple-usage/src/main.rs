use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use serde_json::{json, Value};
use yew::prelude::*;
use yew_datalist::{DataList, Loader, PageInfo, PageRequest, PageUpdate, SelectType};

const TOTAL_ROWS: usize = 95;

async fn fetch_rows(request: PageRequest) -> Result<PageUpdate<Value>, yew_datalist::LoadError> {
    TimeoutFuture::new(300).await;
    let only_even = request.filters.get("even").and_then(Value::as_bool) == Some(true);
    let matching: Vec<usize> = (1..=TOTAL_ROWS)
        .filter(|id| !only_even || id % 2 == 0)
        .collect();
    let page_size = request.page_size as usize;
    let list = matching
        .iter()
        .skip(request.offset())
        .take(page_size)
        .map(|id| json!({ "id": id, "title": format!("Item {id}") }))
        .collect();
    let total_pages = matching.len() as f64 / page_size as f64;
    Ok(PageUpdate::page(list, total_pages).total(matching.len() as u64))
}

#[function_component]
fn App() -> Html {
    let loader = use_memo(|_| Loader::new(fetch_rows), ());
    let data_source = use_state(|| Rc::new(PageInfo::<Value>::new()));
    let selected = use_state(Vec::<String>::new);

    let toggle_filter = {
        let data_source = data_source.clone();
        Callback::from(move |_: MouseEvent| {
            let even = data_source.filters.get("even").and_then(Value::as_bool) != Some(true);
            data_source.set(Rc::new(PageInfo::new().with_filters(json!({ "even": even }))));
        })
    };
    let on_change = {
        let selected = selected.clone();
        Callback::from(move |item: Value| {
            let key = item["id"].to_string();
            let mut keys = (*selected).clone();
            match keys.iter().position(|k| *k == key) {
                Some(pos) => {
                    keys.remove(pos);
                }
                None => keys.push(key),
            }
            selected.set(keys);
        })
    };
    let render_header = Callback::from(|()| html! { {"Rows"} });

    html! {
        <>
            <button onclick={toggle_filter}>{"Toggle even rows"}</button>
            <DataList<Value>
                data_source={(*data_source).clone()}
                load_data={(*loader).clone()}
                select_type={SelectType::Checkbox}
                selected_keys={(*selected).clone()}
                page_size={20}
                {on_change}
                {render_header}
                classes={"scrollbar"} />
        </>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
