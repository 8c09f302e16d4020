//! Row presentation: how a single item of the list is drawn.

use yew::prelude::*;

/// A row the list can display. Fields are looked up by name so that the
/// key and title columns can be chosen through props.
pub trait DataRow: 'static + Clone + PartialEq {
    fn field(&self, name: &str) -> Option<String>;
}

impl DataRow for serde_json::Value {
    fn field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Selection behaviour of the rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectType {
    #[default]
    None,
    Checkbox,
    Radio,
}

/// How a row is rendered, after taking custom renderers into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Default,
    Checkbox,
    Radio,
    Custom,
}

impl RowMode {
    pub fn resolve(select_type: SelectType, has_custom: bool) -> Self {
        if has_custom {
            return Self::Custom;
        }
        match select_type {
            SelectType::None => Self::Default,
            SelectType::Checkbox => Self::Checkbox,
            SelectType::Radio => Self::Radio,
        }
    }
}

#[derive(PartialEq, Properties)]
pub struct ListItemProps {
    #[prop_or_default]
    pub onclick: Option<Callback<MouseEvent>>,
    #[prop_or(true)]
    pub arrow: bool,
    #[prop_or_default]
    pub children: Children,
}

#[function_component]
pub fn ListItem(props: &ListItemProps) -> Html {
    let class = classes!(
        "datalist-item",
        props.onclick.is_some().then_some("datalist-item-active")
    );
    html! {
        <div {class} onclick={props.onclick.clone()}>
            <div class="datalist-item-content">
                {props.children.clone()}
            </div>
            if props.arrow {
                <div class="datalist-item-arrow" aria-hidden="true" />
            }
        </div>
    }
}

#[derive(PartialEq, Properties)]
pub struct CheckboxItemProps {
    #[prop_or_default]
    pub checked: bool,
    #[prop_or_default]
    pub onchange: Option<Callback<Event>>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component]
pub fn CheckboxItem(props: &CheckboxItemProps) -> Html {
    html! {
        <label class="datalist-item datalist-checkbox-item">
            <input
                type="checkbox"
                class="datalist-checkbox"
                checked={props.checked}
                onchange={props.onchange.clone()} />
            <div class="datalist-item-content">
                {props.children.clone()}
            </div>
        </label>
    }
}

#[derive(PartialEq, Properties)]
pub struct LoadingProps {
    #[prop_or(AttrValue::from("Loading"))]
    pub text: AttrValue,
}

#[function_component]
pub fn Loading(props: &LoadingProps) -> Html {
    let dot = |side: &'static str, nth: &'static str| {
        html! { <div class={classes!("dot", side, nth)} /> }
    };
    html! {
        <div class="loading-container">
            <div class="loading">
                {dot("left", "three")}
                {dot("left", "two")}
                {dot("left", "one")}
                <i class="text">{props.text.to_string()}</i>
                {dot("right", "one")}
                {dot("right", "two")}
                {dot("right", "three")}
            </div>
        </div>
    }
}

/// Everything needed to draw a row, borrowed from the list's props.
pub(crate) struct RowRenderer<'a, T> {
    pub mode: RowMode,
    pub row_key: &'a str,
    pub title_key: &'a str,
    pub arrow: bool,
    pub selected_keys: &'a [String],
    pub on_change: Option<&'a Callback<T>>,
    pub render: Option<&'a Callback<T, Html>>,
    pub render_item: Option<&'a Callback<T, Html>>,
}

impl<'a, T: DataRow> RowRenderer<'a, T> {
    fn content(&self, item: &T) -> Html {
        match self.render {
            Some(render) => render.emit(item.clone()),
            None => match item.field(self.title_key) {
                Some(title) => html! { {title} },
                None => Html::default(),
            },
        }
    }

    pub fn render_row(&self, pos: usize, item: &T) -> Html {
        let row_key = item.field(self.row_key);
        // rows are not deduplicated, so the position keeps keys unique
        let key = format!("{pos}:{}", row_key.as_deref().unwrap_or_default());

        match self.mode {
            RowMode::Custom => match self.render_item {
                Some(render_item) => html! {
                    <div key={key} class="datalist-custom-row">
                        {render_item.emit(item.clone())}
                    </div>
                },
                None => Html::default(),
            },
            RowMode::Checkbox => {
                let checked = row_key
                    .as_ref()
                    .map_or(false, |k| self.selected_keys.contains(k));
                let onchange = self.on_change.map(|cb| {
                    let item = item.clone();
                    cb.reform(move |_: Event| item.clone())
                });
                html! {
                    <CheckboxItem key={key} {checked} {onchange}>
                        {self.content(item)}
                    </CheckboxItem>
                }
            }
            RowMode::Radio => Html::default(),
            RowMode::Default => {
                let onclick = self.on_change.map(|cb| {
                    let item = item.clone();
                    cb.reform(move |_: MouseEvent| item.clone())
                });
                html! {
                    <ListItem key={key} {onclick} arrow={self.arrow}>
                        {self.content(item)}
                    </ListItem>
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_renderer_wins() {
        assert_eq!(RowMode::resolve(SelectType::Checkbox, true), RowMode::Custom);
        assert_eq!(RowMode::resolve(SelectType::None, true), RowMode::Custom);
    }

    #[test]
    fn select_type_picks_mode() {
        assert_eq!(RowMode::resolve(SelectType::None, false), RowMode::Default);
        assert_eq!(RowMode::resolve(SelectType::Checkbox, false), RowMode::Checkbox);
        assert_eq!(RowMode::resolve(SelectType::Radio, false), RowMode::Radio);
    }

    #[test]
    fn json_rows_expose_fields() {
        let row = json!({"id": 7, "title": "seven", "gone": null});
        assert_eq!(row.field("id").as_deref(), Some("7"));
        assert_eq!(row.field("title").as_deref(), Some("seven"));
        assert_eq!(row.field("gone"), None);
        assert_eq!(row.field("missing"), None);
        assert_eq!(json!([1, 2]).field("id"), None);
    }
}
