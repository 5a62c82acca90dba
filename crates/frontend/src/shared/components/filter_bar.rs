//! Панель фильтров списка, строится по `FilterSpec` сущности

use chrono::NaiveDate;
use contracts::shared::list::{FilterKind, FilterSpec, FilterState, FilterValue, CHOICE_ALL};
use leptos::prelude::*;

use crate::shared::icons::icon;

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn date_bounds(filters: &FilterState, key: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match filters.get(key) {
        Some(FilterValue::DateRange { from, to }) => (*from, *to),
        _ => (None, None),
    }
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Каждый элемент сообщает изменение одного ключа через `on_change`
#[component]
pub fn FilterBar(
    specs: Vec<FilterSpec>,
    /// Фильтры, применённые к списку
    #[prop(into)]
    filters: Signal<FilterState>,
    on_change: Callback<FilterState>,
    on_clear: Callback<()>,
) -> impl IntoView {
    let controls = specs
        .into_iter()
        .map(|spec| {
            let key = spec.key;
            match spec.kind {
                FilterKind::Search => view! {
                    <label class="filter-bar__item filter-bar__item--search">
                        {icon("search")}
                        <input
                            type="search"
                            placeholder=spec.label
                            prop:value=move || {
                                filters.with(|f| f.get(key).and_then(|v| v.as_str()).unwrap_or("").to_string())
                            }
                            on:change=move |ev| {
                                on_change.run(FilterState::new().with(key, FilterValue::text(event_target_value(&ev))));
                            }
                        />
                    </label>
                }
                .into_any(),
                FilterKind::Choice(options) => view! {
                    <label class="filter-bar__item">
                        <span>{spec.label}</span>
                        <select
                            prop:value=move || {
                                filters.with(|f| f.get(key).and_then(|v| v.as_str()).unwrap_or(CHOICE_ALL).to_string())
                            }
                            on:change=move |ev| {
                                on_change.run(FilterState::new().with(key, FilterValue::choice(event_target_value(&ev))));
                            }
                        >
                            <option value=CHOICE_ALL>"All"</option>
                            {options.into_iter().map(|(value, label)| view! {
                                <option value=value>{label}</option>
                            }).collect_view()}
                        </select>
                    </label>
                }
                .into_any(),
                FilterKind::DateRange => view! {
                    <div class="filter-bar__item filter-bar__item--dates">
                        <span>{spec.label}</span>
                        <input
                            type="date"
                            prop:value=move || filters.with(|f| date_text(date_bounds(f, key).0))
                            on:change=move |ev| {
                                let (_, to) = filters.with_untracked(|f| date_bounds(f, key));
                                let from = parse_date(&event_target_value(&ev));
                                on_change.run(FilterState::new().with(key, FilterValue::date_range(from, to)));
                            }
                        />
                        <span>"-"</span>
                        <input
                            type="date"
                            prop:value=move || filters.with(|f| date_text(date_bounds(f, key).1))
                            on:change=move |ev| {
                                let (from, _) = filters.with_untracked(|f| date_bounds(f, key));
                                let to = parse_date(&event_target_value(&ev));
                                on_change.run(FilterState::new().with(key, FilterValue::date_range(from, to)));
                            }
                        />
                    </div>
                }
                .into_any(),
            }
        })
        .collect_view();

    view! {
        <div class="filter-bar">
            {controls}
            <button
                class="filter-bar__clear"
                title="Clear filters"
                disabled=move || filters.with(|f| f.is_empty())
                on:click=move |_| on_clear.run(())
            >
                {icon("filter-x")}
            </button>
        </div>
    }
}
