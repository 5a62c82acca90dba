use leptos::prelude::*;

use crate::domain;
use crate::layout::global_context::use_app_context;

#[component]
pub fn Center(children: Children) -> impl IntoView {
    view! {
        <div data-zone="center" class="app-content" style="flex: 1; overflow: auto;">
            {children()}
        </div>
    }
}

/// Страница по ключу активного пункта меню
#[component]
pub fn ActivePage() -> impl IntoView {
    let ctx = use_app_context();

    move || match ctx.active.get() {
        Some(key) => domain::render_page(&key),
        None => view! {
            <div class="page-placeholder">
                <h2>"Baykart Admin"</h2>
                <p>"Choose a section in the menu."</p>
            </div>
        }
        .into_any(),
    }
}
