//! Верхняя панель: переключатель меню, название, пользователь и выход

use leptos::prelude::*;

use crate::layout::global_context::use_app_context;
use crate::shared::icons::icon;
use crate::system::auth::context::{sign_out, use_auth};

#[component]
pub fn TopHeader() -> impl IntoView {
    let ctx = use_app_context();
    let auth = use_auth();

    let is_sidebar_visible = move || ctx.left_open.get();

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <button
                    class="top-header__icon-btn"
                    on:click=move |_| ctx.toggle_left()
                    title=move || if is_sidebar_visible() { "Hide menu" } else { "Show menu" }
                >
                    {move || if is_sidebar_visible() {
                        icon("panel-left-close")
                    } else {
                        icon("panel-left-open")
                    }}
                </button>
                <span class="top-header__title">"Baykart Admin"</span>
            </div>

            <div class="top-header__actions">
                <Show when=move || auth.with(|s| s.access_token.is_some())>
                    <span class="top-header__user">
                        {icon("user")}
                        {move || auth.with(|s| s.username.clone().unwrap_or_default())}
                    </span>
                    <button
                        class="top-header__icon-btn"
                        on:click=move |_| sign_out(auth)
                        title="Sign out"
                    >
                        {icon("log-out")}
                    </button>
                </Show>
            </div>
        </div>
    }
}
