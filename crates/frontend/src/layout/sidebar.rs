//! Боковое меню с раскрывающимися группами разделов

use leptos::prelude::*;

use crate::domain::page_title;
use crate::layout::global_context::use_app_context;
use crate::shared::icons::icon;

#[derive(Clone, Debug, PartialEq)]
struct MenuGroup {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    items: Vec<(&'static str, &'static str)>, // (page key, icon)
}

fn get_menu_groups() -> Vec<MenuGroup> {
    vec![
        MenuGroup {
            id: "content",
            label: "Content",
            icon: "file-text",
            items: vec![
                ("a001_categories", "layers"),
                ("a002_articles", "file-text"),
                ("a004_events", "calendar"),
            ],
        },
        MenuGroup {
            id: "commerce",
            label: "Commerce",
            icon: "tag",
            items: vec![("a003_coupons", "tag")],
        },
        MenuGroup {
            id: "farming",
            label: "Farming",
            icon: "sprout",
            items: vec![
                ("a005_farmers", "users"),
                ("a006_crops", "sprout"),
                ("a007_schemes", "landmark"),
            ],
        },
    ]
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_app_context();

    let expanded_groups = RwSignal::new(
        get_menu_groups()
            .iter()
            .map(|g| g.id.to_string())
            .collect::<Vec<_>>(),
    );

    view! {
        <Show when=move || ctx.left_open.get()>
            <div class="app-sidebar">
                <div class="app-sidebar__content">
                    {get_menu_groups().into_iter().map(|group| {
                        let group_id = group.id.to_string();
                        let group_id_for_click = group_id.clone();
                        let group_id_for_exp = group_id.clone();
                        let items_stored = StoredValue::new(group.items.clone());

                        view! {
                            <div>
                                <div
                                    class="app-sidebar__item"
                                    style:padding-left="12px"
                                    on:click=move |_| {
                                        let gid = group_id_for_click.clone();
                                        expanded_groups.update(move |items| {
                                            if let Some(pos) = items.iter().position(|x| x == &gid) {
                                                items.remove(pos);
                                            } else {
                                                items.push(gid);
                                            }
                                        });
                                    }
                                >
                                    <div class="app-sidebar__item-content">
                                        {icon(group.icon)}
                                        <span>{group.label}</span>
                                    </div>
                                    <div
                                        class="app-sidebar__chevron"
                                        class:app-sidebar__chevron--expanded=move || expanded_groups.get().contains(&group_id_for_exp)
                                    >
                                        {icon("chevron-right")}
                                    </div>
                                </div>

                                <Show when=move || expanded_groups.get().contains(&group_id)>
                                    <div class="app-sidebar__children">
                                        {items_stored.get_value().into_iter().map(|(key, icon_name)| {
                                            view! {
                                                <div
                                                    class="app-sidebar__item"
                                                    class:app-sidebar__item--active=move || {
                                                        ctx.active.get().as_deref() == Some(key)
                                                    }
                                                    style:padding-left="10px"
                                                    on:click=move |_| ctx.open_page(key)
                                                >
                                                    <div class="app-sidebar__item-content">
                                                        {icon(icon_name)}
                                                        <span>{page_title(key)}</span>
                                                    </div>
                                                </div>
                                            }
                                        }).collect_view()}
                                    </div>
                                </Show>
                            </div>
                        }
                    }).collect_view()}
                </div>
            </div>
        </Show>
    }
}
