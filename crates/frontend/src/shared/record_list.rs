//! Страница списка сущности поверх `RecordListController`
//!
//! Контроллер живёт в сигнале. Каждое действие пользователя даёт билет
//! загрузки, который выполняется в `spawn_local`; ответ применяется через
//! `complete_load`, устаревшие ответы контроллер отбрасывает сам.

use contracts::domain::common::Entity;
use contracts::shared::form::EntityFormValidator;
use contracts::shared::list::{
    sort_indicator, FilterState, ListSettings, LoadOutcome, LoadTicket, RecordListController,
};
use contracts::shared::provider::{DataProvider, ProviderError};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::shared::components::filter_bar::FilterBar;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::entity_form::entity_form_dialog;
use crate::shared::http::HttpDataProvider;
use crate::shared::icons::icon;
use crate::shared::toast::{use_toasts, ToastService};
use crate::system::auth::context::{sign_out, use_auth, AuthState};

/// Цвет бейджа статуса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Neutral,
    Warning,
    Negative,
    Info,
}

impl Tone {
    fn badge_color(self) -> BadgeColor {
        match self {
            Self::Positive => BadgeColor::Success,
            Self::Neutral => BadgeColor::Important,
            Self::Warning => BadgeColor::Warning,
            Self::Negative => BadgeColor::Danger,
            Self::Info => BadgeColor::Brand,
        }
    }
}

/// Содержимое ячейки таблицы
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Badge(String, Tone),
    Image(Option<String>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Необязательное значение; пустое показывается как "-"
    pub fn opt(value: Option<impl ToString>) -> Self {
        Self::Text(value.map(|v| v.to_string()).unwrap_or_else(|| "-".into()))
    }

    /// Статус с подписью из справочника
    pub fn status(code: &str, labels: &[(&'static str, &'static str)]) -> Self {
        let label = labels
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, l)| *l)
            .unwrap_or(code);
        let tone = match code {
            "active" | "published" | "upcoming" | "verified" => Tone::Positive,
            "expired" | "closed" | "past" => Tone::Neutral,
            "draft" | "pending" | "unverified" => Tone::Warning,
            "inactive" | "rejected" => Tone::Negative,
            _ => Tone::Info,
        };
        Self::Badge(label.to_string(), tone)
    }
}

/// Колонка таблицы; `key` совпадает с полем сортировки сущности
pub struct Column<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub render: fn(&T) -> Cell,
}

impl<T> Column<T> {
    pub fn new(key: &'static str, label: &'static str, render: fn(&T) -> Cell) -> Self {
        Self {
            key,
            label,
            sortable: true,
            render,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

fn render_cell(cell: Cell) -> AnyView {
    match cell {
        Cell::Text(text) => view! { <TableCellLayout truncate=true>{text}</TableCellLayout> }.into_any(),
        Cell::Badge(label, tone) => view! {
            <Badge appearance=BadgeAppearance::Tint color=tone.badge_color()>{label}</Badge>
        }
        .into_any(),
        Cell::Image(Some(url)) => view! { <img class="table-thumb" src=url alt="" /> }.into_any(),
        Cell::Image(None) => view! { <span class="table-thumb table-thumb--empty"></span> }.into_any(),
    }
}

/// Показать ошибку провайдера; 401 завершает сессию
fn report_error(auth: RwSignal<AuthState>, toasts: ToastService, err: &ProviderError) {
    if matches!(err, ProviderError::Unauthorized) {
        sign_out(auth);
    }
    toasts.error(err.user_message());
}

/// Выполнить билет и все повторные запросы, которые попросит контроллер
async fn run_ticket<T: Entity + Send + Sync>(
    list: RwSignal<RecordListController<T>>,
    auth: RwSignal<AuthState>,
    toasts: ToastService,
    ticket: LoadTicket,
) {
    let mut next = Some(ticket);
    while let Some(ticket) = next.take() {
        let provider = HttpDataProvider::new(auth.with_untracked(AuthState::context));
        let result = ticket.fetch::<T, _>(&provider).await;
        match list.try_update(|c| c.complete_load(ticket, result)) {
            Some(LoadOutcome::Refetch(again)) => next = Some(again),
            Some(LoadOutcome::Failed(err)) => report_error(auth, toasts, &err),
            Some(LoadOutcome::Applied) | Some(LoadOutcome::Stale) | None => {}
        }
    }
}

/// Таблица, фильтры, пагинация и диалог формы для сущности `T`
pub fn record_list_view<T>(columns: Vec<Column<T>>) -> impl IntoView
where
    T: Entity + Send + Sync,
{
    let auth = use_auth();
    let toasts = use_toasts();

    let list = RwSignal::new(RecordListController::<T>::new(ListSettings::for_entity::<T>()));
    let editing: RwSignal<Option<RwSignal<EntityFormValidator<T>>>> = RwSignal::new(None);
    let pending_delete: RwSignal<Option<T>> = RwSignal::new(None);
    let confirm_open = RwSignal::new(false);
    let columns = StoredValue::new(columns);

    let run = move |ticket: Option<LoadTicket>| {
        if let Some(ticket) = ticket {
            spawn_local(run_ticket(list, auth, toasts, ticket));
        }
    };

    // Ошибка мутации: "не найдено" означает устаревший список
    let mutation_failed = move |err: ProviderError| {
        report_error(auth, toasts, &err);
        run(list.try_update(|c| c.on_provider_error(&err)).flatten());
    };

    run(list.try_update(|c| c.begin_load()));
    on_cleanup(move || {
        list.try_update(|c| c.dispose());
    });

    let on_filter_change = Callback::new(move |changes: FilterState| {
        run(list.try_update(|c| c.apply_filters(&changes)).flatten());
    });
    let on_filter_clear = Callback::new(move |_| {
        run(list.try_update(|c| c.clear_filters()).flatten());
    });
    let on_page_change = Callback::new(move |page: usize| {
        run(list.try_update(|c| c.set_page(page)).flatten());
    });
    let on_page_size_change = Callback::new(move |size: usize| {
        run(list.try_update(|c| c.set_page_size(size)).flatten());
    });

    let on_saved = Callback::new(move |_| run(list.try_update(|c| c.on_mutation_complete())));
    let on_form_failed = Callback::new(mutation_failed);
    let on_form_closed = Callback::new(move |_| editing.set(None));

    let confirm_delete = move |_| {
        confirm_open.set(false);
        let Some(record) = pending_delete.get_untracked() else {
            return;
        };
        spawn_local(async move {
            let provider = HttpDataProvider::new(auth.with_untracked(AuthState::context));
            match provider.delete::<T>(record.id()).await {
                Ok(()) => {
                    log::info!("{} {} deleted", T::ELEMENT_NAME, record.id());
                    toasts.success(format!("{} deleted", T::ELEMENT_NAME));
                    run(list.try_update(|c| c.on_mutation_complete()));
                }
                Err(err) => mutation_failed(err),
            }
        });
    };

    let header_cells = move || {
        columns.with_value(|cols| {
            cols.iter()
                .map(|col| {
                    let key = col.key;
                    let label = col.label;
                    if col.sortable {
                        view! {
                            <TableHeaderCell>
                                <span
                                    class="table-header--sortable"
                                    on:click=move |_| run(list.try_update(|c| c.toggle_sort(key)).flatten())
                                >
                                    {label}
                                    {move || list.with(|c| sort_indicator(c.sort(), key))}
                                </span>
                            </TableHeaderCell>
                        }
                        .into_any()
                    } else {
                        view! { <TableHeaderCell>{label}</TableHeaderCell> }.into_any()
                    }
                })
                .collect_view()
        })
    };

    let rows = move || {
        let records = list.with(|c| c.visible().to_vec());
        records
            .into_iter()
            .map(|record| {
                let cells = columns.with_value(|cols| {
                    cols.iter()
                        .map(|col| {
                            let render = col.render;
                            let record = record.clone();
                            view! { <TableCell>{render_cell(render(&record))}</TableCell> }
                        })
                        .collect_view()
                });
                let for_edit = record.clone();
                let for_delete = record.clone();
                view! {
                    <TableRow>
                        {cells}
                        <TableCell>
                            <div class="table-actions">
                                <Button
                                    appearance=ButtonAppearance::Subtle
                                    on_click=move |_| match EntityFormValidator::for_record(&for_edit) {
                                        Ok(form) => editing.set(Some(RwSignal::new(form))),
                                        Err(e) => {
                                            log::error!("Cannot edit {} {}: {}", T::ELEMENT_NAME, for_edit.id(), e);
                                            toasts.error(format!("Cannot open {} for editing", T::ELEMENT_NAME.to_lowercase()));
                                        }
                                    }
                                >
                                    {icon("edit")}
                                </Button>
                                <Button
                                    appearance=ButtonAppearance::Subtle
                                    on_click=move |_| {
                                        pending_delete.set(Some(for_delete.clone()));
                                        confirm_open.set(true);
                                    }
                                >
                                    {icon("trash")}
                                </Button>
                            </div>
                        </TableCell>
                    </TableRow>
                }
            })
            .collect_view()
    };

    view! {
        <div class="page">
            <div class="page__header">
                <h2 class="page__title">{T::LIST_NAME}</h2>
                <div class="page__actions">
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| run(list.try_update(|c| c.refresh()))
                    >
                        {icon("refresh")}
                        " Refresh"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=move |_| editing.set(Some(RwSignal::new(EntityFormValidator::new())))
                    >
                        {icon("plus")}
                        {format!(" New {}", T::ELEMENT_NAME.to_lowercase())}
                    </Button>
                </div>
            </div>

            <FilterBar
                specs=T::filter_specs()
                filters=Signal::derive(move || list.with(|c| c.filters().clone()))
                on_change=on_filter_change
                on_clear=on_filter_clear
            />

            <div class="page__content">
                <Show when=move || list.with(|c| c.is_loading())>
                    <div class="page__loading">
                        <Spinner size=SpinnerSize::Small />
                    </div>
                </Show>
                <Table>
                    <TableHeader>
                        <TableRow>
                            {header_cells}
                            <TableHeaderCell>""</TableHeaderCell>
                        </TableRow>
                    </TableHeader>
                    <TableBody>{rows}</TableBody>
                </Table>
                <Show when=move || list.with(|c| c.is_loaded() && c.visible().is_empty())>
                    <div class="page__empty">"No records found"</div>
                </Show>
            </div>

            <PaginationControls
                current_page=Signal::derive(move || list.with(|c| c.page_state().page))
                total_pages=Signal::derive(move || list.with(|c| c.total_pages()))
                total_count=Signal::derive(move || list.with(|c| c.display_total()))
                page_size=Signal::derive(move || list.with(|c| c.page_state().page_size))
                on_page_change=on_page_change
                on_page_size_change=on_page_size_change
            />

            <Dialog open=confirm_open>
                <DialogSurface>
                    <DialogBody>
                        <DialogTitle>{format!("Delete {}", T::ELEMENT_NAME.to_lowercase())}</DialogTitle>
                        <DialogContent>"This record will be removed. Continue?"</DialogContent>
                        <DialogActions>
                            <Button appearance=ButtonAppearance::Secondary on_click=move |_| confirm_open.set(false)>
                                "Cancel"
                            </Button>
                            <Button appearance=ButtonAppearance::Primary on_click=confirm_delete>
                                "Delete"
                            </Button>
                        </DialogActions>
                    </DialogBody>
                </DialogSurface>
            </Dialog>

            {move || {
                editing.get().map(|validator| {
                    entity_form_dialog::<T>(validator, on_saved, on_form_failed, on_form_closed)
                })
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: &[(&str, &str)] = &[("active", "Active"), ("expired", "Expired")];

    #[test]
    fn test_status_cell_uses_label_and_tone() {
        assert_eq!(
            Cell::status("expired", STATUSES),
            Cell::Badge("Expired".into(), Tone::Neutral)
        );
        assert_eq!(
            Cell::status("archived", STATUSES),
            Cell::Badge("archived".into(), Tone::Info)
        );
    }

    #[test]
    fn test_optional_cell_placeholder() {
        assert_eq!(Cell::opt(None::<String>), Cell::Text("-".into()));
        assert_eq!(Cell::opt(Some(12.5)), Cell::Text("12.5".into()));
    }
}
