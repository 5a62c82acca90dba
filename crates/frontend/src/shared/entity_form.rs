//! Диалог создания/редактирования записи поверх `EntityFormValidator`

use contracts::domain::common::Entity;
use contracts::shared::form::{EntityFormValidator, FieldKind, SubmitError};
use contracts::shared::provider::ProviderError;
use contracts::shared::storage::{ObjectStorage, StoredObject, UploadError, UploadFile, UploadPolicy};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::shared::components::field_input::{read_file_bytes, FieldInput};
use crate::shared::http::{HttpDataProvider, HttpObjectStorage};
use crate::shared::toast::use_toasts;
use crate::system::auth::context::{sign_out, use_auth, AuthState};

/// Удалить файлы, загруженные формой, которые так и не сохранились в записи
fn remove_orphans(storage: HttpObjectStorage, orphans: Vec<StoredObject>) {
    if orphans.is_empty() {
        return;
    }
    spawn_local(async move {
        for object in orphans {
            if let Err(e) = storage.remove(&object.bucket, &object.path).await {
                log::warn!("Failed to remove orphan upload {}: {}", object.path, e);
            }
        }
    });
}

/// Диалог формы. Закрытие без сохранения (кнопка, Esc, фон) удаляет загрузки сессии
pub fn entity_form_dialog<T>(
    validator: RwSignal<EntityFormValidator<T>>,
    on_saved: Callback<()>,
    on_failed: Callback<ProviderError>,
    on_closed: Callback<()>,
) -> AnyView
where
    T: Entity + Send + Sync,
{
    let auth = use_auth();
    let toasts = use_toasts();
    let storage = HttpObjectStorage::new(auth.with_untracked(AuthState::context));

    let open = RwSignal::new(true);
    // запрашивается у сервера при первой загрузке файла
    let policy: StoredValue<Option<UploadPolicy>> = StoredValue::new(None);

    let (fields, tabs, is_edit) = validator.with_untracked(|v| {
        (v.schema().fields().to_vec(), v.schema().tabs(), v.is_edit_mode())
    });
    let selected_tab = RwSignal::new(tabs.first().map(|t| t.to_string()).unwrap_or_default());
    let has_tabs = !tabs.is_empty();

    {
        let storage = storage.clone();
        Effect::new(move |_| {
            if open.get() {
                return;
            }
            if let Some(orphans) = validator.try_update_untracked(|v| v.discard()) {
                remove_orphans(storage.clone(), orphans);
            }
            on_closed.run(());
        });
    }

    let focus_first_error = move || {
        if let Some(tab) = validator.with_untracked(|v| v.first_error()).and_then(|f| f.tab) {
            selected_tab.set(tab.to_string());
        }
    };

    let submit = move |_| {
        let prepared = match validator.try_update(|v| v.prepare_submit()) {
            Some(prepared) => prepared,
            None => return,
        };
        let request = match prepared {
            Ok(request) => request,
            Err(SubmitError::Validation { tab, .. }) => {
                if let Some(tab) = tab {
                    selected_tab.set(tab.to_string());
                }
                return;
            }
            Err(_) => return,
        };
        spawn_local(async move {
            let provider = HttpDataProvider::new(auth.with_untracked(AuthState::context));
            let result = request.send::<T, _>(&provider).await;
            match validator.try_update(|v| v.finish_submit(result)) {
                Some(Ok(record)) => {
                    log::info!("{} {} saved", T::ELEMENT_NAME, record.id());
                    toasts.success(format!("{} saved", T::ELEMENT_NAME));
                    on_saved.run(());
                    open.set(false);
                }
                Some(Err(SubmitError::Provider(ProviderError::Validation(_)))) => {
                    focus_first_error();
                }
                Some(Err(SubmitError::Provider(err))) => {
                    let gone = err.is_not_found();
                    on_failed.run(err);
                    if gone {
                        open.set(false);
                    }
                }
                Some(Err(_)) | None => {}
            }
        });
    };

    let upload_failed = move |err: &UploadError| {
        if matches!(err, UploadError::Provider(ProviderError::Unauthorized)) {
            sign_out(auth);
        }
    };

    let upload_file = {
        let storage = storage.clone();
        move |name: &'static str, file: web_sys::File| {
            let storage = storage.clone();
            spawn_local(async move {
                let bytes = match read_file_bytes(&file).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        toasts.error(format!("Could not read {}: {}", file.name(), e));
                        return;
                    }
                };
                let upload = UploadFile {
                    name: file.name(),
                    content_type: file.type_(),
                    bytes,
                };

                let rules = match policy.get_value() {
                    Some(rules) => rules,
                    None => match storage.policy().await {
                        Ok(rules) => {
                            policy.set_value(Some(rules.clone()));
                            rules
                        }
                        Err(err) => {
                            let err = UploadError::Provider(err);
                            upload_failed(&err);
                            validator.try_update(|v| v.reject_upload(name, &err));
                            return;
                        }
                    },
                };

                let request = match validator.try_update(|v| v.prepare_upload(&rules, name, upload)) {
                    Some(Ok(request)) => request,
                    Some(Err(_)) | None => return,
                };
                let mut result = Some(request.send(&storage).await);
                let applied = validator
                    .try_update(|v| result.take().map(|r| v.finish_upload(&request, r)))
                    .flatten();
                match applied {
                    Some(Ok(leftover)) => remove_orphans(storage, leftover.into_iter().collect()),
                    Some(Err(err)) => upload_failed(&err),
                    // форма уничтожена вместе с сигналом
                    None => {
                        if let Some(Ok(object)) = result {
                            remove_orphans(storage, vec![object]);
                        }
                    }
                }
            });
        }
    };

    let clear_file = {
        let storage = storage.clone();
        move |name: &'static str| {
            if let Some(Some(old)) = validator.try_update(|v| v.clear_upload(name)) {
                remove_orphans(storage.clone(), vec![old]);
            }
        }
    };

    let field_views = fields
        .into_iter()
        .map(|field| {
            let name = field.name;
            let tab = field.tab;
            let is_image = matches!(field.kind, FieldKind::Image { .. });
            let upload_file = upload_file.clone();
            let clear_file = clear_file.clone();
            view! {
                <div
                    class="form-field"
                    style:display=move || {
                        let visible = !has_tabs || tab.is_none() || selected_tab.with(|s| Some(s.as_str()) == tab);
                        if visible { "block" } else { "none" }
                    }
                >
                    <FieldInput
                        spec=field
                        value=Signal::derive(move || validator.with(|v| v.value(name).to_string()))
                        error=Signal::derive(move || validator.with(|v| v.error(name).map(str::to_string)))
                        disabled=Signal::derive(move || {
                            validator.with(|v| v.is_submitting() || v.is_uploading(name))
                        })
                        on_input=Callback::new(move |value: String| validator.update(|v| v.set_field(name, value)))
                        on_blur=Callback::new(move |_| validator.update(|v| v.touch_field(name)))
                        on_file=Callback::new(move |file: web_sys::File| upload_file(name, file))
                        on_clear_file=Callback::new(move |_| clear_file(name))
                    />
                    {is_image.then(|| view! {
                        <Show when=move || validator.with(|v| v.is_uploading(name))>
                            <Spinner size=SpinnerSize::Small />
                        </Show>
                    })}
                </div>
            }
        })
        .collect_view();

    let title = if is_edit {
        format!("Edit {}", T::ELEMENT_NAME.to_lowercase())
    } else {
        format!("New {}", T::ELEMENT_NAME.to_lowercase())
    };

    view! {
        <Dialog open=open>
            <DialogSurface>
                <DialogBody>
                    <DialogTitle>{title}</DialogTitle>
                    <DialogContent>
                        <div class="entity-form">
                            {has_tabs.then(|| view! {
                                <TabList selected_value=selected_tab>
                                    {tabs.iter().copied().map(|tab| view! {
                                        <Tab value=tab.to_string()>{tab}</Tab>
                                    }).collect_view()}
                                </TabList>
                            })}
                            <div class="entity-form__fields">{field_views}</div>
                        </div>
                    </DialogContent>
                    <DialogActions>
                        <Button appearance=ButtonAppearance::Secondary on_click=move |_| open.set(false)>
                            "Cancel"
                        </Button>
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=Signal::derive(move || {
                                validator.with(|v| !v.can_submit() || v.has_pending_uploads())
                            })
                            on_click=submit
                        >
                            {move || if validator.with(|v| v.is_submitting()) { "Saving..." } else { "Save" }}
                        </Button>
                    </DialogActions>
                </DialogBody>
            </DialogSurface>
        </Dialog>
    }
    .into_any()
}
