//! Элемент ввода одного поля формы по его `FieldKind`

use contracts::shared::form::{FieldKind, FieldSpec};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::shared::icons::icon;

/// Прочитать выбранный пользователем файл целиком
pub async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{:?}", e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn input_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer | FieldKind::Decimal => "number",
        FieldKind::Date => "date",
        FieldKind::Time => "time",
        FieldKind::Url => "url",
        _ => "text",
    }
}

#[component]
pub fn FieldInput(
    spec: FieldSpec,
    #[prop(into)] value: Signal<String>,
    /// Ошибка показывается, только если поле тронуто
    #[prop(into)]
    error: Signal<Option<String>>,
    #[prop(into)] disabled: Signal<bool>,
    on_input: Callback<String>,
    on_blur: Callback<()>,
    /// Для полей-картинок: выбран файл
    #[prop(optional)]
    on_file: Option<Callback<web_sys::File>>,
    #[prop(optional)] on_clear_file: Option<Callback<()>>,
) -> impl IntoView {
    let id = format!("field-{}", spec.name);
    let placeholder = spec.placeholder.unwrap_or("");

    let control = match spec.kind.clone() {
        FieldKind::TextArea => view! {
            <textarea
                id=id.clone()
                rows="4"
                placeholder=placeholder
                prop:value=move || value.get()
                disabled=move || disabled.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
                on:blur=move |_| on_blur.run(())
            ></textarea>
        }
        .into_any(),
        FieldKind::Flag => view! {
            <input
                id=id.clone()
                type="checkbox"
                prop:checked=move || value.get() == "true"
                disabled=move || disabled.get()
                on:change=move |ev| {
                    let checked = event_target::<web_sys::HtmlInputElement>(&ev).checked();
                    on_input.run(checked.to_string());
                    on_blur.run(());
                }
            />
        }
        .into_any(),
        FieldKind::Choice(options) => view! {
            <select
                id=id.clone()
                prop:value=move || value.get()
                disabled=move || disabled.get()
                on:change=move |ev| {
                    on_input.run(event_target_value(&ev));
                    on_blur.run(());
                }
            >
                <option value="">"Select..."</option>
                {options.into_iter().map(|(v, label)| view! {
                    <option value=v>{label}</option>
                }).collect_view()}
            </select>
        }
        .into_any(),
        FieldKind::Image { .. } => view! {
            <div class="field-image">
                <Show when=move || !value.get().is_empty()>
                    <img class="field-image__preview" src=move || value.get() alt="" />
                    <button
                        class="field-image__remove"
                        title="Remove"
                        disabled=move || disabled.get()
                        on:click=move |_| {
                            if let Some(cb) = on_clear_file {
                                cb.run(());
                            }
                        }
                    >
                        {icon("trash")}
                    </button>
                </Show>
                <label class="field-image__pick">
                    {icon("upload")}
                    <input
                        id=id.clone()
                        type="file"
                        accept="image/*"
                        disabled=move || disabled.get()
                        on:change=move |ev| {
                            let Some(input) = ev
                                .target()
                                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                            else {
                                return;
                            };
                            if let (Some(file), Some(cb)) = (input.files().and_then(|f| f.get(0)), on_file) {
                                cb.run(file);
                            }
                            input.set_value("");
                        }
                    />
                </label>
            </div>
        }
        .into_any(),
        kind => {
            let step = matches!(kind, FieldKind::Decimal).then_some("any");
            let hint = if matches!(kind, FieldKind::Tags) && placeholder.is_empty() {
                "comma, separated"
            } else {
                placeholder
            };
            view! {
                <input
                    id=id.clone()
                    type=input_type(&kind)
                    step=step
                    placeholder=hint
                    prop:value=move || value.get()
                    disabled=move || disabled.get()
                    on:input=move |ev| on_input.run(event_target_value(&ev))
                    on:blur=move |_| on_blur.run(())
                />
            }
            .into_any()
        }
    };

    view! {
        <div class="form-group" class:form-group--invalid=move || error.with(Option::is_some)>
            <label for=id>
                {spec.label}
                {spec.required.then(|| view! { <span class="form-group__required">" *"</span> })}
            </label>
            {control}
            <Show when=move || error.with(Option::is_some)>
                <div class="form-group__error">{move || error.get().unwrap_or_default()}</div>
            </Show>
        </div>
    }
}
