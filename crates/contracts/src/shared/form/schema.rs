//! Схема формы: поля, их типы, вкладки и правила

use serde_json::Value;
use std::collections::BTreeMap;

use super::rules::ValidationRule;
use crate::shared::provider::{FieldErrors, Payload};

/// Сырые значения полей формы в том виде, в каком их ввёл пользователь
pub type FormValues = BTreeMap<String, String>;

/// Тип поля: определяет элемент ввода, проверку формата и приведение типа
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    TextArea,
    Integer,
    Decimal,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM`
    Time,
    /// Теги через запятую -> массив строк
    Tags,
    Flag,
    Choice(Vec<(&'static str, &'static str)>),
    Url,
    /// URL файла в объектном хранилище
    Image { bucket: &'static str },
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub tab: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub default: Option<&'static str>,
    pub rules: Vec<ValidationRule>,
    pub depends_on: Vec<&'static str>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            tab: None,
            placeholder: None,
            default: None,
            rules: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    pub fn integer(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Integer)
    }

    pub fn decimal(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Decimal)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn time(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Time)
    }

    pub fn tags(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Tags)
    }

    pub fn flag(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Flag)
    }

    pub fn choice(
        name: &'static str,
        label: &'static str,
        options: &[(&'static str, &'static str)],
    ) -> Self {
        Self::new(name, label, FieldKind::Choice(options.to_vec()))
    }

    pub fn url(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Url)
    }

    pub fn image(name: &'static str, label: &'static str, bucket: &'static str) -> Self {
        Self::new(name, label, FieldKind::Image { bucket })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn tab(mut self, tab: &'static str) -> Self {
        self.tab = Some(tab);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Добавить правило; зависимость правила регистрируется у поля
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        if let Some(dep) = rule.dependency() {
            if !self.depends_on.contains(&dep) {
                self.depends_on.push(dep);
            }
        }
        self.rules.push(rule);
        self
    }

    /// Ошибка поля для текущего состояния формы; пустая строка - ошибок нет
    pub fn validate(&self, form: &FormValues) -> String {
        let raw = form.get(self.name).map(String::as_str).unwrap_or("");
        if raw.trim().is_empty() {
            if self.required && self.kind != FieldKind::Flag {
                return format!("{} is required", self.label);
            }
            return String::new();
        }
        if let Some(message) = self.kind.check(self.label, raw) {
            return message;
        }
        self.rules
            .iter()
            .find_map(|rule| rule.check(self.name, raw, form))
            .unwrap_or_default()
    }
}

/// Набор полей формы одной сущности
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Вкладки в порядке первого появления
    pub fn tabs(&self) -> Vec<&'static str> {
        let mut tabs = Vec::new();
        for tab in self.fields.iter().filter_map(|f| f.tab) {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }
        tabs
    }

    /// Поля, чьи правила зависят от `name`
    pub fn dependents_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.depends_on.iter().any(|d| *d == name))
            .map(|f| f.name)
    }

    /// Значения новой записи
    pub fn default_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| {
                let value = f.default.unwrap_or(match f.kind {
                    FieldKind::Flag => "false",
                    _ => "",
                });
                (f.name.to_string(), value.to_string())
            })
            .collect()
    }

    /// Значения формы из сериализованной записи
    pub fn values_from_record(&self, record: &Value) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.to_raw(record.get(f.name))))
            .collect()
    }

    /// Ошибки всех полей (только непустые)
    pub fn validate_values(&self, form: &FormValues) -> FieldErrors {
        self.fields
            .iter()
            .filter_map(|f| {
                let error = f.validate(form);
                (!error.is_empty()).then(|| (f.name.to_string(), error))
            })
            .collect()
    }

    /// Проверка уже типизированного payload (серверная сторона)
    pub fn validate_payload(&self, payload: &Payload) -> FieldErrors {
        let form: FormValues = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.kind.to_raw(payload.get(f.name))))
            .collect();
        self.validate_values(&form)
    }

    /// Привести сырые значения к типам сущности
    pub fn to_payload(&self, form: &FormValues) -> Result<Payload, FieldErrors> {
        let mut payload = Payload::new();
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            let raw = form.get(field.name).map(String::as_str).unwrap_or("");
            match field.kind.coerce(raw) {
                Ok(value) => {
                    payload.insert(field.name.to_string(), value);
                }
                Err(_) => {
                    let message = field
                        .kind
                        .check(field.label, raw)
                        .unwrap_or_else(|| format!("{} is invalid", field.label));
                    errors.insert(field.name.to_string(), message);
                }
            }
        }
        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::form::rules;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title")
                .required()
                .tab("General")
                .rule(rules::min_len(3, "Title must be at least 3 characters")),
            FieldSpec::date("start_date", "Start date").tab("Schedule"),
            FieldSpec::date("end_date", "End date")
                .tab("Schedule")
                .rule(rules::after("start_date", "End date must be after start date")),
            FieldSpec::decimal("price", "Price"),
            FieldSpec::flag("is_active", "Active").default_value("true"),
        ])
    }

    #[test]
    fn test_tabs_and_dependents() {
        let schema = schema();
        assert_eq!(schema.tabs(), vec!["General", "Schedule"]);
        assert_eq!(schema.dependents_of("start_date").collect::<Vec<_>>(), vec!["end_date"]);
        assert_eq!(schema.dependents_of("title").count(), 0);
    }

    #[test]
    fn test_defaults() {
        let values = schema().default_values();
        assert_eq!(values.get("is_active").map(String::as_str), Some("true"));
        assert_eq!(values.get("title").map(String::as_str), Some(""));
    }

    #[test]
    fn test_required_message_and_kind_check() {
        let schema = schema();
        let mut form = schema.default_values();
        let errors = schema.validate_values(&form);
        assert_eq!(errors.get("title").map(String::as_str), Some("Title is required"));
        assert!(!errors.contains_key("price"));

        form.insert("price".into(), "12,5".into());
        let errors = schema.validate_values(&form);
        assert_eq!(errors.get("price").map(String::as_str), Some("Price must be a number"));
    }

    #[test]
    fn test_validate_payload_uses_same_rules() {
        let schema = schema();
        let mut payload = Payload::new();
        payload.insert("title".into(), Value::from("Hi"));
        payload.insert("start_date".into(), Value::from("2024-05-10"));
        payload.insert("end_date".into(), Value::from("2024-05-01"));
        let errors = schema.validate_payload(&payload);
        assert_eq!(
            errors.get("title").map(String::as_str),
            Some("Title must be at least 3 characters")
        );
        assert!(errors.contains_key("end_date"));
    }
}
