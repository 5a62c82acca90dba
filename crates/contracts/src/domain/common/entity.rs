use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;
use std::fmt::Debug;

use super::RecordId;
use crate::shared::form::FormSchema;
use crate::shared::list::{FilterContext, FilterSpec, FilterState, FilterValue, ListMode};

/// Трейт для сущности, которой управляет админка
///
/// Один и тот же трейт используют список (фильтрация, сортировка),
/// форма (схема полей и правил) и провайдер (имя коллекции).
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + 'static {
    // ============================================================================
    // Метаданные класса (статические данные)
    // ============================================================================

    /// Индекс сущности в системе (например, "a003")
    const INDEX: &'static str;

    /// Имя коллекции у провайдера (например, "coupons")
    const COLLECTION: &'static str;

    /// Имя элемента для UI (единственное число)
    const ELEMENT_NAME: &'static str;

    /// Имя списка для UI (множественное число)
    const LIST_NAME: &'static str;

    /// Где выполняется фильтрация и пагинация списка
    const LIST_MODE: ListMode;

    // ============================================================================
    // Методы экземпляра
    // ============================================================================

    /// ID записи
    fn id(&self) -> &RecordId;

    /// Проверка одного непустого фильтра.
    ///
    /// Неизвестные ключи не ограничивают выборку.
    fn matches_filter(&self, key: &str, value: &FilterValue, ctx: &FilterContext) -> bool;

    /// Сравнение по полю для сортируемых колонок
    fn compare_by_field(&self, _other: &Self, _field: &str) -> Ordering {
        Ordering::Equal
    }

    // ============================================================================
    // Схемы
    // ============================================================================

    /// Поля формы создания/редактирования с правилами валидации
    fn form_schema() -> FormSchema;

    /// Фильтры, которые поддерживает список
    fn filter_specs() -> Vec<FilterSpec>;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Полное имя сущности (например, "a003_coupons")
    fn full_name() -> String {
        format!("{}_{}", Self::INDEX, Self::COLLECTION)
    }

    /// Все активные фильтры должны совпасть; пустые не ограничивают
    fn matches(&self, filters: &FilterState, ctx: &FilterContext) -> bool {
        filters
            .active()
            .all(|(key, value)| self.matches_filter(key, value, ctx))
    }
}
