//! In-memory провайдер для тестов контроллера списка и формы

use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{DataProvider, Payload, ProviderError};
use crate::domain::common::{Entity, RecordId};
use crate::shared::list::{FilterContext, ListQuery, ListResponse};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(ListQuery),
    Get(RecordId),
    Create(Payload),
    Update(RecordId, Payload),
    Delete(RecordId),
}

pub(crate) struct MemoryProvider {
    collections: RefCell<BTreeMap<&'static str, Vec<Value>>>,
    ctx: FilterContext,
    calls: RefCell<Vec<Call>>,
    fail_next: RefCell<Option<ProviderError>>,
    next_id: Cell<i64>,
}

impl MemoryProvider {
    pub(crate) fn new(ctx: FilterContext) -> Self {
        Self {
            collections: RefCell::new(BTreeMap::new()),
            ctx,
            calls: RefCell::new(Vec::new()),
            fail_next: RefCell::new(None),
            next_id: Cell::new(1000),
        }
    }

    pub(crate) fn seed<T: Entity>(&self, records: &[T]) {
        let values = records
            .iter()
            .map(|r| serde_json::to_value(r).expect("serialize seed"))
            .collect::<Vec<_>>();
        self.collections
            .borrow_mut()
            .entry(T::COLLECTION)
            .or_default()
            .extend(values);
    }

    /// Следующий вызов завершится этой ошибкой
    pub(crate) fn fail_next(&self, error: ProviderError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<ListQuery> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::List(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn mutation_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Create(_) | Call::Update(..) | Call::Delete(_)))
            .count()
    }

    fn record(&self, call: Call) -> Result<(), ProviderError> {
        self.calls.borrow_mut().push(call);
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn records<T: Entity>(&self) -> Result<Vec<T>, ProviderError> {
        self.collections
            .borrow()
            .get(T::COLLECTION)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| ProviderError::Decode(e.to_string())))
            .collect()
    }

    fn position<T: Entity>(&self, id: &RecordId) -> Option<usize> {
        let id_value = serde_json::to_value(id).ok()?;
        self.collections
            .borrow()
            .get(T::COLLECTION)?
            .iter()
            .position(|v| v.get("id") == Some(&id_value))
    }
}

#[async_trait(?Send)]
impl DataProvider for MemoryProvider {
    async fn list<T: Entity>(&self, query: &ListQuery) -> Result<ListResponse<T>, ProviderError> {
        self.record(Call::List(query.clone()))?;
        let mut items: Vec<T> = self
            .records::<T>()?
            .into_iter()
            .filter(|r| r.matches(&query.filters, &self.ctx))
            .collect();
        if let Some(sort) = &query.sort {
            items.sort_by(|a, b| sort.apply(a.compare_by_field(b, &sort.field)));
        }
        let total = items.len();
        let start = query.offset().min(total);
        let end = (start + query.page_size).min(total);
        Ok(ListResponse::new(items[start..end].to_vec(), total as u64))
    }

    async fn get<T: Entity>(&self, id: &RecordId) -> Result<T, ProviderError> {
        self.record(Call::Get(id.clone()))?;
        self.records::<T>()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| ProviderError::not_found::<T>(id))
    }

    async fn create<T: Entity>(&self, payload: &Payload) -> Result<T, ProviderError> {
        self.record(Call::Create(payload.clone()))?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut object = payload.clone();
        object.insert("id".into(), Value::from(id));
        let record: T = serde_json::from_value(Value::Object(object))
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        self.seed(std::slice::from_ref(&record));
        Ok(record)
    }

    async fn update<T: Entity>(&self, id: &RecordId, payload: &Payload) -> Result<T, ProviderError> {
        self.record(Call::Update(id.clone(), payload.clone()))?;
        let index = self
            .position::<T>(id)
            .ok_or_else(|| ProviderError::not_found::<T>(id))?;
        let mut collections = self.collections.borrow_mut();
        let slot = &mut collections
            .get_mut(T::COLLECTION)
            .expect("collection exists")[index];
        if let Value::Object(existing) = slot {
            for (key, value) in payload {
                existing.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(slot.clone()).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), ProviderError> {
        self.record(Call::Delete(id.clone()))?;
        let index = self
            .position::<T>(id)
            .ok_or_else(|| ProviderError::not_found::<T>(id))?;
        if let Some(values) = self.collections.borrow_mut().get_mut(T::COLLECTION) {
            values.remove(index);
        }
        Ok(())
    }
}
