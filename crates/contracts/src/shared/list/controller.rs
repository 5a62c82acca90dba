//! Контроллер списка: загрузка, фильтрация, пагинация, обновление после мутаций
//!
//! Контроллер не выполняет I/O сам. Каждая операция, которой нужна
//! загрузка, возвращает [`LoadTicket`]; вызывающий код выполняет запрос
//! и отдаёт результат в [`RecordListController::complete_load`].
//! Так UI может держать контроллер в сигнале и не удерживать
//! `&mut` через `await`, а устаревшие ответы отбрасываются по номеру билета.

use super::filter::{FilterContext, FilterState};
use super::page::{PageState, DEFAULT_PAGE_SIZE};
use super::query::{ListQuery, ListResponse, MAX_PAGE_SIZE};
use super::sort::SortState;
use crate::domain::common::Entity;
use crate::shared::provider::{DataProvider, ProviderError};

/// Где фильтруется и режется на страницы список
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Провайдер отдаёт всю коллекцию, фильтр и страницы считаются в памяти
    Client,
    /// Каждое изменение фильтра или страницы - новый запрос к провайдеру
    Server,
}

/// Настройки списка конкретной сущности
#[derive(Debug, Clone, PartialEq)]
pub struct ListSettings {
    pub mode: ListMode,
    pub page_size: usize,
    /// Размер порции при чтении всей коллекции в режиме `Client`
    pub fetch_limit: usize,
    pub sort: Option<SortState>,
}

impl ListSettings {
    pub fn for_entity<T: Entity>() -> Self {
        Self {
            mode: T::LIST_MODE,
            page_size: DEFAULT_PAGE_SIZE,
            fetch_limit: MAX_PAGE_SIZE,
            sort: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Выданный запрос на загрузку. Действителен, пока не выдан более новый
#[must_use = "a load ticket must be fetched and passed to complete_load"]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    seq: u64,
    query: ListQuery,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Выполнить запрос билета у провайдера
    pub async fn fetch<T: Entity, P: DataProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<ListResponse<T>, ProviderError> {
        provider.list::<T>(&self.query).await
    }
}

/// Результат применения ответа
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Ответ применён, видимые записи обновлены
    Applied,
    /// Ответ устарел (выдан более новый билет или список закрыт) и отброшен
    Stale,
    /// Провайдер вернул ошибку; видимые записи не тронуты
    Failed(ProviderError),
    /// Нужен ещё один запрос: текущая страница исчезла после уменьшения
    /// выборки (`Server`) или коллекция прочитана не полностью (`Client`)
    Refetch(LoadTicket),
}

pub struct RecordListController<T: Entity> {
    settings: ListSettings,
    ctx: FilterContext,
    filters: FilterState,
    page: PageState,
    sort: Option<SortState>,
    /// Последние успешно полученные записи
    records: Vec<T>,
    /// Запрос, которым получены `records` (режим `Server`)
    applied: Option<ListQuery>,
    /// Пагинация, соответствующая показанным записям (режим `Server`)
    shown: PageState,
    /// Уже прочитанные порции коллекции (режим `Client`)
    partial: Vec<T>,
    visible: Vec<T>,
    issued_seq: u64,
    loading: bool,
    loaded_once: bool,
    disposed: bool,
}

impl<T: Entity> RecordListController<T> {
    pub fn new(settings: ListSettings) -> Self {
        Self::with_context(settings, FilterContext::now())
    }

    pub fn with_context(settings: ListSettings, ctx: FilterContext) -> Self {
        let page = PageState::new(settings.page_size);
        let sort = settings.sort.clone();
        Self {
            settings,
            ctx,
            filters: FilterState::new(),
            page,
            sort,
            records: Vec::new(),
            applied: None,
            shown: page,
            partial: Vec::new(),
            visible: Vec::new(),
            issued_seq: 0,
            loading: false,
            loaded_once: false,
            disposed: false,
        }
    }

    // ============================================================================
    // Состояние
    // ============================================================================

    pub fn mode(&self) -> ListMode {
        self.settings.mode
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Записи текущей страницы
    pub fn visible(&self) -> &[T] {
        &self.visible
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages()
    }

    /// Общее количество для отображения: в режиме `Client` это размер отфильтрованной выборки
    pub fn display_total(&self) -> usize {
        self.page.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_once
    }

    // ============================================================================
    // Загрузка
    // ============================================================================

    /// Выдать новый билет загрузки; все ранее выданные становятся устаревшими
    pub fn begin_load(&mut self) -> LoadTicket {
        let query = match self.settings.mode {
            ListMode::Server => ListQuery {
                filters: self.filters.clone(),
                page: self.page.page,
                page_size: self.page.page_size,
                sort: self.sort.clone(),
            },
            ListMode::Client => {
                self.partial.clear();
                ListQuery::all(self.settings.fetch_limit)
            }
        };
        self.issue(query)
    }

    fn issue(&mut self, query: ListQuery) -> LoadTicket {
        self.issued_seq += 1;
        self.loading = true;
        LoadTicket {
            seq: self.issued_seq,
            query,
        }
    }

    /// Применить ответ провайдера на билет
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ListResponse<T>, ProviderError>,
    ) -> LoadOutcome {
        if self.disposed || ticket.seq != self.issued_seq {
            return LoadOutcome::Stale;
        }
        self.loading = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.partial.clear();
                self.restore_applied();
                return LoadOutcome::Failed(err);
            }
        };

        match self.settings.mode {
            ListMode::Client => {
                let total = response.total_count as usize;
                let received = response.items.len();
                self.partial.extend(response.items);
                if received > 0 && self.partial.len() < total {
                    let next = ListQuery {
                        page: ticket.query.page + 1,
                        ..ticket.query
                    };
                    return LoadOutcome::Refetch(self.issue(next));
                }
                self.records = std::mem::take(&mut self.partial);
                self.loaded_once = true;
                self.recompute();
                LoadOutcome::Applied
            }
            ListMode::Server => {
                let mut page = self.page;
                page.total_count = response.total_count as usize;
                if page.clamp() {
                    // показанные записи и их пагинация остаются до ответа на новый запрос
                    self.page.page = page.page;
                    return LoadOutcome::Refetch(self.begin_load());
                }
                self.page = page;
                self.shown = page;
                self.applied = Some(ticket.query);
                self.records = response.items;
                self.visible = self.records.clone();
                self.loaded_once = true;
                LoadOutcome::Applied
            }
        }
    }

    /// Выполнить билет до конца, включая повторный запрос после сдвига страницы
    pub async fn run<P: DataProvider + ?Sized>(
        &mut self,
        provider: &P,
        ticket: Option<LoadTicket>,
    ) -> Result<(), ProviderError> {
        let mut next = ticket;
        while let Some(ticket) = next.take() {
            let result = ticket.fetch::<T, P>(provider).await;
            match self.complete_load(ticket, result) {
                LoadOutcome::Applied | LoadOutcome::Stale => {}
                LoadOutcome::Failed(err) => return Err(err),
                LoadOutcome::Refetch(again) => next = Some(again),
            }
        }
        Ok(())
    }

    /// Загрузить с текущими фильтрами и страницей
    pub async fn load<P: DataProvider + ?Sized>(&mut self, provider: &P) -> Result<(), ProviderError> {
        let ticket = self.begin_load();
        self.run(provider, Some(ticket)).await
    }

    // ============================================================================
    // Действия пользователя
    // ============================================================================

    /// Слить изменённые фильтры и сбросить страницу на первую.
    ///
    /// Без фактических изменений ничего не делает.
    pub fn apply_filters(&mut self, changes: &FilterState) -> Option<LoadTicket> {
        let merged = self.filters.merged(changes);
        if merged == self.filters {
            return None;
        }
        self.filters = merged;
        self.page.page = 1;
        self.refresh_view()
    }

    /// Снять все фильтры
    pub fn clear_filters(&mut self) -> Option<LoadTicket> {
        if self.filters.is_empty() {
            return None;
        }
        self.filters = FilterState::new();
        self.page.page = 1;
        self.refresh_view()
    }

    /// Перейти на страницу; вне диапазона `1..=total_pages` ничего не делает
    pub fn set_page(&mut self, page: usize) -> Option<LoadTicket> {
        if !self.page.is_valid_page(page) || page == self.page.page {
            return None;
        }
        self.page.page = page;
        self.refresh_view()
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Option<LoadTicket> {
        if page_size == 0 || page_size == self.page.page_size {
            return None;
        }
        self.page.page_size = page_size;
        self.page.page = 1;
        self.refresh_view()
    }

    /// Клик по сортируемой колонке
    pub fn toggle_sort(&mut self, field: &str) -> Option<LoadTicket> {
        self.sort = Some(SortState::toggled(self.sort.as_ref(), field));
        self.page.page = 1;
        self.refresh_view()
    }

    /// После успешного create/update/delete всегда перечитываем с провайдера
    pub fn on_mutation_complete(&mut self) -> LoadTicket {
        self.begin_load()
    }

    /// Явное "Обновить" пользователем
    pub fn refresh(&mut self) -> LoadTicket {
        self.begin_load()
    }

    /// Ошибка "не найдено" означает, что список устарел
    pub fn on_provider_error(&mut self, error: &ProviderError) -> Option<LoadTicket> {
        error.is_not_found().then(|| self.begin_load())
    }

    /// Список закрыт: все последующие ответы игнорируются
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.loading = false;
    }

    // ============================================================================
    // Internal
    // ============================================================================

    /// Вернуть фильтры и пагинацию к тем, что соответствуют показанным записям
    fn restore_applied(&mut self) {
        if let Some(query) = &self.applied {
            self.filters = query.filters.clone();
            self.sort = query.sort.clone();
            self.page = self.shown;
        }
    }

    fn refresh_view(&mut self) -> Option<LoadTicket> {
        match self.settings.mode {
            ListMode::Client => {
                self.recompute();
                None
            }
            ListMode::Server => Some(self.begin_load()),
        }
    }

    /// Фильтр -> сортировка -> срез страницы по данным в памяти
    fn recompute(&mut self) {
        let mut filtered: Vec<&T> = self
            .records
            .iter()
            .filter(|r| r.matches(&self.filters, &self.ctx))
            .collect();
        if let Some(sort) = &self.sort {
            filtered.sort_by(|a, b| sort.apply(a.compare_by_field(b, &sort.field)));
        }
        self.page.total_count = filtered.len();
        self.page.clamp();
        let range = self.page.slice_range(filtered.len());
        self.visible = filtered[range].iter().map(|r| (*r).clone()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_coupon::Coupon;
    use crate::domain::a005_farmer::Farmer;
    use crate::domain::common::RecordId;
    use crate::shared::list::FilterValue;
    use crate::shared::provider::memory::MemoryProvider;
    use chrono::NaiveDate;

    fn ctx() -> FilterContext {
        FilterContext::new(NaiveDate::from_ymd_opt(2024, 6, 15).expect("date"))
    }

    fn farmers(count: i64) -> Vec<Farmer> {
        (1..=count)
            .map(|n| Farmer {
                id: RecordId::from(n),
                name: format!("Farmer {:02}", n),
                phone: format!("98765{:05}", n),
                state: if n % 2 == 0 { "punjab" } else { "bihar" }.into(),
                ..Default::default()
            })
            .collect()
    }

    fn coupons() -> Vec<Coupon> {
        let today = ctx().today;
        (1..=30)
            .map(|n| Coupon {
                id: RecordId::from(n),
                code: format!("SAVE{}", n),
                discount_percentage: 10.0,
                end_date: Some(if n % 3 == 0 {
                    today - chrono::Duration::days(1)
                } else {
                    today
                }),
                is_active: n % 5 != 0,
                ..Default::default()
            })
            .collect()
    }

    fn server_list(provider: &MemoryProvider, count: i64) -> RecordListController<Farmer> {
        provider.seed(&farmers(count));
        RecordListController::with_context(ListSettings::for_entity::<Farmer>().with_page_size(10), ctx())
    }

    fn ids<T: Entity>(list: &RecordListController<T>) -> Vec<String> {
        list.visible().iter().map(|r| r.id().as_string()).collect()
    }

    #[tokio::test]
    async fn test_pagination_bounds_for_25_records() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);
        list.load(&provider).await.expect("load");
        assert_eq!(list.total_pages(), 3);
        assert_eq!(list.visible().len(), 10);

        assert!(list.set_page(0).is_none());
        assert!(list.set_page(4).is_none());
        assert_eq!(list.page_state().page, 1);

        let ticket = list.set_page(3).expect("page 3 is valid");
        assert_eq!(ticket.query().page, 3);
        list.run(&provider, Some(ticket)).await.expect("page 3");
        assert_eq!(list.visible().len(), 5);
        assert_eq!(ids(&list), vec!["21", "22", "23", "24", "25"]);
    }

    #[tokio::test]
    async fn test_filter_change_resets_page() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);
        list.load(&provider).await.expect("load");
        let ticket = list.set_page(2);
        list.run(&provider, ticket).await.expect("page 2");
        assert_eq!(list.page_state().page, 2);

        let changes = FilterState::new().with("state", FilterValue::choice("punjab"));
        let ticket = list.apply_filters(&changes).expect("server mode reloads");
        assert_eq!(ticket.query().page, 1);
        assert_eq!(ticket.query().filters, changes);
        list.run(&provider, Some(ticket)).await.expect("filtered");
        assert_eq!(list.display_total(), 12);
        assert_eq!(list.page_state().page, 1);
    }

    #[tokio::test]
    async fn test_same_filters_twice_is_noop() {
        let provider = MemoryProvider::new(ctx());
        provider.seed(&coupons());
        let mut list = RecordListController::<Coupon>::with_context(
            ListSettings::for_entity::<Coupon>().with_page_size(10),
            ctx(),
        );
        list.load(&provider).await.expect("load");

        let active = FilterState::new().with("status", FilterValue::choice("active"));
        assert!(list.apply_filters(&active).is_none());
        let first = ids(&list);
        let total = list.display_total();
        assert!(list.apply_filters(&active).is_none());
        assert_eq!(ids(&list), first);
        assert_eq!(list.display_total(), total);
        assert_eq!(provider.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_client_mode_total_is_filtered_count() {
        let provider = MemoryProvider::new(ctx());
        provider.seed(&coupons());
        let mut list = RecordListController::<Coupon>::with_context(
            ListSettings::for_entity::<Coupon>().with_page_size(10),
            ctx(),
        );
        list.load(&provider).await.expect("load");
        assert_eq!(list.display_total(), 30);
        assert_eq!(provider.list_calls()[0].page_size, MAX_PAGE_SIZE);

        // 30 купонов: 10 с истёкшим сроком (n % 3 == 0), ещё 4 выключены (n % 5 == 0, n % 3 != 0)
        let active = FilterState::new().with("status", FilterValue::choice("active"));
        let _ = list.apply_filters(&active);
        assert_eq!(list.display_total(), 16);
        assert_eq!(list.total_pages(), 2);
        assert!(list.visible().iter().all(|c| c.status(ctx().today).as_str() == "active"));

        let none = list.set_page(2);
        assert!(none.is_none());
        assert_eq!(list.visible().len(), 6);
        assert_eq!(list.page_state().page, 2);

        let _ = list.clear_filters();
        assert_eq!(list.display_total(), 30);
        assert_eq!(list.page_state().page, 1);
    }

    #[tokio::test]
    async fn test_sort_applies_after_filter() {
        let provider = MemoryProvider::new(ctx());
        provider.seed(&coupons());
        let mut list = RecordListController::<Coupon>::with_context(
            ListSettings::for_entity::<Coupon>().with_page_size(5),
            ctx(),
        );
        list.load(&provider).await.expect("load");
        let _ = list.toggle_sort("code");
        let _ = list.toggle_sort("code");
        assert_eq!(list.sort(), Some(&SortState::desc("code")));
        assert_eq!(list.visible()[0].code, "SAVE9");
    }

    #[tokio::test]
    async fn test_refetch_after_mutation() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 3);
        list.load(&provider).await.expect("load");
        assert_eq!(ids(&list), vec!["1", "2", "3"]);

        provider
            .delete::<Farmer>(&RecordId::from(2))
            .await
            .expect("delete");
        assert_eq!(ids(&list), vec!["1", "2", "3"]);

        let ticket = list.on_mutation_complete();
        list.run(&provider, Some(ticket)).await.expect("refetch");
        assert_eq!(ids(&list), vec!["1", "3"]);
        assert_eq!(provider.list_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);

        let first = list.begin_load();
        let second = list.refresh();
        let stale = first.fetch::<Farmer, _>(&provider).await;
        let fresh = second.fetch::<Farmer, _>(&provider).await;

        assert_eq!(list.complete_load(second, fresh), LoadOutcome::Applied);
        assert_eq!(list.complete_load(first, stale), LoadOutcome::Stale);
        assert_eq!(list.visible().len(), 10);
    }

    #[tokio::test]
    async fn test_dispose_drops_responses() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 5);
        let ticket = list.begin_load();
        let result = ticket.fetch::<Farmer, _>(&provider).await;
        list.dispose();
        assert_eq!(list.complete_load(ticket, result), LoadOutcome::Stale);
        assert!(list.visible().is_empty());
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_records() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);
        list.load(&provider).await.expect("load");
        let before = ids(&list);

        provider.fail_next(ProviderError::Network("timeout".into()));
        let ticket = list.set_page(2);
        let err = list.run(&provider, ticket).await.expect_err("network failure");
        assert_eq!(err, ProviderError::Network("timeout".into()));
        assert_eq!(ids(&list), before);
        assert_eq!(list.page_state().page, 1);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_page_clamped_after_records_disappear() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);
        list.load(&provider).await.expect("load");
        let ticket = list.set_page(3);
        list.run(&provider, ticket).await.expect("page 3");

        for n in 13..=25 {
            provider
                .delete::<Farmer>(&RecordId::from(n))
                .await
                .expect("delete");
        }
        let ticket = list.refresh();
        list.run(&provider, Some(ticket)).await.expect("refetch");
        assert_eq!(list.page_state().page, 2);
        assert_eq!(list.total_pages(), 2);
        assert_eq!(ids(&list), vec!["11", "12"]);
    }

    #[tokio::test]
    async fn test_failed_refetch_after_clamp_restores_shown_page() {
        let provider = MemoryProvider::new(ctx());
        let mut list = server_list(&provider, 25);
        list.load(&provider).await.expect("load");
        let ticket = list.set_page(3);
        list.run(&provider, ticket).await.expect("page 3");
        let shown = ids(&list);

        for n in 13..=25 {
            provider
                .delete::<Farmer>(&RecordId::from(n))
                .await
                .expect("delete");
        }
        let ticket = list.refresh();
        let result = ticket.fetch::<Farmer, _>(&provider).await;
        let again = match list.complete_load(ticket, result) {
            LoadOutcome::Refetch(again) => again,
            other => panic!("expected refetch, got {:?}", other),
        };
        assert_eq!(again.query().page, 2);

        let outcome = list.complete_load(again, Err(ProviderError::Network("offline".into())));
        assert_eq!(outcome, LoadOutcome::Failed(ProviderError::Network("offline".into())));
        assert_eq!(ids(&list), shown);
        assert_eq!(list.page_state().page, 3);
        assert_eq!(list.display_total(), 25);
        assert_eq!(list.total_pages(), 3);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_client_mode_reads_whole_collection() {
        let provider = MemoryProvider::new(ctx());
        let many: Vec<Coupon> = (1..=1001)
            .map(|n| Coupon {
                id: RecordId::from(n),
                code: format!("BULK{}", n),
                discount_percentage: 5.0,
                ..Default::default()
            })
            .collect();
        provider.seed(&many);
        let mut list = RecordListController::<Coupon>::with_context(
            ListSettings::for_entity::<Coupon>().with_page_size(10),
            ctx(),
        );
        list.load(&provider).await.expect("load");

        assert_eq!(list.display_total(), 1001);
        assert_eq!(list.total_pages(), 101);
        let pages: Vec<usize> = provider.list_calls().iter().map(|q| q.page).collect();
        assert_eq!(pages, vec![1, 2]);

        let ticket = list.refresh();
        let first = ticket.fetch::<Coupon, _>(&provider).await;
        let again = match list.complete_load(ticket, first) {
            LoadOutcome::Refetch(again) => again,
            other => panic!("expected second chunk, got {:?}", other),
        };
        let outcome = list.complete_load(again, Err(ProviderError::Network("offline".into())));
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(list.display_total(), 1001);
    }

    #[test]
    fn test_not_found_requests_refresh() {
        let mut list = RecordListController::<Farmer>::with_context(ListSettings::for_entity::<Farmer>(), ctx());
        let missing = ProviderError::not_found::<Farmer>(&RecordId::from(9));
        assert!(list.on_provider_error(&missing).is_some());
        assert!(list
            .on_provider_error(&ProviderError::Network("x".into()))
            .is_none());
    }
}
