//! Списки: фильтры, пагинация, сортировка и контроллер

pub mod controller;
pub mod filter;
pub mod page;
pub mod query;
pub mod sort;

pub use controller::{ListMode, ListSettings, LoadOutcome, LoadTicket, RecordListController};
pub use filter::{
    choice_matches, text_matches, FilterContext, FilterKind, FilterSpec, FilterState, FilterValue,
    CHOICE_ALL,
};
pub use page::{PageState, DEFAULT_PAGE_SIZE};
pub use query::{ListQuery, ListResponse, MAX_PAGE_SIZE};
pub use sort::{sort_indicator, SortState};
