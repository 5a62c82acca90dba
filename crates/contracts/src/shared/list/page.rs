//! Окно пагинации списка

use serde::{Deserialize, Serialize};

/// Размер страницы по умолчанию
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Состояние пагинации: страницы нумеруются с 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    /// Количество страниц; пустой список имеет одну страницу
    pub fn total_pages(&self) -> usize {
        if self.total_count == 0 {
            1
        } else {
            (self.total_count + self.page_size - 1) / self.page_size
        }
    }

    pub fn is_valid_page(&self, page: usize) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    /// Вернуть страницу в допустимые границы. Возвращает true, если страница изменилась
    pub fn clamp(&mut self) -> bool {
        let clamped = self.page.clamp(1, self.total_pages());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    /// Смещение первой записи текущей страницы
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Диапазон индексов текущей страницы в отфильтрованном массиве
    pub fn slice_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset().min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total_count: usize, page_size: usize) -> PageState {
        PageState {
            page: 1,
            page_size,
            total_count,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(state(0, 10).total_pages(), 1);
        assert_eq!(state(10, 10).total_pages(), 1);
        assert_eq!(state(11, 10).total_pages(), 2);
        assert_eq!(state(25, 10).total_pages(), 3);
    }

    #[test]
    fn test_valid_pages_for_25_by_10() {
        let s = state(25, 10);
        let valid: Vec<usize> = (0..=5).filter(|p| s.is_valid_page(*p)).collect();
        assert_eq!(valid, vec![1, 2, 3]);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut s = PageState {
            page: 3,
            page_size: 10,
            total_count: 12,
        };
        assert!(s.clamp());
        assert_eq!(s.page, 2);

        s.total_count = 0;
        assert!(s.clamp());
        assert_eq!(s.page, 1);
        assert!(!s.clamp());
    }

    #[test]
    fn test_slice_range_last_page() {
        let s = PageState {
            page: 3,
            page_size: 10,
            total_count: 25,
        };
        assert_eq!(s.slice_range(25), 20..25);
        assert_eq!(s.slice_range(5), 5..5);
    }
}
