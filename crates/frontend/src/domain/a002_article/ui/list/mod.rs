use contracts::domain::a002_article::{Article, ARTICLE_CATEGORIES, ARTICLE_STATUSES};
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn category_label(code: &str) -> String {
    ARTICLE_CATEGORIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn columns() -> Vec<Column<Article>> {
    vec![
        Column::new("image_url", "", |a: &Article| Cell::Image(a.image_url.clone())).unsortable(),
        Column::new("title", "Title", |a: &Article| Cell::text(&a.title)),
        Column::new("category", "Category", |a: &Article| Cell::text(category_label(&a.category))),
        Column::new("author", "Author", |a: &Article| Cell::opt(a.author.as_ref())).unsortable(),
        Column::new("published_at", "Published", |a: &Article| Cell::opt(a.published_at)),
        Column::new("status", "Status", |a: &Article| Cell::status(a.status(), ARTICLE_STATUSES)).unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn ArticleList() -> impl IntoView {
    record_list_view::<Article>(columns())
}
