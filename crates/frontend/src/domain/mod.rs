//! Страницы сущностей и их регистрация в меню

pub mod a001_category;
pub mod a002_article;
pub mod a003_coupon;
pub mod a004_event;
pub mod a005_farmer;
pub mod a006_crop;
pub mod a007_scheme;

use contracts::domain::a001_category::Category;
use contracts::domain::a002_article::Article;
use contracts::domain::a003_coupon::Coupon;
use contracts::domain::a004_event::Event;
use contracts::domain::a005_farmer::Farmer;
use contracts::domain::a006_crop::Crop;
use contracts::domain::a007_scheme::Scheme;
use contracts::domain::common::Entity;
use leptos::prelude::*;

use a001_category::ui::list::CategoryList;
use a002_article::ui::list::ArticleList;
use a003_coupon::ui::list::CouponList;
use a004_event::ui::list::EventList;
use a005_farmer::ui::list::FarmerList;
use a006_crop::ui::list::CropList;
use a007_scheme::ui::list::SchemeList;

/// Заголовок пункта меню по ключу страницы (`<index>_<collection>`)
pub fn page_title(key: &str) -> &'static str {
    match key {
        "a001_categories" => Category::LIST_NAME,
        "a002_articles" => Article::LIST_NAME,
        "a003_coupons" => Coupon::LIST_NAME,
        "a004_events" => Event::LIST_NAME,
        "a005_farmers" => Farmer::LIST_NAME,
        "a006_crops" => Crop::LIST_NAME,
        "a007_schemes" => Scheme::LIST_NAME,
        _ => "Unknown page",
    }
}

pub fn render_page(key: &str) -> AnyView {
    match key {
        "a001_categories" => view! { <CategoryList /> }.into_any(),
        "a002_articles" => view! { <ArticleList /> }.into_any(),
        "a003_coupons" => view! { <CouponList /> }.into_any(),
        "a004_events" => view! { <EventList /> }.into_any(),
        "a005_farmers" => view! { <FarmerList /> }.into_any(),
        "a006_crops" => view! { <CropList /> }.into_any(),
        "a007_schemes" => view! { <SchemeList /> }.into_any(),
        other => {
            log::warn!("Unknown page key: {}", other);
            view! { <div class="page-placeholder">{format!("Unknown page: {}", other)}</div> }
                .into_any()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_keys_match_entity_names() {
        let keys = [
            Category::full_name(),
            Article::full_name(),
            Coupon::full_name(),
            Event::full_name(),
            Farmer::full_name(),
            Crop::full_name(),
            Scheme::full_name(),
        ];
        for key in keys {
            assert_ne!(page_title(&key), "Unknown page", "{} is not registered", key);
        }
    }
}
