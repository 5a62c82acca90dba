use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use contracts::domain::a001_category::Category;
use contracts::domain::a002_article::Article;
use contracts::domain::a003_coupon::Coupon;
use contracts::domain::a004_event::Event;
use contracts::domain::a005_farmer::Farmer;
use contracts::domain::a006_crop::Crop;
use contracts::domain::a007_scheme::Scheme;
use contracts::domain::common::Entity;
use tower_http::services::ServeDir;

use crate::shared::config::config;
use crate::shared::storage::storage_root;
use crate::{handlers, system};

/// CRUD-маршруты сущности: `/api/<collection>` и `/api/<collection>/:id`
fn entity_routes<T: Entity + Send + Sync>(router: Router) -> Router {
    let base = format!("/api/{}", T::COLLECTION);
    router
        .route(
            &base,
            get(handlers::records::list::<T>).post(handlers::records::create::<T>),
        )
        .route(
            &format!("{}/:id", base),
            get(handlers::records::get_by_id::<T>)
                .put(handlers::records::update::<T>)
                .delete(handlers::records::delete::<T>),
        )
}

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    // multipart добавляет к файлу заголовки частей
    let body_limit = ((config().storage.max_upload_mb + 1) * 1024 * 1024) as usize;

    // ========================================
    // ENTITY ROUTES (PROTECTED)
    // ========================================
    let mut api = Router::new();
    api = entity_routes::<Category>(api);
    api = entity_routes::<Article>(api);
    api = entity_routes::<Coupon>(api);
    api = entity_routes::<Event>(api);
    api = entity_routes::<Farmer>(api);
    api = entity_routes::<Crop>(api);
    api = entity_routes::<Scheme>(api);

    let api = api
        // ========================================
        // STORAGE
        // ========================================
        .route("/api/upload-policy", get(handlers::storage::policy))
        .route(
            "/api/storage/:bucket",
            post(handlers::storage::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/api/storage/:bucket/:name",
            delete(handlers::storage::remove),
        )
        .route_layer(middleware::from_fn(system::auth::middleware::require_auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route("/api/auth/login", post(system::handlers::auth::login))
        .merge(api)
        .nest_service("/uploads", ServeDir::new(storage_root()))
}
