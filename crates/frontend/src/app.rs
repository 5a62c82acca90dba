use crate::layout::global_context::AppGlobalContext;
use crate::routes::routes::AppRoutes;
use crate::shared::toast::{ToastService, Toaster};
use crate::system::auth::context::AuthProvider;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Provide the AppGlobalContext store to the whole app via context.
    provide_context(AppGlobalContext::new());

    // Toasts for provider / upload errors
    provide_context(ToastService::new());

    view! {
        <AuthProvider>
            <AppRoutes />
            <Toaster />
        </AuthProvider>
    }
}
