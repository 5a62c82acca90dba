pub mod api_utils;
pub mod components;
pub mod entity_form;
pub mod http;
pub mod icons;
pub mod record_list;
pub mod toast;
