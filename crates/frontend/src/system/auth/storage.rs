use web_sys::window;

const ACCESS_TOKEN_KEY: &str = "baykart_access_token";
const USERNAME_KEY: &str = "baykart_username";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Save the session to localStorage
pub fn save_session(token: &str, username: &str) {
    if let Some(storage) = get_local_storage() {
        let _ = storage.set_item(ACCESS_TOKEN_KEY, token);
        let _ = storage.set_item(USERNAME_KEY, username);
    }
}

pub fn get_access_token() -> Option<String> {
    get_local_storage()?.get_item(ACCESS_TOKEN_KEY).ok()?
}

pub fn get_username() -> Option<String> {
    get_local_storage()?.get_item(USERNAME_KEY).ok()?
}

/// Clear all authentication data
pub fn clear_session() {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(ACCESS_TOKEN_KEY);
        let _ = storage.remove_item(USERNAME_KEY);
    }
}
