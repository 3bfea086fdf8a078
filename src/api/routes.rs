//! Endpoint paths, relative to the configured base URL

pub const PROPERTIES: &str = "properties/";
pub const MY_PROPERTIES: &str = "properties/my_properties/";
pub const FAVORITES: &str = "favorites/";
pub const MESSAGES: &str = "messages/";
pub const MESSAGES_INBOX: &str = "messages/inbox/";
pub const MESSAGES_SENT: &str = "messages/sent/";
pub const MESSAGES_UNREAD_COUNT: &str = "messages/unread_count/";
pub const AUTH_LOGIN: &str = "auth/login/";
pub const AUTH_REFRESH: &str = "auth/refresh/";
pub const AUTH_ME: &str = "auth/me/";

pub fn property_detail(id: i64) -> String {
    format!("properties/{}/", id)
}

pub fn property_similar(id: i64) -> String {
    format!("properties/{}/similar/", id)
}

pub fn favorite(property_id: i64) -> String {
    format!("favorites/{}/", property_id)
}

pub fn message_mark_as_read(id: i64) -> String {
    format!("messages/{}/mark_as_read/", id)
}
