//! Visitor identity cookie

use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

pub const VISITOR_COOKIE: &str = "ivm_visitor";

/// Visitor id from the cookie, or a fresh one set on the response. Values
/// that are not UUIDs are replaced, since the id names a storage file.
pub fn visitor_id(cookies: &Cookies) -> String {
    if let Some(cookie) = cookies.get(VISITOR_COOKIE) {
        if let Ok(id) = Uuid::parse_str(cookie.value()) {
            return id.to_string();
        }
    }

    let id = Uuid::new_v4().to_string();
    let mut cookie = Cookie::new(VISITOR_COOKIE, id.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookies.add(cookie);
    id
}
