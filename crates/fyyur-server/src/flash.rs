//! One-shot notifications carried to the next page view in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "fyyur_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: Category::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: Category::Error,
            message: message.into(),
        }
    }

    /// Plain JSON. The jar percent-encodes it on `Set-Cookie` and decodes it on parse.
    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Queue a flash for the next page view. A newer flash replaces a pending one.
pub fn push(jar: CookieJar, flash: Flash, secure: bool) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    jar.add(cookie)
}

/// Read and clear the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let flash = Flash::decode(&raw);
    if flash.is_none() {
        tracing::debug!("discarding malformed flash cookie");
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = push(
            CookieJar::new(),
            Flash::success("Venue The Musical Hop was successfully listed!"),
            false,
        );
        let raw = jar.get(FLASH_COOKIE).unwrap().value().to_string();
        assert!(raw.starts_with("{\"category\":\"success\""), "{raw}");

        let (jar, flash) = take(jar);
        let flash = flash.unwrap();
        assert_eq!(flash.category, Category::Success);
        assert_eq!(flash.message, "Venue The Musical Hop was successfully listed!");
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_without_cookie() {
        let (_, flash) = take(CookieJar::new());
        assert!(flash.is_none());
    }

    #[test]
    fn test_take_malformed_cookie() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "garbage"));
        let (jar, flash) = take(jar);
        assert!(flash.is_none());
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_secure_flag() {
        let jar = push(CookieJar::new(), Flash::error("nope"), true);
        assert_eq!(jar.get(FLASH_COOKIE).unwrap().secure(), Some(true));
    }

    #[test]
    fn test_serialized_category() {
        let json = serde_json::to_value(Flash::error("An error occurred.")).unwrap();
        assert_eq!(json["category"], "error");
        assert_eq!(json["message"], "An error occurred.");
    }
}
