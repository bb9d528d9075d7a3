//! Resolve store listing URLs (or bare ids) to the ids the adapters take.

use std::sync::LazyLock;

use regex::Regex;
use revdash_core::Store;

use crate::error::ScraperError;

static PLAY_QUERY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([A-Za-z0-9._-]+)").expect("valid regex"));
static PLAY_PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)+$").expect("valid regex"));
static APP_STORE_PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/id(\d+)").expect("valid regex"));
static APP_STORE_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/app/([^/]+)/").expect("valid regex"));
static APP_STORE_BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:id)?(\d+)$").expect("valid regex"));

/// An App Store listing reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStoreApp {
    /// Numeric track id, e.g. `"123456789"`.
    pub id: String,
    /// The `/app/<slug>/` segment of a listing URL, when one was given.
    pub slug: Option<String>,
}

/// Extracts the package name from a Play listing URL.
///
/// Accepts `https://play.google.com/store/apps/details?id=com.example.app&hl=ru`
/// or a bare package name such as `com.example.app`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidAppReference`] if no package name can be found.
pub fn resolve_play_app_id(input: &str) -> Result<String, ScraperError> {
    let input = input.trim();
    if let Some(caps) = PLAY_QUERY_ID.captures(input) {
        return Ok(caps[1].to_owned());
    }
    if PLAY_PACKAGE.is_match(input) {
        return Ok(input.to_owned());
    }
    Err(ScraperError::InvalidAppReference {
        store: Store::Play,
        input: input.to_owned(),
        reason: "expected a listing URL with ?id=<package> or a package name".to_owned(),
    })
}

/// Extracts the numeric id (and slug, if present) from an App Store listing URL.
///
/// Accepts `https://apps.apple.com/ru/app/example-app/id123456789`, `id123456789`,
/// or `123456789`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidAppReference`] if no numeric id can be found.
pub fn resolve_app_store_app(input: &str) -> Result<AppStoreApp, ScraperError> {
    let input = input.trim();
    if let Some(caps) = APP_STORE_BARE_ID.captures(input) {
        return Ok(AppStoreApp {
            id: caps[1].to_owned(),
            slug: None,
        });
    }
    let Some(caps) = APP_STORE_PATH_ID.captures(input) else {
        return Err(ScraperError::InvalidAppReference {
            store: Store::AppStore,
            input: input.to_owned(),
            reason: "expected a listing URL with /id<digits> or a numeric id".to_owned(),
        });
    };
    Ok(AppStoreApp {
        id: caps[1].to_owned(),
        slug: APP_STORE_SLUG
            .captures(input)
            .map(|slug| slug[1].to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_id_from_listing_url() {
        let id = resolve_play_app_id(
            "https://play.google.com/store/apps/details?id=ru.example.bank&hl=ru&gl=RU",
        )
        .unwrap();
        assert_eq!(id, "ru.example.bank");
    }

    #[test]
    fn play_id_when_not_first_query_param() {
        let id =
            resolve_play_app_id("https://play.google.com/store/apps/details?hl=en&id=com.x_y.app")
                .unwrap();
        assert_eq!(id, "com.x_y.app");
    }

    #[test]
    fn bare_play_package_is_accepted() {
        assert_eq!(resolve_play_app_id(" com.example.app ").unwrap(), "com.example.app");
    }

    #[test]
    fn play_garbage_is_rejected() {
        let err = resolve_play_app_id("https://example.com/app").unwrap_err();
        assert!(matches!(
            err,
            ScraperError::InvalidAppReference {
                store: Store::Play,
                ..
            }
        ));
    }

    #[test]
    fn app_store_id_and_slug_from_listing_url() {
        let app =
            resolve_app_store_app("https://apps.apple.com/ru/app/example-app/id123456789").unwrap();
        assert_eq!(
            app,
            AppStoreApp {
                id: "123456789".to_owned(),
                slug: Some("example-app".to_owned()),
            }
        );
    }

    #[test]
    fn app_store_url_with_query_string() {
        let app = resolve_app_store_app("https://apps.apple.com/app/id42?l=en").unwrap();
        assert_eq!(app.id, "42");
        assert!(app.slug.is_none());
    }

    #[test]
    fn bare_app_store_ids_are_accepted() {
        assert_eq!(resolve_app_store_app("123456789").unwrap().id, "123456789");
        assert_eq!(resolve_app_store_app("id123456789").unwrap().id, "123456789");
    }

    #[test]
    fn app_store_without_numeric_id_is_rejected() {
        assert!(resolve_app_store_app("https://apps.apple.com/ru/app/example-app/").is_err());
    }
}
