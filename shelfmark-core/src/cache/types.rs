use serde::{Deserialize, Serialize};

/// How the browser issued a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Full page load
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub mode: RequestMode,
}

impl Request {
    /// A page navigation
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            mode: RequestMode::Navigate,
        }
    }

    /// A plain same-origin GET, as issued for stylesheets and icons
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            mode: RequestMode::SameOrigin,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// Response type as reported by `fetch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Same-origin response
    #[default]
    Basic,
    Cors,
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, kind: ResponseKind, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            kind,
            content_type: None,
            body: body.into(),
        }
    }

    /// `200` same-origin response
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, ResponseKind::Basic, body)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Status in the 2xx range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether an asset response may be written to the cache
    pub fn is_cacheable_asset(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// Which cache bucket is current and what it is seeded with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Bucket name; changing it retires every older bucket on activation
    pub version: String,
    /// Assets fetched at install time
    pub assets: Vec<String>,
    /// Document served to navigations when offline and uncached
    pub app_shell: String,
}

pub const DEFAULT_CACHE_NAME: &str = "shelfmark-cache-v5";
pub const DEFAULT_APP_SHELL: &str = "./index.html";
pub const DEFAULT_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./styles.css",
    "./manifest.webmanifest",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CACHE_NAME.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            app_shell: DEFAULT_APP_SHELL.to_string(),
        }
    }
}
