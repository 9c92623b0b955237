//! Desired-state redirect rules.

pub const DEFAULT_INDEX: &str = "index.html";

/// Accepted prefixes for a redirect target.
pub const REDIRECT_SCHEMES: [&str; 3] = ["/", "http://", "https://"];

/// One validated line of the redirects file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectEntry {
    /// Normalized object key.
    pub key: String,

    /// Redirect target, used verbatim.
    pub location: String,
}

impl RedirectEntry {
    pub fn new(key: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            location: location.into(),
        }
    }
}

/// Key normalization options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyOptions {
    /// Strip exactly one leading `/`.
    pub remove_slash: bool,

    /// Appended to keys ending in `/`. Empty leaves the trailing slash.
    pub index: String,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            remove_slash: true,
            index: DEFAULT_INDEX.to_string(),
        }
    }
}

impl KeyOptions {
    /// Normalize a raw key from the redirects file into an object key.
    pub fn clean_key_name(&self, raw: &str) -> String {
        let key = match raw.strip_prefix('/') {
            Some(rest) if self.remove_slash => rest,
            _ => raw,
        };
        if key.ends_with('/') {
            format!("{}{}", key, self.index)
        } else {
            key.to_string()
        }
    }
}

/// True if `location` starts with one of the accepted redirect prefixes.
pub fn is_valid_location(location: &str) -> bool {
    REDIRECT_SCHEMES
        .iter()
        .any(|scheme| location.starts_with(scheme))
}
