//! The address-bar boundary.
//!
//! The store reads and rewrites the page URL only through [`LocationPort`],
//! so the browser binding can be swapped for [`MemoryLocation`] in tests and
//! native hosts.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    Unavailable,
    InvalidUrl(String),
    Io(String),
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::Unavailable => write!(f, "browser location unavailable"),
            LocationError::InvalidUrl(msg) => write!(f, "invalid page URL: {msg}"),
            LocationError::Io(msg) => write!(f, "location error: {msg}"),
        }
    }
}

impl std::error::Error for LocationError {}

pub trait LocationPort {
    /// Current absolute page URL.
    fn href(&self) -> Result<String, LocationError>;

    /// Replace the current URL in place: no navigation, no new history entry.
    fn replace(&mut self, href: &str) -> Result<(), LocationError>;
}

/// In-memory address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocation {
    href: String,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            replacements: 0,
        }
    }

    /// Number of `replace` calls so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn as_str(&self) -> &str {
        &self.href
    }
}

impl LocationPort for MemoryLocation {
    fn href(&self) -> Result<String, LocationError> {
        Ok(self.href.clone())
    }

    fn replace(&mut self, href: &str) -> Result<(), LocationError> {
        self.href = href.to_string();
        self.replacements += 1;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{LocationError, LocationPort};

    /// `window.location` / `window.history` binding.
    #[derive(Debug)]
    pub struct BrowserLocation {
        window: web_sys::Window,
    }

    impl BrowserLocation {
        pub fn new() -> Result<Self, LocationError> {
            let window = web_sys::window().ok_or(LocationError::Unavailable)?;
            Ok(Self { window })
        }
    }

    impl LocationPort for BrowserLocation {
        fn href(&self) -> Result<String, LocationError> {
            self.window
                .location()
                .href()
                .map_err(|e| LocationError::Io(format!("location.href failed: {:?}", e)))
        }

        fn replace(&mut self, href: &str) -> Result<(), LocationError> {
            let history = self
                .window
                .history()
                .map_err(|e| LocationError::Io(format!("window.history failed: {:?}", e)))?;
            history
                .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(href))
                .map_err(|e| LocationError::Io(format!("replaceState failed: {:?}", e)))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserLocation;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct BrowserLocation;

#[cfg(not(target_arch = "wasm32"))]
impl BrowserLocation {
    pub fn new() -> Result<Self, LocationError> {
        Err(LocationError::Unavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LocationPort for BrowserLocation {
    fn href(&self) -> Result<String, LocationError> {
        Err(LocationError::Unavailable)
    }

    fn replace(&mut self, _href: &str) -> Result<(), LocationError> {
        Err(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowserLocation, LocationError, LocationPort, MemoryLocation};

    #[test]
    fn memory_location_counts_replacements() {
        let mut loc = MemoryLocation::new("https://survey.example/");
        loc.replace("https://survey.example/#map_1_0_0").expect("replace");
        assert_eq!(loc.href().expect("href"), "https://survey.example/#map_1_0_0");
        assert_eq!(loc.replacements(), 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn browser_location_is_unavailable_natively() {
        assert_eq!(BrowserLocation::new().unwrap_err(), LocationError::Unavailable);
    }
}
