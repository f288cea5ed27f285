use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_BODY_DEBOUNCE_MS: u32 = 2000;
pub const DEFAULT_TITLE_DEBOUNCE_MS: u32 = 500;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_url: String,
    pub body_debounce_ms: u32,
    pub title_debounce_ms: u32,
}

impl EnvConfig {
    /// Reads `window.ENV`, falling back to the defaults per key.
    pub fn new() -> Self {
        let mut cfg = Self::default();

        let Some(window) = web_sys::window() else {
            return cfg;
        };
        let Some(env) = window.get("ENV") else {
            return cfg;
        };
        if env.is_undefined() || !env.is_object() {
            return cfg;
        }

        let get = |key: &str| js_sys::Reflect::get(&env, &key.into()).ok();

        // Both `API_URL` (documented) and `api_url` (legacy) are accepted.
        if let Some(url) = get("API_URL")
            .and_then(|v| v.as_string())
            .or_else(|| get("api_url").and_then(|v| v.as_string()))
        {
            cfg.api_url = url;
        }

        if let Some(ms) = get("BODY_DEBOUNCE_MS").and_then(|v| v.as_f64()) {
            cfg.body_debounce_ms = ms.max(0.0) as u32;
        }
        if let Some(ms) = get("TITLE_DEBOUNCE_MS").and_then(|v| v.as_f64()) {
            cfg.title_debounce_ms = ms.max(0.0) as u32;
        }

        cfg
    }

    pub fn windows(&self) -> CoalesceWindows {
        CoalesceWindows {
            body: Duration::from_millis(self.body_debounce_ms as u64),
            title: Duration::from_millis(self.title_debounce_ms as u64),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            body_debounce_ms: DEFAULT_BODY_DEBOUNCE_MS,
            title_debounce_ms: DEFAULT_TITLE_DEBOUNCE_MS,
        }
    }
}

/// Quiet period per field class before a coalesced write is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoalesceWindows {
    pub body: Duration,
    pub title: Duration,
}

impl Default for CoalesceWindows {
    fn default() -> Self {
        EnvConfig::default().windows()
    }
}
