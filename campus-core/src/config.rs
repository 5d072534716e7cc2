//! # Campus configuration
//!
//! A minimal string key/value store. Applications fill it however they like
//! (the server reads environment variables) and take a [`CampusConfigSnapshot`]
//! for typed reads.
//!
//! ```rust
//! use campus_core::CampusConfig;
//! let mut cfg = CampusConfig::new();
//!
//! cfg.set("http.port", "3000");
//! cfg.set("auth.jwt.expires_in", "2h");
//!
//! let snap = cfg.snapshot();
//! assert_eq!(snap.get_usize("http.port"), Some(3000));
//! assert_eq!(snap.get_duration("auth.jwt.expires_in").unwrap().as_secs(), 7200);
//! ```

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct CampusConfig {
    values: HashMap<String, String>,
}

impl CampusConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only when it has no value yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> CampusConfigSnapshot {
        CampusConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampusConfigSnapshot {
    map: HashMap<String, String>,
}

impl CampusConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse::<u32>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Human-readable durations: `90s`, `15m`, `1day`.
    pub fn get_duration(&self, key: &str) -> Option<Duration> {
        self.get(key)
            .and_then(|v| humantime::parse_duration(v.trim()).ok())
    }
}
