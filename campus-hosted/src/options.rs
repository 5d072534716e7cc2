use std::time::Duration;

use campus_core::{CampusConfigSnapshot, CampusError, CampusResult};

/// Where the hosted backend lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct HostedOptions {
    /// Project base URL, without a trailing slash.
    pub url: String,
    /// Public key, sent as `apikey` on identity calls.
    pub anon_key: String,
    /// Service key, used for table access.
    pub service_key: String,
    pub timeout: Duration,
}

impl HostedOptions {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Read `backend.url`, `backend.anon_key`, `backend.service_key` and
    /// `backend.timeout`. The first three are required.
    pub fn from_config(cfg: &CampusConfigSnapshot) -> CampusResult<Self> {
        let required = |key: &str| {
            cfg.get_string(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CampusError::Config(format!("{key} is required in hosted mode")))
        };

        let mut opts = Self::new(
            required("backend.url")?,
            required("backend.anon_key")?,
            required("backend.service_key")?,
        );
        if let Some(t) = cfg.get_duration("backend.timeout") {
            opts.timeout = t;
        }
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> CampusResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(CampusError::Config(format!(
                "backend.url must be an http(s) URL, got {:?}",
                self.url
            )));
        }
        Ok(())
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }
}
