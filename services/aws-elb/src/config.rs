use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use elbsign_core::utils::Redact;
use elbsign_core::Context;

use crate::constants::*;

/// Config for the ELB client.
///
/// Explicitly set fields always win over values loaded by [`Config::from_env`].
#[derive(Clone)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `endpoint` is the host requests are sent to, will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ELB_ENDPOINT`]
    /// - default to [`DEFAULT_ENDPOINT`]
    pub endpoint: Option<String>,
    /// Write canonical query, request url, raw response and parsed response
    /// to the `debug` log. Enabled by this field or env value [`ELB_DEBUG`].
    pub debug: bool,
    /// Upper bound for a single round trip, default to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            debug: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "access_key_id",
                &self.access_key_id.as_deref().map(Redact::from),
            )
            .field(
                "secret_access_key",
                &self.secret_access_key.as_deref().map(Redact::from),
            )
            .field("endpoint", &self.endpoint)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load unset fields from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.access_key_id.is_none() {
            self.access_key_id = envs.get(AWS_ACCESS_KEY_ID).cloned();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = envs.get(AWS_SECRET_ACCESS_KEY).cloned();
        }
        if self.endpoint.is_none() {
            self.endpoint = envs.get(ELB_ENDPOINT).cloned();
        }
        if let Some(v) = envs.get(ELB_DEBUG) {
            self.debug |= v == "true" || v == "1";
        }
        self
    }

    /// Get the endpoint host, falling back to the public ELB endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}
