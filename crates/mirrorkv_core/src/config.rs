//! Store configuration.

/// Environment variable that selects development mode.
pub const ENV_MODE_VAR: &str = "MIRRORKV_ENV";

/// Configuration for opening a `CachedStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Whether to clear the keyspace right after the first connect.
    pub wipe_on_start: bool,

    /// Whether mutations stay in memory only.
    ///
    /// The mirror is still loaded at connect time, but nothing is ever
    /// written back to the backend.
    pub development_mode: bool,
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose development mode follows the process
    /// environment.
    ///
    /// Development mode is on when `MIRRORKV_ENV` is `development` or `dev`
    /// (any case).
    #[must_use]
    pub fn from_env() -> Self {
        let value = std::env::var(ENV_MODE_VAR).ok();
        Self::new().development_mode(is_development(value.as_deref()))
    }

    /// Sets whether to wipe the keyspace on start.
    #[must_use]
    pub const fn wipe_on_start(mut self, value: bool) -> Self {
        self.wipe_on_start = value;
        self
    }

    /// Sets development mode.
    #[must_use]
    pub const fn development_mode(mut self, value: bool) -> Self {
        self.development_mode = value;
        self
    }
}

fn is_development(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        v.eq_ignore_ascii_case("development") || v.eq_ignore_ascii_case("dev")
    })
}
