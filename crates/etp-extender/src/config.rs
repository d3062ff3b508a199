//! Extender configuration.
//!
//! Configuration can be built programmatically with
//! [`ExtenderConfig::builder`] or loaded from a TOML, YAML or JSON file with
//! [`ExtenderConfig::from_file`]. Environment variables prefixed `ETP_`
//! override file settings, using `__` for nested keys
//! (`ETP_TRAVERSAL__RESPONSE_TIMEOUT_MS=2000`).
//!
//! ```toml
//! application_name = "well-browser"
//! wire_version = "1.2"
//!
//! [traversal]
//! response_timeout_ms = 5000
//! max_depth = 4
//!
//! [[protocols]]
//! protocol = 3
//! role = "store"
//! selected = true
//! ```

use std::path::Path;
use std::time::Duration;

use etp_protocol::{ProtocolCatalog, ProtocolId, ProtocolRoleRequest, Role, WireVersion};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::session::SessionInfo;

/// Default bound on one discovery round trip.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Discovery traversal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Upper bound on the wait for one `GetResources` response
    pub response_timeout_ms: u64,
    /// Maximum number of hierarchy levels to expand, `None` for unbounded
    pub max_depth: Option<usize>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            max_depth: None,
        }
    }
}

impl TraversalConfig {
    /// Response timeout as a [`Duration`].
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Set the response timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the depth bound.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Override of one catalog row's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSelection {
    /// Raw protocol number in the configured wire version
    pub protocol: i32,
    /// Peer role of the row
    pub role: Role,
    /// Desired selection
    pub selected: bool,
}

/// Extender configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtenderConfig {
    /// Local application name announced to the peer
    pub application_name: String,
    /// Local application version announced to the peer
    pub application_version: String,
    /// Wire version to negotiate
    pub wire_version: WireVersion,
    /// Discovery traversal settings
    pub traversal: TraversalConfig,
    /// Selection overrides applied on top of the catalog defaults
    pub protocols: Vec<ProtocolSelection>,
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        Self {
            application_name: env!("CARGO_PKG_NAME").to_string(),
            application_version: env!("CARGO_PKG_VERSION").to_string(),
            wire_version: WireVersion::default(),
            traversal: TraversalConfig::default(),
            protocols: Vec::new(),
        }
    }
}

impl ExtenderConfig {
    /// Load configuration from a file (TOML, YAML, or JSON)
    ///
    /// The format is chosen by extension. Environment variables with the
    /// `ETP_` prefix override file settings, `__` separating nested keys.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use etp_extender::ExtenderConfig;
    ///
    /// let config = ExtenderConfig::from_file("etp.toml").expect("Failed to load config");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The file format is unsupported
    /// - The file contains invalid configuration
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_prefix(path, "ETP")
    }

    /// Load configuration from a file with a custom environment prefix.
    ///
    /// # Errors
    ///
    /// Same as [`ExtenderConfig::from_file`].
    pub fn from_file_with_prefix(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        use config::{Config, File, FileFormat};

        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(ConfigError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        debug!(path = %path.display(), wire_version = %loaded.wire_version, "Configuration loaded");
        Ok(loaded)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ExtenderConfigBuilder {
        ExtenderConfigBuilder::new()
    }

    /// Catalog defaults for the configured wire version with the selection
    /// overrides applied.
    ///
    /// An override naming a disabled (placeholder) row is ignored; such rows
    /// can never be selected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Protocol`] if an override names a protocol
    /// number the wire version does not define, and
    /// [`ConfigError::UnknownSelection`] if it names a protocol/role pair the
    /// catalog does not list.
    pub fn role_requests(&self) -> Result<Vec<ProtocolRoleRequest>, ConfigError> {
        let mut requests = ProtocolCatalog::for_version(self.wire_version).default_role_requests();
        for selection in &self.protocols {
            let protocol = ProtocolId::checked(self.wire_version, selection.protocol)?;
            let request = requests
                .iter_mut()
                .find(|r| r.protocol == protocol && r.role == selection.role)
                .ok_or(ConfigError::UnknownSelection {
                    version: self.wire_version,
                    protocol: selection.protocol,
                    role: selection.role,
                })?;
            if request.select(selection.selected) != selection.selected {
                debug!(%protocol, role = %selection.role, "Override ignored for disabled protocol");
            }
        }
        Ok(requests)
    }

    /// Session identity for this configuration.
    #[must_use]
    pub fn session_info(&self, is_client: bool) -> SessionInfo {
        let info = SessionInfo::client(
            self.application_name.clone(),
            self.application_version.clone(),
            self.wire_version,
        );
        SessionInfo { is_client, ..info }
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct ExtenderConfigBuilder {
    config: ExtenderConfig,
}

impl ExtenderConfigBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    /// Set the application version.
    pub fn application_version(mut self, version: impl Into<String>) -> Self {
        self.config.application_version = version.into();
        self
    }

    /// Set the wire version.
    #[must_use]
    pub const fn wire_version(mut self, version: WireVersion) -> Self {
        self.config.wire_version = version;
        self
    }

    /// Set the discovery response timeout.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.traversal = self.config.traversal.with_response_timeout(timeout);
        self
    }

    /// Bound the discovery depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.config.traversal.max_depth = Some(depth);
        self
    }

    /// Override the selection of one catalog row.
    #[must_use]
    pub fn select(mut self, protocol: impl Into<ProtocolId>, role: Role, selected: bool) -> Self {
        self.config.protocols.push(ProtocolSelection {
            protocol: protocol.into().id(),
            role,
            selected,
        });
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> ExtenderConfig {
        self.config
    }
}
