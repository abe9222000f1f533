//! Configuration and logging setup for Lathe.
//!
//! ```toml
//! [logging]
//! level = "info"
//! json = false
//!
//! [constructor]
//! add_constructor_properties = true
//!
//! [relations]
//! naming = "screaming_snake"
//! runtime_package = "lathe.runtime.data"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod diagnostics;

pub use diagnostics::{ConfigDiagnostics, ConfigWarning};

/// Environment variable overriding config discovery.
pub const LATHE_CONFIG_ENV_VAR: &str = "LATHE_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatheConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub constructor: ConstructorConfig,

    #[serde(default)]
    pub relations: RelationsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or an `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in
    /// when it is set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorConfig {
    /// Global switch for `@java.beans.ConstructorProperties` on generated
    /// constructors. Individual annotations may still suppress it.
    #[serde(default = "default_true")]
    pub add_constructor_properties: bool,
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            add_constructor_properties: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// How the accessor field of a relation is named from the annotated field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationNaming {
    /// `customerOrders` -> `CUSTOMER_ORDERS`
    #[default]
    ScreamingSnake,
    /// `customerOrders` -> `CustomerOrders`
    Capitalized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationsConfig {
    #[serde(default)]
    pub naming: RelationNaming,

    /// Package holding `OneToOneRelation` and `OneToManyRelation`.
    #[serde(default = "RelationsConfig::default_runtime_package")]
    pub runtime_package: String,
}

impl RelationsConfig {
    fn default_runtime_package() -> String {
        "lathe.runtime.data".to_owned()
    }

    /// Fully qualified name of a runtime contract type.
    pub fn runtime_type(&self, simple_name: &str) -> String {
        format!("{}.{simple_name}", self.runtime_package)
    }
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            naming: RelationNaming::default(),
            runtime_package: Self::default_runtime_package(),
        }
    }
}

/// The part of the configuration handlers consult while generating code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformConfig {
    pub constructor: ConstructorConfig,
    pub relations: RelationsConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl LatheConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path_with_diagnostics(path)?.0)
    }

    /// Load a config file and report unknown keys and recoverable problems.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str_with_diagnostics(&text)
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<LatheConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.warnings.extend(config.validate());
        for key in &diagnostics.unknown_keys {
            tracing::warn!(target: "lathe.config", key = %key, "unknown config key");
        }

        Ok((config, diagnostics))
    }

    fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let directives = LoggingConfig::normalize_level_directives(&self.logging.level);
        if tracing_subscriber::EnvFilter::try_new(&directives).is_err() {
            warnings.push(ConfigWarning::LoggingLevelInvalid {
                value: self.logging.level.clone(),
            });
        }

        let package = &self.relations.runtime_package;
        let valid_package = !package.is_empty()
            && package.split('.').all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        if !valid_package {
            warnings.push(ConfigWarning::InvalidValue {
                toml_path: "relations.runtime_package".to_owned(),
                message: format!("`{package}` is not a qualified package name"),
            });
        }

        warnings
    }

    pub fn transform(&self) -> TransformConfig {
        TransformConfig {
            constructor: self.constructor.clone(),
            relations: self.relations.clone(),
        }
    }
}

/// Locates the config file for a project root: `$LATHE_CONFIG_PATH`, then
/// `lathe.toml`, then `.lathe.toml`.
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(LATHE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        return Some(if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        });
    }

    ["lathe.toml", ".lathe.toml"]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for a project root; the default config when no file
/// exists.
pub fn load_for_root(root: &Path) -> Result<(LatheConfig, Option<PathBuf>), ConfigError> {
    match discover_config_path(root) {
        Some(path) => {
            let config = LatheConfig::load_from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((LatheConfig::default(), None)),
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::Layer;

        let filter = config.env_filter();
        let fmt_layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(target: "lathe.config", level = %config.level, json = config.json, "tracing initialized");
        }
    });
}
