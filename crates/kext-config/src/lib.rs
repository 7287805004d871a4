//! Generator configuration and tracing setup.
//!
//! ```toml
//! classpath = ["build/classes/java/main", "libs/gradle-api.jar"]
//! includes = ["org/gradle/api/**"]
//! excludes = ["**/internal/**"]
//! parameter_names = "parameter-names.properties"
//!
//! [header]
//! package = "org.gradle.kotlin.dsl"
//! jvm_name = "GradleApiKotlinDslExtensions"
//!
//! [logging]
//! level = "kext=debug"
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Class directories and JARs, searched in order.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,

    /// Slash-separated globs over type names; empty means every type.
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    /// `.properties` file mapping `owner.method(types)` to parameter names.
    #[serde(default)]
    pub parameter_names: Option<PathBuf>,

    #[serde(default)]
    pub header: HeaderConfig,

    #[serde(default)]
    pub markers: MarkersConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GeneratorConfig {
    /// Loads a TOML config. Relative classpath and index paths are resolved
    /// against the directory containing the file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for entry in &mut self.classpath {
            if entry.is_relative() {
                *entry = base.join(&*entry);
            }
        }
        if let Some(index) = self.parameter_names.as_mut().filter(|p| p.is_relative()) {
            *index = base.join(&*index);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    #[serde(default = "HeaderConfig::default_package")]
    pub package: String,

    /// Value of `@file:JvmName`.
    #[serde(default = "HeaderConfig::default_jvm_name")]
    pub jvm_name: String,
}

impl HeaderConfig {
    fn default_package() -> String {
        "org.gradle.kotlin.dsl".to_owned()
    }

    fn default_jvm_name() -> String {
        "GradleApiKotlinDslExtensions".to_owned()
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            package: Self::default_package(),
            jvm_name: Self::default_jvm_name(),
        }
    }
}

/// Annotation binary names overriding the built-in marker lists. Unset lists
/// keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkersConfig {
    #[serde(default)]
    pub nullable: Option<Vec<String>>,
    #[serde(default)]
    pub deprecated: Option<Vec<String>>,
    #[serde(default)]
    pub incubating: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or an `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    /// Append logs to this file instead of writing to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
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

    /// Effective filter: the configured directives, merged with `RUST_LOG`
    /// when it is set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        match env_directives {
            Some(env_directives) => {
                let combined = format!(
                    "{},{env_directives}",
                    Self::normalize_level_directives(&self.level)
                );
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }

    fn make_writer(&self) -> BoxMakeWriter {
        if let Some(path) = &self.file {
            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => return BoxMakeWriter::new(Arc::new(file)),
                Err(err) => eprintln!(
                    "kext: cannot open log file {}: {err}; logging to stderr",
                    path.display()
                ),
            }
        }
        // `TestWriter` keeps `cargo test` output captured in debug builds.
        if cfg!(debug_assertions) {
            BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// Safe to call multiple times; only the first call has an effect. If another
/// subscriber is already installed it is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let writer = config.make_writer();
        let layer: Box<dyn tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync> =
            if config.json {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            };

        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(target = "kext.config", json = config.json, "tracing initialized");
        }
    });
}
