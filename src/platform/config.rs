// DevGate - platform/config.rs
//
// Platform directory resolution and devgate.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::{SinkKind, TagStyle};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for DevGate configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/devgate/ or %APPDATA%\DevGate\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the persisted identity store.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Probe for platform-appropriate paths.
    ///
    /// Returns `None` when no home directory can be determined (sandboxed
    /// or service accounts).
    pub fn detect() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("", "", constants::APP_ID)?;
        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        tracing::debug!(
            config = %config_dir.display(),
            data = %data_dir.display(),
            "Platform paths resolved"
        );

        Some(Self {
            config_dir,
            data_dir,
        })
    }

    /// Resolve platform paths, falling back to the current directory.
    pub fn resolve() -> Self {
        Self::detect().unwrap_or_else(|| {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        })
    }

    /// Location of devgate.toml: `DEVGATE_CONFIG` if set, else the config dir.
    pub fn config_file(&self) -> PathBuf {
        match std::env::var(constants::CONFIG_PATH_ENV_VAR) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.config_dir.join(constants::CONFIG_FILE_NAME),
        }
    }
}

// =============================================================================
// devgate.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of devgate.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads
/// with an older crate version.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Top-level `production = true` switch.
    pub production: Option<bool>,
    /// `[identity]` section.
    pub identity: IdentitySection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[identity]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct IdentitySection {
    /// Environment variables consulted for the identity, highest priority first.
    pub env_vars: Option<Vec<String>>,
    /// Whether the persisted store is consulted and written.
    pub persist: Option<bool>,
    /// Key under which the identity is persisted.
    pub storage_key: Option<String>,
    /// Directory name separating this program's store from other programs'.
    pub scope: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "timestamped" or "label".
    pub tag_style: Option<String>,
    /// "console" or "tracing".
    pub sink: Option<String>,
    /// Capture a stack trace for `debug` calls.
    pub capture_stack: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level for DevGate diagnostics: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated gate configuration.
///
/// Invalid values in devgate.toml produce warnings and fall back to these
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Force production mode on.
    pub production: bool,
    /// Identity environment variables in priority order.
    pub env_vars: Vec<String>,
    /// Consult and write the persisted store.
    pub persist: bool,
    /// Persisted store key.
    pub storage_key: String,
    /// Persisted store scope. Defaults to the executable name, so programs
    /// only share a stored identity when configured with the same scope.
    pub store_scope: String,
    /// Tag prefix style.
    pub tag_style: TagStyle,
    /// Output destination.
    pub sink: SinkKind,
    /// Capture stack traces for `debug`.
    pub capture_stack: bool,
    /// Diagnostics log level (for `util::logging::init`).
    pub log_level: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            production: false,
            env_vars: constants::DEFAULT_IDENTITY_ENV_VARS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            persist: true,
            storage_key: constants::DEFAULT_STORAGE_KEY.to_string(),
            store_scope: default_store_scope(),
            tag_style: TagStyle::default(),
            sink: SinkKind::default(),
            capture_stack: true,
            log_level: None,
        }
    }
}

impl GateConfig {
    /// Load devgate.toml from the platform location.
    ///
    /// Warnings are logged; the returned config is always usable.
    pub fn load() -> Self {
        let paths = PlatformPaths::resolve();
        let (config, _warnings) = load_config(&paths.config_file());
        config
    }
}

/// Load and validate devgate.toml at `config_path`.
///
/// Returns the validated config and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run).
/// An unparseable file yields defaults with a warning.
pub fn load_config(config_path: &Path) -> (GateConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No devgate.toml found; using defaults");
        return (GateConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (GateConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (GateConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded devgate.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field of `raw`, accumulating all problems into `warnings`.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> GateConfig {
    let mut config = GateConfig::default();

    if let Some(production) = raw.production {
        config.production = production;
    }

    // -- Identity: env_vars --
    if let Some(vars) = raw.identity.env_vars {
        let bad: Vec<String> = vars
            .iter()
            .filter(|v| !is_valid_env_name(v))
            .cloned()
            .collect();
        if vars.is_empty() || vars.len() > constants::MAX_IDENTITY_ENV_VARS {
            warnings.push(format!(
                "[identity] env_vars has {} entries (expected 1-{}). Using default ({}).",
                vars.len(),
                constants::MAX_IDENTITY_ENV_VARS,
                constants::DEFAULT_IDENTITY_ENV_VARS.join(", "),
            ));
        } else if !bad.is_empty() {
            warnings.push(format!(
                "[identity] env_vars contains invalid names {bad:?}. Using default ({}).",
                constants::DEFAULT_IDENTITY_ENV_VARS.join(", "),
            ));
        } else {
            config.env_vars = vars;
        }
    }

    if let Some(persist) = raw.identity.persist {
        config.persist = persist;
    }

    // -- Identity: storage_key --
    if let Some(key) = raw.identity.storage_key {
        if key.trim().is_empty() {
            warnings.push(format!(
                "[identity] storage_key is empty. Using default (\"{}\").",
                constants::DEFAULT_STORAGE_KEY,
            ));
        } else {
            config.storage_key = key;
        }
    }

    // -- Identity: scope --
    if let Some(scope) = raw.identity.scope {
        if is_valid_scope(&scope) {
            config.store_scope = scope;
        } else {
            warnings.push(invalid_value(
                "identity.scope",
                &scope,
                "letters, digits, '-', '_' or '.', not starting with '.'",
                &config.store_scope,
            ));
        }
    }

    // -- Output: tag_style --
    if let Some(ref style) = raw.output.tag_style {
        match style.to_lowercase().as_str() {
            "timestamped" => config.tag_style = TagStyle::Timestamped,
            "label" => config.tag_style = TagStyle::Label,
            other => warnings.push(invalid_value(
                "output.tag_style",
                other,
                "\"timestamped\" or \"label\"",
                "timestamped",
            )),
        }
    }

    // -- Output: sink --
    if let Some(ref sink) = raw.output.sink {
        match sink.to_lowercase().as_str() {
            "console" => config.sink = SinkKind::Console,
            "tracing" => config.sink = SinkKind::Tracing,
            other => warnings.push(invalid_value(
                "output.sink",
                other,
                "\"console\" or \"tracing\"",
                "console",
            )),
        }
    }

    if let Some(capture) = raw.output.capture_stack {
        config.capture_stack = capture;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(invalid_value(
                "logging.level",
                level,
                "error, warn, info, debug or trace",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    config
}

/// Warning text for a rejected enumerated value.
fn invalid_value(field: &str, value: &str, expected: &str, default: &str) -> String {
    let err = ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    };
    format!("{err}. Using default ({default}).")
}

/// Store scope derived from the running executable's file stem.
fn default_store_scope() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| {
            exe.file_stem()
                .map(|stem| sanitise_scope(&stem.to_string_lossy()))
        })
        .filter(|scope| is_valid_scope(scope))
        .unwrap_or_else(|| constants::FALLBACK_STORE_SCOPE.to_string())
}

/// Replace characters not allowed in a scope with '_'.
fn sanitise_scope(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A scope is used as a single directory name.
fn is_valid_scope(scope: &str) -> bool {
    !scope.is_empty()
        && !scope.starts_with('.')
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Portable environment variable name: non-empty, no '=' and no NUL.
fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_config_returns_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, GateConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_default_env_var_order() {
        let config = GateConfig::default();
        assert_eq!(
            config.env_vars,
            vec!["DEV_ID", "REACT_APP_DEV_ID", "VITE_DEV_ID", "NEXT_PUBLIC_DEV_ID"]
        );
        assert_eq!(config.storage_key, "dev-id");
        assert!(!config.production);
    }

    #[test]
    fn test_full_config_is_applied() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
production = true

[identity]
env_vars = ["TEAM_DEV", "DEV_ID"]
persist = false
storage_key = "team-dev"

[output]
tag_style = "Label"
sink = "tracing"
capture_stack = false

[logging]
level = "debug"
"#,
        );

        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert!(config.production);
        assert_eq!(config.env_vars, vec!["TEAM_DEV", "DEV_ID"]);
        assert!(!config.persist);
        assert_eq!(config.storage_key, "team-dev");
        assert_eq!(config.tag_style, TagStyle::Label);
        assert_eq!(config.sink, SinkKind::Tracing);
        assert!(!config.capture_stack);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[identity]
env_vars = ["OK_NAME", "BAD=NAME"]
storage_key = "  "

[output]
tag_style = "rainbow"
sink = "syslog"

[logging]
level = "loud"
"#,
        );

        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 5, "warnings: {warnings:?}");
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_empty_env_var_list_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[identity]\nenv_vars = []\n");
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.env_vars, GateConfig::default().env_vars);
    }

    #[test]
    fn test_unparseable_config_returns_defaults_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "production = [unclosed");
        let (config, warnings) = load_config(&path);
        assert_eq!(config, GateConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
    }

    #[test]
    fn test_store_scope_from_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[identity]\nscope = \"shop-frontend\"\n");
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.store_scope, "shop-frontend");
    }

    #[test]
    fn test_store_scope_rejects_path_components() {
        let dir = TempDir::new().unwrap();
        for bad in ["../shared", "a/b", "", ".hidden"] {
            let path = write_config(&dir, &format!("[identity]\nscope = {bad:?}\n"));
            let (config, warnings) = load_config(&path);
            assert_eq!(warnings.len(), 1, "{bad}: {warnings:?}");
            assert_eq!(config.store_scope, GateConfig::default().store_scope);
        }
    }

    #[test]
    fn test_default_store_scope_is_a_single_directory_name() {
        let scope = GateConfig::default().store_scope;
        assert!(is_valid_scope(&scope), "{scope}");
        assert_eq!(sanitise_scope("my app (1)"), "my_app__1_");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[future]\nflag = 1\n[output]\nnew_thing = true\n");
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty());
        assert_eq!(config, GateConfig::default());
    }
}
