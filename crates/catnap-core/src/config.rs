//! TOML-based application configuration and value resolution.
//!
//! The configuration file lives at `~/.config/catnap/config.toml` (override
//! the directory with `CATNAP_CONFIG_DIR`). Numeric options are kept loose
//! on the way in: a value of the wrong shape never aborts startup, it is
//! coerced or replaced by its default and the substitution is reported.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_WORK_SECS: u64 = 1500;
pub const DEFAULT_SHORT_BREAK_SECS: u64 = 300;
pub const DEFAULT_LONG_BREAK_SECS: u64 = 1200;
pub const DEFAULT_DELAY_BREAK_SECS: u64 = 60;
pub const DEFAULT_CYCLES_BEFORE_LONG_BREAK: u32 = 4;

/// Sleeping cat, shown during breaks when no image is configured.
const DEFAULT_ASCII_ART: &str = r"
Time for a break!

 |\      _,,,---,,_
 /,`.-'`'    -.  ;-;;,_
|,4-  ) )-,_..;\ (  `'-'
'---''(_/--'  `-'\_)
";

/// Raw on-disk configuration.
///
/// Numeric fields are deserialized as plain TOML values so that a
/// mistyped duration (a float, a string, a negative number) is handled by
/// [`resolve_positive_int`] instead of failing the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_secs: Option<toml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break_secs: Option<toml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_secs: Option<toml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_break_secs: Option<toml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles_before_long_break: Option<toml::Value>,
    /// Image shown during breaks; absent means text mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_image_path: Option<PathBuf>,
    pub use_dedicated_surface: bool,
    pub get_focus_on_break: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii_art: Option<String>,
}

/// Fully resolved settings, safe to use everywhere.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub delay_break_secs: u64,
    pub cycles_before_long_break: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_image_path: Option<PathBuf>,
    pub use_dedicated_surface: bool,
    pub get_focus_on_break: bool,
    pub ascii_art: String,
}

impl Default for Settings {
    fn default() -> Self {
        RawConfig::default().resolve()
    }
}

/// Coerce a raw config value into a positive integer.
///
/// A positive integer passes through unchanged. A positive non-integer
/// number is rounded to nearest and the coercion is reported. Anything
/// else falls back to `default` with a report. Never fatal.
pub fn resolve_positive_int(raw: Option<&toml::Value>, name: &str, default: u64) -> u64 {
    match raw {
        None => default,
        Some(toml::Value::Integer(i)) if *i > 0 => *i as u64,
        Some(toml::Value::Float(f)) if f.is_finite() && *f > 0.0 => {
            let rounded = f.round() as u64;
            log::warn!("config: {name} = {f} is not an integer, rounding to {rounded}");
            rounded
        }
        Some(other) => {
            log::warn!("config: invalid value {other:?} for {name}, using default {default}");
            default
        }
    }
}

/// Resolve a break-delay amount given on the command line.
///
/// Absent means the configured default; negative or non-numeric input is
/// clamped to 0 with a report.
pub fn resolve_delay_secs(raw: Option<f64>, default: u64) -> u64 {
    match raw {
        None => default,
        Some(s) if !s.is_finite() || s < 0.0 => {
            log::warn!("delay: invalid amount {s}, clamping to 0");
            0
        }
        Some(s) => s.round() as u64,
    }
}

/// Drop leading and trailing blank lines, keeping inner structure.
fn trim_outer_blank_lines(art: &str) -> String {
    let lines: Vec<&str> = art.lines().collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

impl RawConfig {
    /// Resolve every option into a safe value, reporting substitutions.
    pub fn resolve(&self) -> Settings {
        let cycles = resolve_positive_int(
            self.cycles_before_long_break.as_ref(),
            "cycles_before_long_break",
            u64::from(DEFAULT_CYCLES_BEFORE_LONG_BREAK),
        ) as u32;
        Settings {
            work_secs: resolve_positive_int(self.work_secs.as_ref(), "work_secs", DEFAULT_WORK_SECS),
            short_break_secs: resolve_positive_int(
                self.short_break_secs.as_ref(),
                "short_break_secs",
                DEFAULT_SHORT_BREAK_SECS,
            ),
            long_break_secs: resolve_positive_int(
                self.long_break_secs.as_ref(),
                "long_break_secs",
                DEFAULT_LONG_BREAK_SECS,
            ),
            delay_break_secs: resolve_positive_int(
                self.delay_break_secs.as_ref(),
                "delay_break_secs",
                DEFAULT_DELAY_BREAK_SECS,
            ),
            cycles_before_long_break: cycles,
            cat_image_path: self.cat_image_path.clone(),
            use_dedicated_surface: self.use_dedicated_surface,
            get_focus_on_break: self.get_focus_on_break,
            ascii_art: trim_outer_blank_lines(
                self.ascii_art.as_deref().unwrap_or(DEFAULT_ASCII_ART),
            ),
        }
    }

    /// Parse a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

/// Returns `~/.config/catnap/`, honoring the `CATNAP_CONFIG_DIR` override.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CATNAP_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("catnap"),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Option<toml::Value> {
        Some(toml::Value::Integer(v))
    }

    fn float(v: f64) -> Option<toml::Value> {
        Some(toml::Value::Float(v))
    }

    #[test]
    fn positive_integer_passes_through() {
        assert_eq!(resolve_positive_int(int(90).as_ref(), "x", 10), 90);
        assert_eq!(resolve_positive_int(int(1).as_ref(), "x", 10), 1);
    }

    #[test]
    fn positive_float_rounds_to_nearest() {
        assert_eq!(resolve_positive_int(float(90.4).as_ref(), "x", 10), 90);
        assert_eq!(resolve_positive_int(float(90.5).as_ref(), "x", 10), 91);
    }

    #[test]
    fn invalid_values_substitute_default() {
        assert_eq!(resolve_positive_int(int(0).as_ref(), "x", 10), 10);
        assert_eq!(resolve_positive_int(int(-5).as_ref(), "x", 10), 10);
        assert_eq!(
            resolve_positive_int(Some(&toml::Value::String("soon".into())), "x", 10),
            10
        );
        assert_eq!(
            resolve_positive_int(Some(&toml::Value::Boolean(true)), "x", 10),
            10
        );
        assert_eq!(resolve_positive_int(float(f64::NAN).as_ref(), "x", 10), 10);
    }

    #[test]
    fn absent_value_uses_default_silently() {
        assert_eq!(resolve_positive_int(None, "x", 42), 42);
    }

    #[test]
    fn delay_resolution() {
        assert_eq!(resolve_delay_secs(None, 60), 60);
        assert_eq!(resolve_delay_secs(Some(-5.0), 60), 0);
        assert_eq!(resolve_delay_secs(Some(f64::NAN), 60), 0);
        assert_eq!(resolve_delay_secs(Some(90.0), 60), 90);
        assert_eq!(resolve_delay_secs(Some(89.6), 60), 90);
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.work_secs, 1500);
        assert_eq!(s.short_break_secs, 300);
        assert_eq!(s.long_break_secs, 1200);
        assert_eq!(s.delay_break_secs, 60);
        assert_eq!(s.cycles_before_long_break, 4);
        assert!(s.cat_image_path.is_none());
        assert!(!s.use_dedicated_surface);
    }

    #[test]
    fn mistyped_fields_do_not_fail_the_file() {
        let cfg = RawConfig::from_toml_str(
            r#"
            work_secs = "twenty"
            short_break_secs = 120.7
            long_break_secs = 900
            "#,
        )
        .unwrap();
        let s = cfg.resolve();
        assert_eq!(s.work_secs, DEFAULT_WORK_SECS);
        assert_eq!(s.short_break_secs, 121);
        assert_eq!(s.long_break_secs, 900);
    }

    #[test]
    fn ascii_art_outer_blank_lines_trimmed() {
        let cfg = RawConfig {
            ascii_art: Some("\n\n  cat  \n\n inner\n\n".into()),
            ..RawConfig::default()
        };
        let s = cfg.resolve();
        assert_eq!(s.ascii_art, "  cat  \n\n inner");
    }

    #[test]
    fn default_art_has_no_outer_blank_lines() {
        let s = Settings::default();
        assert!(!s.ascii_art.is_empty());
        assert!(!s.ascii_art.lines().next().unwrap().trim().is_empty());
        assert!(!s.ascii_art.lines().last().unwrap().trim().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_positive_integer_passes_through(v in 1i64..=i64::MAX) {
                prop_assert_eq!(
                    resolve_positive_int(Some(&toml::Value::Integer(v)), "x", 7),
                    v as u64
                );
            }

            #[test]
            fn resolution_never_panics(v in proptest::num::f64::ANY) {
                let _ = resolve_positive_int(Some(&toml::Value::Float(v)), "x", 7);
                let _ = resolve_delay_secs(Some(v), 60);
            }
        }
    }

    #[test]
    fn config_roundtrip() {
        let cfg = RawConfig {
            work_secs: int(1200),
            cat_image_path: Some(PathBuf::from("/tmp/cat.png")),
            get_focus_on_break: true,
            ..RawConfig::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed = RawConfig::from_toml_str(&text).unwrap();
        let s = parsed.resolve();
        assert_eq!(s.work_secs, 1200);
        assert_eq!(s.cat_image_path, Some(PathBuf::from("/tmp/cat.png")));
        assert!(s.get_focus_on_break);
    }

    #[test]
    fn first_load_writes_the_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("CATNAP_CONFIG_DIR", dir.path());
        let cfg = RawConfig::load().unwrap();
        assert!(RawConfig::path().unwrap().exists());
        assert!(cfg.work_secs.is_none());

        let custom = RawConfig {
            work_secs: int(900),
            ..RawConfig::default()
        };
        custom.save().unwrap();
        let reloaded = RawConfig::load().unwrap();
        assert_eq!(reloaded.resolve().work_secs, 900);
        std::env::remove_var("CATNAP_CONFIG_DIR");
    }
}
