//! Application settings — explicit structs with total mapping conversions.
//!
//! `from_mapping` never fails: every missing or wrongly-typed key falls back
//! to the caller-supplied defaults, except `ignore_ssl`, which takes the
//! loose truth of whatever value is stored. The on-disk format is a pretty-printed
//! JSON object, but nothing here depends on that beyond `SettingsStore`.

use crate::{
    error::ReportResult,
    fetch::TlsVerification,
    types::ParamMap,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const SETTINGS_VERSION: u64 = 1;
pub const CONFIG_FILE_NAME: &str = "kapusta_report_settings.json";
pub const DATA_JSON_DEFAULT: &str = "700.json";
pub const SQL_FILE_DEFAULT: &str = "myRequest.sql";
pub const API_BASE_DEFAULT: &str = "https://kapusta.by/api/internal/v1/public/loans/lend_request/";

// ── API filter parameters ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ApiParams {
    pub amount_min: String,
    pub amount_max: String,
    pub period_days_min: String,
    pub period_days_max: String,
    pub rating_min: String,
    /// Parameters with no dedicated field, passed through verbatim.
    pub extra: ParamMap,
}

impl Default for ApiParams {
    fn default() -> Self {
        Self {
            amount_min: "500".to_string(),
            amount_max: "500".to_string(),
            period_days_min: "30".to_string(),
            period_days_max: "30".to_string(),
            rating_min: "45".to_string(),
            extra: ParamMap::new(),
        }
    }
}

impl ApiParams {
    pub const FIELDS: [&'static str; 5] = [
        "amount_min",
        "amount_max",
        "period_days_min",
        "period_days_max",
        "rating_min",
    ];

    pub fn from_mapping(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let field = |name: &str, default: String| match map.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => default,
        };
        let extra = map
            .iter()
            .filter(|(k, _)| !Self::FIELDS.contains(&k.as_str()))
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k.clone(), s.clone())),
                Value::Number(n) => Some((k.clone(), n.to_string())),
                _ => None,
            })
            .collect();

        Self {
            amount_min: field("amount_min", defaults.amount_min),
            amount_max: field("amount_max", defaults.amount_max),
            period_days_min: field("period_days_min", defaults.period_days_min),
            period_days_max: field("period_days_max", defaults.period_days_max),
            rating_min: field("rating_min", defaults.rating_min),
            extra,
        }
    }

    /// Build from a flat string mapping (e.g. values typed by the user).
    pub fn from_params(params: &ParamMap) -> Self {
        let map: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Self::from_mapping(&map)
    }

    pub fn to_mapping(&self) -> Map<String, Value> {
        self.to_params()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    }

    /// Values trimmed, ready to be sent to the remote source.
    pub fn to_params(&self) -> ParamMap {
        let mut params: ParamMap = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();
        for (key, value) in [
            ("amount_min", &self.amount_min),
            ("amount_max", &self.amount_max),
            ("period_days_min", &self.period_days_min),
            ("period_days_max", &self.period_days_max),
            ("rating_min", &self.rating_min),
        ] {
            params.insert(key.to_string(), value.trim().to_string());
        }
        params
    }
}

// ── Application config ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub version: u64,
    pub json_path: String,
    pub api_base_url: String,
    pub aliases: String,
    pub tls: TlsVerification,
    pub api_params: ApiParams,
}

impl AppConfig {
    /// Fallback configuration. The TLS posture has no implicit default
    /// and must be chosen by the caller.
    pub fn with_defaults(tls: TlsVerification) -> Self {
        Self {
            version: SETTINGS_VERSION,
            json_path: DATA_JSON_DEFAULT.to_string(),
            api_base_url: API_BASE_DEFAULT.to_string(),
            aliases: String::new(),
            tls,
            api_params: ApiParams::default(),
        }
    }

    pub fn from_mapping(map: &Map<String, Value>, defaults: &AppConfig) -> Self {
        let text = |name: &str, default: &str| match map.get(name) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        };
        let tls = match map.get("ignore_ssl") {
            Some(ignore) => TlsVerification::from_verify_flag(!truthy(ignore)),
            None => defaults.tls,
        };
        let api_params = match map.get("api_params") {
            Some(Value::Object(params)) => ApiParams::from_mapping(params),
            _ => defaults.api_params.clone(),
        };

        Self {
            version: map
                .get("version")
                .and_then(Value::as_u64)
                .unwrap_or(defaults.version),
            json_path: text("json_path", &defaults.json_path),
            api_base_url: text("api_base_url", &defaults.api_base_url),
            aliases: text("aliases", &defaults.aliases),
            tls,
            api_params,
        }
    }

    pub fn to_mapping(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("version".into(), Value::from(self.version));
        map.insert("json_path".into(), Value::from(self.json_path.as_str()));
        map.insert("api_base_url".into(), Value::from(self.api_base_url.as_str()));
        map.insert("aliases".into(), Value::from(self.aliases.as_str()));
        map.insert("ignore_ssl".into(), Value::Bool(!self.tls.verifies()));
        map.insert("api_params".into(), Value::Object(self.api_params.to_mapping()));
        map
    }
}

/// Loose truth test for hand-edited flags: null, `false`, zero and empty
/// values are false, anything else is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ── Persistence ───────────────────────────────────────────────────

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file in the current working directory.
    pub fn in_working_dir() -> ReportResult<Self> {
        Ok(Self::new(std::env::current_dir()?.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. A missing or malformed file yields `defaults`.
    pub fn load(&self, defaults: &AppConfig) -> AppConfig {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("settings: {} not read ({e}); using defaults", self.path.display());
                return defaults.clone();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => AppConfig::from_mapping(&map, defaults),
            Ok(_) => {
                log::warn!("settings: {} is not a JSON object; using defaults", self.path.display());
                defaults.clone()
            }
            Err(e) => {
                log::warn!("settings: {} is malformed ({e}); using defaults", self.path.display());
                defaults.clone()
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> ReportResult<()> {
        let json = serde_json::to_string_pretty(&Value::Object(config.to_mapping()))?;
        std::fs::write(&self.path, json)?;
        log::debug!("settings: saved to {}", self.path.display());
        Ok(())
    }
}
