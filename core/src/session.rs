//! Report session — the pipeline as the front end drives it.
//!
//! PIPELINE (fixed order, every run):
//!   1. items: the cached fetch result, else the configured JSON file
//!   2. a fresh in-memory store is built from the items
//!   3. the query script is re-read from disk and run
//!   4. the store is closed; the table becomes the last good report
//!
//! RULES:
//!   - Runs are independent; the only carried state is the item cache,
//!     the settings, and the last good table.
//!   - A failed run leaves the last good table untouched.
//!   - Settings are saved whenever fetch inputs change or a fetch succeeds.

use crate::{
    aliases::{column_titles, parse_aliases},
    config::{AppConfig, ApiParams, SettingsStore, DATA_JSON_DEFAULT, SQL_FILE_DEFAULT},
    error::{ReportError, ReportResult},
    fetch::{JsonSource, TlsVerification},
    normalize::load_items,
    pager::{fetch_all_pages, DEFAULT_PAGE_SIZE},
    query::{run_report, ReportTable},
    store::prepare_store,
    types::RawItem,
};
use std::path::{Path, PathBuf};

pub struct ReportSession {
    pub config: AppConfig,
    settings: SettingsStore,
    sql_path: PathBuf,
    items_cache: Option<Vec<RawItem>>,
    last_table: Option<ReportTable>,
}

impl ReportSession {
    pub fn new(config: AppConfig, settings: SettingsStore, sql_path: impl Into<PathBuf>) -> Self {
        let mut config = config;
        if Path::new(&config.json_path).is_dir() {
            log::warn!(
                "session: configured JSON path {} is a directory; using {DATA_JSON_DEFAULT}",
                config.json_path
            );
            config.json_path = DATA_JSON_DEFAULT.to_string();
        }
        Self {
            config,
            settings,
            sql_path: sql_path.into(),
            items_cache: None,
            last_table: None,
        }
    }

    /// Load settings from `settings` (falling back to defaults) and start a
    /// session using the default query script.
    pub fn load(settings: SettingsStore, tls_default: TlsVerification) -> Self {
        let config = settings.load(&AppConfig::with_defaults(tls_default));
        Self::new(config, settings, SQL_FILE_DEFAULT)
    }

    /// Use a different query script for subsequent runs.
    pub fn with_sql_path(mut self, sql_path: impl Into<PathBuf>) -> Self {
        self.sql_path = sql_path.into();
        self
    }

    pub fn sql_path(&self) -> &Path {
        &self.sql_path
    }

    pub fn last_table(&self) -> Option<&ReportTable> {
        self.last_table.as_ref()
    }

    pub fn cached_item_count(&self) -> Option<usize> {
        self.items_cache.as_ref().map(Vec::len)
    }

    /// Display titles for the last table's columns.
    pub fn column_titles(&self) -> Vec<String> {
        let aliases = parse_aliases(&self.config.aliases);
        self.last_table
            .as_ref()
            .map(|t| column_titles(&t.columns, &aliases))
            .unwrap_or_default()
    }

    /// True when a report can be produced without fetching first.
    pub fn has_data(&self) -> bool {
        self.items_cache.is_some() || Path::new(&self.config.json_path).exists()
    }

    // ── Report runs ────────────────────────────────────────────────

    pub fn refresh(&mut self) -> ReportResult<&ReportTable> {
        let table = match &self.items_cache {
            Some(items) => self.build_report(items)?,
            None => {
                let items = load_items(Path::new(&self.config.json_path))?;
                self.build_report(&items)?
            }
        };
        log::info!("session: report ready, {} rows", table.row_count());
        Ok(self.last_table.insert(table))
    }

    /// Page through the remote source, cache the items, persist settings,
    /// then refresh. Returns the number of fetched items.
    pub fn fetch_and_refresh(&mut self, source: &dyn JsonSource) -> ReportResult<usize> {
        let params = self.config.api_params.to_params();
        let items = fetch_all_pages(
            source,
            self.config.api_base_url.trim(),
            &params,
            DEFAULT_PAGE_SIZE,
        )?;
        let fetched = items.len();
        self.items_cache = Some(items);
        self.save_settings()?;
        self.refresh()?;
        Ok(fetched)
    }

    fn build_report(&self, items: &[RawItem]) -> ReportResult<ReportTable> {
        let sql_text = read_script(&self.sql_path)?;
        let store = prepare_store(items)?;
        let result = run_report(&store, &sql_text);
        store.close()?;
        result
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn set_json_path(&mut self, path: &str) -> ReportResult<()> {
        self.config.json_path = path.to_string();
        self.items_cache = None;
        self.save_settings()
    }

    pub fn set_base_url(&mut self, url: &str) -> ReportResult<()> {
        self.config.api_base_url = url.trim().to_string();
        self.save_settings()
    }

    pub fn set_aliases(&mut self, aliases: &str) -> ReportResult<()> {
        self.config.aliases = aliases.to_string();
        self.save_settings()
    }

    pub fn set_tls(&mut self, tls: TlsVerification) -> ReportResult<()> {
        self.config.tls = tls;
        self.save_settings()
    }

    pub fn set_api_params(&mut self, params: ApiParams) -> ReportResult<()> {
        self.config.api_params = params;
        self.save_settings()
    }

    pub fn save_settings(&self) -> ReportResult<()> {
        self.settings.save(&self.config)
    }
}

fn read_script(path: &Path) -> ReportResult<String> {
    if path.is_dir() {
        return Err(ReportError::IsADirectory { path: path.display().to_string() });
    }
    if !path.exists() {
        return Err(ReportError::MissingFile { path: path.display().to_string() });
    }
    Ok(std::fs::read_to_string(path)?)
}
