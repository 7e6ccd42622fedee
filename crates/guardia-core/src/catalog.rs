//! Catalog model and loader.
//!
//! The catalog is three static JSON resources served from one base location:
//!
//! ```text
//!   <base>/episodes-list.json   → Vec<Episode>
//!   <base>/stats.json           → Stats
//!   <base>/config.json          → ProgramConfig
//! ```
//!
//! The base is either an `http(s)://` URL or a local directory.  All three are
//! fetched together; if any one fails the whole load fails and `CatalogStore`
//! falls back to the built-in empty catalog.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CatalogError;

pub const EPISODES_RESOURCE: &str = "episodes-list.json";
pub const STATS_RESOURCE: &str = "stats.json";
pub const CONFIG_RESOURCE: &str = "config.json";

// ── Episode ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Textual duration, e.g. `00:53:19`, `53:19` or `Durada: 54 min`.
    pub duration: String,
    /// Publish date as scraped (free text).
    pub date: String,
    /// Normalised publish date (RFC 3339 or `YYYY-MM-DD`).
    pub parsed_date: String,
    pub link: String,
    /// Remote streaming URL.
    pub audio_url: String,
    pub image: String,
    /// Local media filename, joined onto the config's base media path.
    pub filename: String,
    pub json_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub available: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Episode {
    pub fn duration_secs(&self) -> u64 {
        parse_duration(&self.duration)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_episode_date(&self.parsed_date)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True when playback may be attempted at all.
    pub fn has_media(&self) -> bool {
        self.available && (!self.audio_url.is_empty() || !self.filename.is_empty())
    }
}

fn parse_episode_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Date-only values, or a datetime whose date part is still usable
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ── Duration helpers ──────────────────────────────────────────────────────────

fn minutes_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*min").ok()).as_ref()
}

/// Lenient duration parser.
///
/// Accepts `H:MM:SS`, `MM:SS` and free text containing `N min`.  Anything that
/// cannot be read contributes zero; this never fails.
pub fn parse_duration(raw: &str) -> u64 {
    let trimmed = raw.trim();

    if trimmed.contains("min") {
        if let Some(caps) = minutes_re().and_then(|re| re.captures(trimmed)) {
            return leading_number(&caps[1]).saturating_mul(60);
        }
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => leading_number(h)
            .saturating_mul(3600)
            .saturating_add(leading_number(m).saturating_mul(60))
            .saturating_add(leading_number(s)),
        [m, s] => leading_number(m)
            .saturating_mul(60)
            .saturating_add(leading_number(s)),
        _ => 0,
    }
}

/// Digits at the start of `s` (after whitespace), or 0.
fn leading_number(s: &str) -> u64 {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// `H:MM:SS` when at least an hour, otherwise `M:SS`.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub total_episodes: usize,
    pub total_duration: String,
    pub total_seconds: u64,
    pub date_range: DateRange,
    pub categories: Vec<String>,
    pub audio_formats: Vec<String>,
    pub total_file_size: u64,
    pub available_count: usize,
    pub last_updated: String,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_episodes: 0,
            total_duration: "0:00".to_string(),
            total_seconds: 0,
            date_range: DateRange::default(),
            categories: Vec::new(),
            audio_formats: vec!["mp3".to_string()],
            total_file_size: 0,
            available_count: 0,
            last_updated: Utc::now().to_rfc3339(),
        }
    }
}

impl Stats {
    /// Recompute the aggregates from an episode list.
    pub fn summarize(episodes: &[Episode]) -> Self {
        let total_seconds = episodes
            .iter()
            .map(Episode::duration_secs)
            .fold(0u64, u64::saturating_add);

        let mut dates: Vec<(DateTime<Utc>, &str)> = episodes
            .iter()
            .filter_map(|e| e.published_at().map(|d| (d, e.parsed_date.as_str())))
            .collect();
        dates.sort_by_key(|(d, _)| *d);

        let categories: BTreeSet<String> = episodes
            .iter()
            .filter_map(|e| e.category.clone())
            .filter(|c| !c.is_empty())
            .collect();

        let audio_formats: BTreeSet<String> = episodes
            .iter()
            .filter_map(|e| {
                std::path::Path::new(&e.filename)
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase())
            })
            .collect();

        Self {
            total_episodes: episodes.len(),
            total_duration: format_duration(total_seconds),
            total_seconds,
            date_range: DateRange {
                earliest: dates.first().map(|(_, s)| s.to_string()).unwrap_or_default(),
                latest: dates.last().map(|(_, s)| s.to_string()).unwrap_or_default(),
            },
            categories: categories.into_iter().collect(),
            audio_formats: if audio_formats.is_empty() {
                vec!["mp3".to_string()]
            } else {
                audio_formats.into_iter().collect()
            },
            total_file_size: episodes
                .iter()
                .filter_map(|e| e.file_size)
                .fold(0u64, u64::saturating_add),
            available_count: episodes.iter().filter(|e| e.available).count(),
            last_updated: Utc::now().to_rfc3339(),
        }
    }
}

// ── Program config ────────────────────────────────────────────────────────────

/// How episode media can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Streaming,
    Local,
}

impl DeliveryMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramConfig {
    pub title: String,
    pub description: String,
    /// Display language, also used for title collation.
    pub language: String,
    /// Base path for local media files.
    pub audio_base_url: String,
    pub supports_modes: Vec<String>,
    pub version: String,
    pub build_time: String,
    pub theme: Theme,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            title: "En Guàrdia - Història de Catalunya".to_string(),
            description: "Programa d'història de Catalunya Ràdio".to_string(),
            language: "ca".to_string(),
            audio_base_url: "/audio".to_string(),
            supports_modes: vec!["streaming".to_string()],
            version: "2.0.0".to_string(),
            build_time: Utc::now().to_rfc3339(),
            theme: Theme {
                primary_color: "#d32f2f".to_string(),
                secondary_color: "#1976d2".to_string(),
                accent_color: "#ff9800".to_string(),
                background_url: None,
            },
        }
    }
}

impl ProgramConfig {
    pub fn supports(&self, mode: DeliveryMode) -> bool {
        self.supports_modes
            .iter()
            .any(|m| m.trim().eq_ignore_ascii_case(mode.label()))
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub episodes: Vec<Episode>,
    pub stats: Stats,
    pub config: ProgramConfig,
}

impl Catalog {
    /// The built-in empty catalog installed when loading fails.
    pub fn fallback() -> Self {
        Self {
            episodes: Vec::new(),
            stats: Stats::default(),
            config: ProgramConfig::default(),
        }
    }
}

/// Location of the catalog resources.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Remote(String),
    Local(PathBuf),
}

impl CatalogSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Remote(raw.trim_end_matches('/').to_string())
        } else if let Some(path) = raw.strip_prefix("file://") {
            Self::Local(PathBuf::from(path))
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent(concat!("enguardia/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default()
    })
}

async fn fetch_resource<T: DeserializeOwned>(
    source: &CatalogSource,
    resource: &str,
) -> Result<T, CatalogError> {
    let bytes = match source {
        CatalogSource::Remote(base) => {
            let url = format!("{}/{}", base, resource);
            debug!("[catalog] GET {}", url);
            let resp = http_client()
                .get(&url)
                .send()
                .await
                .map_err(|source| CatalogError::Http {
                    resource: resource.to_string(),
                    source,
                })?;
            if !resp.status().is_success() {
                return Err(CatalogError::Status {
                    resource: resource.to_string(),
                    status: resp.status().as_u16(),
                });
            }
            resp.bytes()
                .await
                .map_err(|source| CatalogError::Http {
                    resource: resource.to_string(),
                    source,
                })?
                .to_vec()
        }
        CatalogSource::Local(dir) => {
            let path = dir.join(resource);
            debug!("[catalog] read {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|source| CatalogError::Io {
                    resource: resource.to_string(),
                    source,
                })?
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Json {
        resource: resource.to_string(),
        source,
    })
}

/// Fetch all three resources.  Any single failure fails the whole load.
pub async fn load_catalog(source: &CatalogSource) -> Result<Catalog, CatalogError> {
    info!("[catalog] loading from {}", source.describe());
    let (episodes, stats, config) = tokio::try_join!(
        fetch_resource::<Vec<Episode>>(source, EPISODES_RESOURCE),
        fetch_resource::<Stats>(source, STATS_RESOURCE),
        fetch_resource::<ProgramConfig>(source, CONFIG_RESOURCE),
    )?;
    info!(
        "[catalog] loaded {} episodes, stats total={}, title={:?}",
        episodes.len(),
        stats.total_episodes,
        config.title
    );
    Ok(Catalog {
        episodes,
        stats,
        config,
    })
}

// ── CatalogStore ──────────────────────────────────────────────────────────────

/// Holds the currently installed catalog.  Reloads replace it wholesale.
#[derive(Debug)]
pub struct CatalogStore {
    catalog: Catalog,
    last_error: Option<String>,
    loading: bool,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::fallback(),
            last_error: None,
            loading: false,
        }
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Install the outcome of a load.  Failure installs the fallback catalog
    /// and records a user-visible message.
    pub fn install(&mut self, result: Result<Catalog, CatalogError>) {
        self.loading = false;
        match result {
            Ok(mut catalog) => {
                dedupe_episodes(&mut catalog.episodes);
                self.catalog = catalog;
                self.last_error = None;
            }
            Err(e) => {
                warn!("[catalog] load failed, using built-in default: {}", e);
                self.catalog = Catalog::fallback();
                self.last_error = Some(format!("Failed to load data: {}", e));
            }
        }
    }

    pub async fn reload(&mut self, source: &CatalogSource) {
        self.begin_loading();
        let result = load_catalog(source).await;
        self.install(result);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.catalog.episodes
    }

    pub fn stats(&self) -> &Stats {
        &self.catalog.stats
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.catalog.config
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn episode_by_id(&self, id: &str) -> Option<&Episode> {
        self.catalog.episodes.iter().find(|e| e.id == id)
    }

    /// Every tag used by any episode, sorted and unique.
    pub fn tag_vocabulary(&self) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .catalog
            .episodes
            .iter()
            .flat_map(|e| e.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    /// Categories from the stats resource, or derived from episodes if empty.
    pub fn categories(&self) -> Vec<String> {
        if !self.catalog.stats.categories.is_empty() {
            return self.catalog.stats.categories.clone();
        }
        let cats: BTreeSet<&str> = self
            .catalog
            .episodes
            .iter()
            .filter_map(|e| e.category.as_deref())
            .filter(|c| !c.is_empty())
            .collect();
        cats.into_iter().map(str::to_string).collect()
    }
}

fn dedupe_episodes(episodes: &mut Vec<Episode>) {
    let mut seen = HashSet::new();
    let before = episodes.len();
    episodes.retain(|e| seen.insert(e.id.clone()));
    if episodes.len() != before {
        warn!(
            "[catalog] dropped {} episodes with duplicate ids",
            before - episodes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str, date: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {}", id),
            parsed_date: date.to_string(),
            available: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration("00:53:19"), 53 * 60 + 19);
        assert_eq!(parse_duration("1:02:03"), 3723);
        assert_eq!(parse_duration("53:19"), 53 * 60 + 19);
        assert_eq!(parse_duration("Durada: 54 min"), 54 * 60);
        assert_eq!(parse_duration(" 12min "), 720);
    }

    #[test]
    fn test_parse_duration_is_lenient() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("unknown"), 0);
        assert_eq!(parse_duration("xx:30"), 30);
        assert_eq!(parse_duration("1:2:3:4"), 0);
        assert_eq!(parse_duration("about min"), 0);
        assert_eq!(parse_duration("9999999999999999:00:00"), u64::MAX);
        assert_eq!(parse_duration("99999999999999999999 min"), 0);
        assert_eq!(parse_duration("999999999999999999 min"), u64::MAX);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50 MB");
    }

    #[test]
    fn test_published_at_accepts_rfc3339_and_plain_dates() {
        let a = episode("a", "2021-03-04T10:00:00Z");
        let b = episode("b", "2021-03-04");
        let c = episode("c", "sometime");
        assert!(a.published_at().unwrap() > b.published_at().unwrap());
        assert!(c.published_at().is_none());
    }

    #[test]
    fn test_episode_json_uses_camel_case_and_defaults() {
        let json = r#"{
            "id": "ep-1",
            "title": "Els almogàvers",
            "duration": "00:53:19",
            "parsedDate": "2019-01-01T00:00:00Z",
            "audioUrl": "https://cdn.example/ep-1.mp3",
            "available": true
        }"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.audio_url, "https://cdn.example/ep-1.mp3");
        assert!(ep.tags.is_empty());
        assert!(ep.category.is_none());
        assert_eq!(ep.duration_secs(), 3199);
    }

    #[test]
    fn test_supports_modes_case_insensitive() {
        let mut config = ProgramConfig::default();
        assert!(config.supports(DeliveryMode::Streaming));
        assert!(!config.supports(DeliveryMode::Local));
        config.supports_modes = vec!["LOCAL".to_string()];
        assert!(config.supports(DeliveryMode::Local));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            CatalogSource::parse("https://example.org/data/"),
            CatalogSource::Remote("https://example.org/data".to_string())
        );
        assert_eq!(
            CatalogSource::parse("file:///srv/data"),
            CatalogSource::Local(PathBuf::from("/srv/data"))
        );
        assert_eq!(
            CatalogSource::parse("./data"),
            CatalogSource::Local(PathBuf::from("./data"))
        );
    }

    #[test]
    fn test_stats_summarize() {
        let mut a = episode("a", "2020-01-01");
        a.duration = "1:00:00".to_string();
        a.category = Some("historia".to_string());
        a.filename = "a.MP3".to_string();
        a.file_size = Some(100);
        let mut b = episode("b", "2018-06-01");
        b.duration = "30:00".to_string();
        b.available = false;
        let stats = Stats::summarize(&[a, b]);
        assert_eq!(stats.total_episodes, 2);
        assert_eq!(stats.total_seconds, 5400);
        assert_eq!(stats.total_duration, "1:30:00");
        assert_eq!(stats.date_range.earliest, "2018-06-01");
        assert_eq!(stats.date_range.latest, "2020-01-01");
        assert_eq!(stats.categories, vec!["historia"]);
        assert_eq!(stats.audio_formats, vec!["mp3"]);
        assert_eq!(stats.total_file_size, 100);
        assert_eq!(stats.available_count, 1);
    }

    #[test]
    fn test_stats_summarize_saturates_total_duration() {
        let mut a = episode("a", "2020-01-01");
        a.duration = "9999999999999999:00:00".to_string();
        let mut b = episode("b", "2020-01-02");
        b.duration = "1:00".to_string();
        let stats = Stats::summarize(&[a, b]);
        assert_eq!(stats.total_seconds, u64::MAX);
    }

    #[test]
    fn test_store_install_failure_falls_back() {
        let mut store = CatalogStore::new();
        store.install(Ok(Catalog {
            episodes: vec![episode("a", "2020-01-01")],
            stats: Stats::default(),
            config: ProgramConfig::default(),
        }));
        assert_eq!(store.episodes().len(), 1);

        store.install(Err(CatalogError::Status {
            resource: STATS_RESOURCE.to_string(),
            status: 404,
        }));
        assert!(store.episodes().is_empty());
        assert_eq!(store.config().title, ProgramConfig::default().title);
        assert_eq!(store.stats().total_episodes, 0);
        assert!(store.last_error().unwrap().contains("Failed to load data"));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_store_dedupes_ids_and_builds_vocabulary() {
        let mut a = episode("a", "2020-01-01");
        a.tags = vec!["segle-xv".to_string(), "guerra".to_string()];
        let mut dup = episode("a", "2021-01-01");
        dup.title = "duplicate".to_string();
        let mut b = episode("b", "2020-01-01");
        b.tags = vec!["guerra".to_string()];
        b.category = Some("edat-mitjana".to_string());

        let mut store = CatalogStore::new();
        store.install(Ok(Catalog {
            episodes: vec![a, dup, b],
            stats: Stats {
                categories: Vec::new(),
                ..Stats::default()
            },
            config: ProgramConfig::default(),
        }));
        assert_eq!(store.episodes().len(), 2);
        assert_eq!(store.episode_by_id("a").unwrap().title, "Episode a");
        assert_eq!(store.tag_vocabulary(), vec!["guerra", "segle-xv"]);
        assert_eq!(store.categories(), vec!["edat-mitjana"]);
    }

    #[tokio::test]
    async fn test_load_catalog_from_local_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(EPISODES_RESOURCE),
            r#"[{"id":"1","title":"Jaume I","available":true,"tags":["rei"]}]"#,
        )
        .unwrap();
        std::fs::write(tmp.path().join(STATS_RESOURCE), r#"{"totalEpisodes":1}"#).unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_RESOURCE),
            r#"{"title":"En Guàrdia","language":"ca","supportsModes":["streaming","local"]}"#,
        )
        .unwrap();

        let source = CatalogSource::Local(tmp.path().to_path_buf());
        let catalog = load_catalog(&source).await.unwrap();
        assert_eq!(catalog.episodes.len(), 1);
        assert_eq!(catalog.stats.total_episodes, 1);
        assert!(catalog.config.supports(DeliveryMode::Local));

        let mut store = CatalogStore::new();
        store.reload(&source).await;
        assert!(store.last_error().is_none());
        assert_eq!(store.episodes()[0].title, "Jaume I");
    }

    #[tokio::test]
    async fn test_load_catalog_fails_when_any_resource_missing() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(EPISODES_RESOURCE), "[]").unwrap();
        std::fs::write(tmp.path().join(CONFIG_RESOURCE), "{}").unwrap();

        let source = CatalogSource::Local(tmp.path().to_path_buf());
        let err = load_catalog(&source).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { ref resource, .. } if resource == STATS_RESOURCE));

        let mut store = CatalogStore::new();
        store.reload(&source).await;
        assert!(store.last_error().is_some());
        assert_eq!(store.config().title, ProgramConfig::default().title);
    }
}
