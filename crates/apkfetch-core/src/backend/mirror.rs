//! Archive mirror backend.
//!
//! The mirror publishes a dataset index (one CSV row per archived build).
//! A package's builds are the index rows for that package on the configured
//! market, ordered by version code, and the identifier handed to the
//! resolver is the position in that list. Builds are downloaded by SHA-256.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use apkfetch_schema::{ArtifactCandidate, PackageId, split_fields};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use super::{Backend, BackendError, BackendKind, candidate_file_name};
use crate::config::{ConfigError, require};
use crate::io::download::download_to_file;

#[derive(Debug, Clone)]
pub struct MirrorCredentials {
    pub api_key: String,
    pub index_path: PathBuf,
}

impl MirrorCredentials {
    pub const KEYS: [&'static str; 2] = ["APKFETCH_MIRROR_API_KEY", "APKFETCH_MIRROR_INDEX"];

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let [api_key, index_path] = require(Self::KEYS, lookup)?;
        Ok(Self {
            api_key,
            index_path: PathBuf::from(index_path),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    pub base_url: String,
    /// Substring the `markets` column must contain.
    pub market: String,
    /// Drop builds dated before this day.
    #[serde(skip)]
    pub since: Option<NaiveDate>,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://androzoo.uni.lu".to_string(),
            market: "play.google.com".to_string(),
            since: None,
        }
    }
}

/// One archived build of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexEntry {
    sha256: String,
    vercode: u64,
    dex_date: Option<NaiveDate>,
}

/// Positions of the columns we read, found from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    sha256: usize,
    pkg_name: usize,
    vercode: usize,
    dex_date: usize,
    markets: usize,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, BackendError> {
        let names = split_fields(header);
        let find = |name: &str| {
            names
                .iter()
                .position(|n| n.trim() == name)
                .ok_or_else(|| BackendError::Protocol(format!("index has no `{name}` column")))
        };
        Ok(Self {
            sha256: find("sha256")?,
            pkg_name: find("pkg_name")?,
            vercode: find("vercode")?,
            dex_date: find("dex_date")?,
            markets: find("markets")?,
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub struct MirrorClient {
    client: Client,
    api_key: String,
    index_path: PathBuf,
    settings: MirrorSettings,
    cache: Mutex<Option<(PackageId, Arc<Vec<IndexEntry>>)>>,
}

impl std::fmt::Debug for MirrorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorClient")
            .field("index_path", &self.index_path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MirrorClient {
    /// Validates the credentials and prepares a client. No request is made.
    pub fn open(credentials: MirrorCredentials, settings: MirrorSettings) -> Result<Self, BackendError> {
        if !credentials.index_path.is_file() {
            return Err(ConfigError::invalid(
                "APKFETCH_MIRROR_INDEX",
                format!("{} is not a readable file", credentials.index_path.display()),
            )
            .into());
        }

        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self {
            client,
            api_key: credentials.api_key,
            index_path: credentials.index_path,
            settings,
            cache: Mutex::new(None),
        })
    }

    /// Builds of `package`, oldest first. The last package's list is cached.
    async fn builds(&self, package: &PackageId) -> Result<Arc<Vec<IndexEntry>>, BackendError> {
        let mut cache = self.cache.lock().await;
        if let Some((cached, builds)) = cache.as_ref() {
            if cached == package {
                return Ok(Arc::clone(builds));
            }
        }

        let builds = Arc::new(self.scan_index(package).await?);
        tracing::debug!(
            "Mirror index lists {} build(s) of {}",
            builds.len(),
            package
        );
        *cache = Some((package.clone(), Arc::clone(&builds)));
        Ok(builds)
    }

    async fn scan_index(&self, package: &PackageId) -> Result<Vec<IndexEntry>, BackendError> {
        let file = tokio::fs::File::open(&self.index_path).await?;
        let mut lines = BufReader::new(file).lines();

        let Some(header) = lines.next_line().await? else {
            return Err(BackendError::Protocol("index file is empty".into()));
        };
        let columns = Columns::from_header(&header)?;

        let mut builds = Vec::new();
        while let Some(line) = lines.next_line().await? {
            // Cheap prefilter before splitting the row
            if !line.contains(package.as_str()) {
                continue;
            }
            let fields = split_fields(&line);
            let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

            if field(columns.pkg_name) != package.as_str()
                || !field(columns.markets).contains(&self.settings.market)
            {
                continue;
            }
            let Ok(vercode) = field(columns.vercode).trim().parse::<u64>() else {
                continue;
            };
            let dex_date = parse_date(field(columns.dex_date));
            if let (Some(since), Some(date)) = (self.settings.since, dex_date) {
                if date < since {
                    continue;
                }
            }

            builds.push(IndexEntry {
                sha256: field(columns.sha256).trim().to_string(),
                vercode,
                dex_date,
            });
        }

        builds.sort_by(|a, b| (a.vercode, a.dex_date).cmp(&(b.vercode, b.dex_date)));
        Ok(builds)
    }
}

#[async_trait]
impl Backend for MirrorClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Mirror
    }

    async fn fetch_latest(&self, package: &PackageId) -> Result<Option<u64>, BackendError> {
        let builds = self.builds(package).await?;
        Ok(builds.len().checked_sub(1).map(|last| last as u64))
    }

    async fn fetch_artifact(
        &self,
        package: &PackageId,
        identifier: Option<u64>,
        staging: &Path,
    ) -> Result<ArtifactCandidate, BackendError> {
        let builds = self.builds(package).await?;
        let position = match identifier {
            Some(id) => id,
            None => builds
                .len()
                .checked_sub(1)
                .map(|last| last as u64)
                .ok_or_else(|| BackendError::Protocol(format!("no builds of {package}")))?,
        };
        let entry = usize::try_from(position)
            .ok()
            .and_then(|i| builds.get(i))
            .ok_or_else(|| BackendError::Unavailable {
                package: package.clone(),
                identifier: position,
            })?;

        let url = format!(
            "{}/api/download",
            self.settings.base_url.trim_end_matches('/')
        );
        let request = self
            .client
            .get(url)
            .query(&[("apikey", self.api_key.as_str()), ("sha256", entry.sha256.as_str())]);

        let path = staging.join(candidate_file_name(package, Some(position)));
        download_to_file(request, &path, Some(&entry.sha256)).await?;

        tracing::debug!(
            "Fetched {} build #{} (version code {}) from mirror",
            package,
            position,
            entry.vercode
        );
        Ok(ArtifactCandidate {
            identifier: Some(position),
            path,
        })
    }
}
