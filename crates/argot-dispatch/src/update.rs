//! Optional "new version available" notice.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::command::{ExitCode, Toolbox};
use crate::plugin::Plugin;

/// One day.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24);

/// Looks up the newest published version of a package.
pub trait UpdateChecker {
    fn check_latest(&self, package: &str) -> Result<Option<Version>>;
}

impl<F> UpdateChecker for F
where
    F: Fn(&str) -> Result<Option<Version>>,
{
    fn check_latest(&self, package: &str) -> Result<Option<Version>> {
        self(package)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCache {
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_check: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
}

pub fn read_cache(path: &Path) -> Result<Option<UpdateCache>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read update cache: {}", path.display()))?;
    let cache = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse update cache JSON: {}", path.display()))?;
    Ok(Some(cache))
}

pub fn write_cache(path: &Path, cache: &UpdateCache) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut out = serde_json::to_string_pretty(cache).context("failed to serialize update cache")?;
    out.push('\n');

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;
    Ok(())
}

fn millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn interval_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

/// Plugin that checks for a newer release at most once per interval and
/// queues a notice when one exists.
pub struct UpdateNotifier<C> {
    package: String,
    current: Version,
    checker: C,
    cache_path: PathBuf,
    interval: Duration,
}

impl<C: UpdateChecker> UpdateNotifier<C> {
    pub fn new(
        package: impl Into<String>,
        current: Version,
        checker: C,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package: package.into(),
            current,
            checker,
            cache_path: cache_path.into(),
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Newer version than the running one, consulting the cache first.
    pub fn check_at(&self, now: SystemTime) -> Result<Option<Version>> {
        let now_ms = millis(now);
        let cache = match read_cache(&self.cache_path) {
            Ok(cache) => cache.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("ignoring update cache: {err:#}");
                UpdateCache::default()
            }
        };

        let fresh = cache
            .last_update_check
            .is_some_and(|last| now_ms.saturating_sub(last) < interval_ms(self.interval));

        let latest = if fresh {
            tracing::debug!(package = %self.package, "update check skipped, cache is fresh");
            cache
                .latest_version
                .as_deref()
                .and_then(|v| Version::parse(v).ok())
        } else {
            tracing::debug!(package = %self.package, "checking for updates");
            let checked = self.checker.check_latest(&self.package);
            // A failed lookup still counts as an attempt for the interval.
            let latest_version = match &checked {
                Ok(latest) => latest.as_ref().map(Version::to_string),
                Err(_) => cache.latest_version.clone(),
            };
            write_cache(
                &self.cache_path,
                &UpdateCache {
                    last_update_check: Some(now_ms),
                    latest_version,
                },
            )?;
            checked
                .with_context(|| format!("failed to check latest version of {}", self.package))?
        };

        Ok(latest.filter(|v| *v > self.current))
    }

    fn notice(&self, latest: &Version) -> String {
        format!(
            "Update available for {}: {} -> {}",
            self.package, self.current, latest
        )
    }
}

impl<C: UpdateChecker> Plugin for UpdateNotifier<C> {
    fn name(&self) -> &str {
        "update-notifier"
    }

    fn after_command(&self, toolbox: &mut Toolbox<'_>, _code: ExitCode) -> Result<()> {
        match self.check_at(SystemTime::now()) {
            Ok(Some(latest)) => toolbox.notice(self.notice(&latest)),
            Ok(None) => {}
            Err(err) => tracing::warn!("{err:#}"),
        }
        Ok(())
    }
}
