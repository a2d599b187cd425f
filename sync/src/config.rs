//! Process configuration, read from the environment.

use crate::schema::MissingTitlePolicy;
use crate::sync::SyncSettings;
use eyre::Context;
use std::fmt;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to run a sync.
#[derive(Clone)]
pub struct Config {
    pub youtube_api_key: String,
    /// Name of the channel to sync, as one would type it into YouTube's search.
    pub channel_handle: String,
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub missing_title: MissingTitlePolicy,
    /// Applied to every HTTP request to either platform.
    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("youtube_api_key", &"<redacted>")
            .field("channel_handle", &self.channel_handle)
            .field("notion_api_key", &"<redacted>")
            .field("notion_database_id", &self.notion_database_id)
            .field("missing_title", &self.missing_title)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from environment variables, after loading `.env` if present.
    ///
    /// | Variable | |
    /// |---|---|
    /// | `YOUTUBE_API_KEY` | required |
    /// | `YOUTUBE_CHANNEL_NAME` | required |
    /// | `NOTION_API_KEY` | required |
    /// | `NOTION_DATABASE_ID` | required |
    /// | `NOTION_CREATE_MISSING_NAME` | `true` to create a missing `Name` instead of failing |
    /// | `SYNC_HTTP_TIMEOUT_SECS` | per-request timeout in seconds, at least 1, default 30 |
    pub fn from_env() -> eyre::Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            if !e.not_found() {
                return Err(e).context("load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| eyre::eyre!("environment variable {key} must be set"))
        };

        let missing_title = match lookup("NOTION_CREATE_MISSING_NAME").as_deref() {
            None | Some("") => MissingTitlePolicy::Fail,
            Some(v) => {
                let create: bool = v
                    .parse()
                    .with_context(|| format!("NOTION_CREATE_MISSING_NAME={v} is not a bool"))?;
                if create {
                    MissingTitlePolicy::Create
                } else {
                    MissingTitlePolicy::Fail
                }
            }
        };

        let http_timeout = match lookup("SYNC_HTTP_TIMEOUT_SECS") {
            None => DEFAULT_HTTP_TIMEOUT,
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .with_context(|| format!("SYNC_HTTP_TIMEOUT_SECS={v} is not a number"))?;
                if secs == 0 {
                    eyre::bail!("SYNC_HTTP_TIMEOUT_SECS must be at least 1 second");
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            youtube_api_key: required("YOUTUBE_API_KEY")?,
            channel_handle: required("YOUTUBE_CHANNEL_NAME")?,
            notion_api_key: required("NOTION_API_KEY")?,
            notion_database_id: required("NOTION_DATABASE_ID")?,
            missing_title,
            http_timeout,
        })
    }

    /// The HTTP client shared by both platform clients.
    pub fn http_client(&self) -> eyre::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("build HTTP client")
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            channel_handle: self.channel_handle.clone(),
            table_id: self.notion_database_id.clone(),
            missing_title: self.missing_title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("YOUTUBE_API_KEY", "yt-secret"),
        ("YOUTUBE_CHANNEL_NAME", "Creator"),
        ("NOTION_API_KEY", "notion-secret"),
        ("NOTION_DATABASE_ID", "db-1"),
    ];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.missing_title, MissingTitlePolicy::Fail);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.sync_settings().table_id, "db-1");
        assert_eq!(config.sync_settings().channel_handle, "Creator");
    }

    #[test]
    fn optional_settings() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("NOTION_CREATE_MISSING_NAME", "true"));
        vars.push(("SYNC_HTTP_TIMEOUT_SECS", "5"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.missing_title, MissingTitlePolicy::Create);
        assert_eq!(config.http_timeout, Duration::from_secs(5));

        let mut vars = REQUIRED.to_vec();
        vars.push(("SYNC_HTTP_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SYNC_HTTP_TIMEOUT_SECS", "0"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("SYNC_HTTP_TIMEOUT_SECS"), "{err}");
    }

    #[test]
    fn missing_variable_is_named() {
        let err = Config::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert!(err.to_string().contains("NOTION_DATABASE_ID"), "{err}");
    }

    #[test]
    fn debug_redacts_keys() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("yt-secret"));
        assert!(!debug.contains("notion-secret"));
        assert!(debug.contains("db-1"));
    }
}
