//! Application configuration. Listen address, paths, timings.

use crate::domain::DEFAULT_MARKER;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address: all interfaces, port 9002 (the phone is on the LAN).
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9002";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "sms-relay.log";

/// Default name for notifications and the autorun entry.
pub const DEFAULT_APP_NAME: &str = "sms-relay";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Listen address. Read from SMS_RELAY_LISTEN_ADDR.
    #[serde(default)]
    pub listen_addr: Option<String>,

    /// Log file path. Read from SMS_RELAY_LOG_PATH.
    #[serde(default)]
    pub log_path: Option<String>,

    /// Delay in ms between key-down and key-up edges when pasting. Read from SMS_RELAY_PASTE_SETTLE_MS.
    #[serde(default)]
    pub paste_settle_ms: Option<u64>,

    /// How long `stop` waits for in-flight requests before aborting. Read from SMS_RELAY_SHUTDOWN_TIMEOUT_MS.
    #[serde(default)]
    pub shutdown_timeout_ms: Option<u64>,

    /// Marker phrase preceding the verification code. Read from SMS_RELAY_CODE_MARKER.
    #[serde(default)]
    pub code_marker: Option<String>,

    /// Notification app id and autorun entry name. Read from SMS_RELAY_APP_NAME.
    #[serde(default)]
    pub app_name: Option<String>,

    /// Icon shown in notifications. Read from SMS_RELAY_ICON_PATH.
    #[serde(default)]
    pub icon_path: Option<String>,

    /// No interactive menu: start listening and run until Ctrl-C. Read from SMS_RELAY_HEADLESS.
    #[serde(default)]
    pub headless: Option<bool>,

    /// Start the listener before showing the menu. Read from SMS_RELAY_AUTO_START.
    #[serde(default)]
    pub auto_start: Option<bool>,

    /// Record clipboard/paste/notification/autorun calls in memory instead of
    /// touching the desktop. Read from SMS_RELAY_DRY_RUN.
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("SMS_RELAY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("SMS_RELAY").try_parsing(true));
        c.build()?.try_deserialize()
    }

    /// Parsed listen address. Defaults to DEFAULT_LISTEN_ADDR.
    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.listen_addr
            .as_deref()
            .unwrap_or(DEFAULT_LISTEN_ADDR)
            .parse()
    }

    pub fn log_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.log_path.as_deref().unwrap_or(DEFAULT_LOG_PATH))
    }

    /// Paste settle delay. Defaults to 100 ms.
    pub fn paste_settle(&self) -> Duration {
        Duration::from_millis(self.paste_settle_ms.unwrap_or(100))
    }

    /// Graceful shutdown bound. Defaults to 3 s.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms.unwrap_or(3000))
    }

    /// Marker phrase; empty values fall back to the default.
    pub fn code_marker_or_default(&self) -> &str {
        self.code_marker
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MARKER)
    }

    pub fn app_name_or_default(&self) -> &str {
        self.app_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }

    pub fn icon_path(&self) -> Option<PathBuf> {
        self.icon_path.as_deref().map(PathBuf::from)
    }

    pub fn is_headless(&self) -> bool {
        self.headless.unwrap_or(false)
    }

    pub fn is_auto_start(&self) -> bool {
        self.auto_start.unwrap_or(false)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.listen_addr().unwrap(), "0.0.0.0:9002".parse().unwrap());
        assert_eq!(cfg.log_path_or_default(), PathBuf::from("sms-relay.log"));
        assert_eq!(cfg.paste_settle(), Duration::from_millis(100));
        assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.code_marker_or_default(), "验证码");
        assert_eq!(cfg.app_name_or_default(), "sms-relay");
        assert!(!cfg.is_headless());
        assert!(!cfg.is_auto_start());
        assert!(!cfg.is_dry_run());
    }

    #[test]
    fn test_empty_strings_fall_back() {
        let cfg = AppConfig {
            code_marker: Some(String::new()),
            app_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(cfg.code_marker_or_default(), DEFAULT_MARKER);
        assert_eq!(cfg.app_name_or_default(), DEFAULT_APP_NAME);
    }

    #[test]
    fn test_invalid_listen_addr() {
        let cfg = AppConfig {
            listen_addr: Some(":9002".into()),
            ..Default::default()
        };
        assert!(cfg.listen_addr().is_err());
    }

    #[test]
    fn test_deserialize_from_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(
            &path,
            "listen_addr = \"127.0.0.1:19002\"\npaste_settle_ms = 50\nheadless = true\n",
        )
        .unwrap();
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.listen_addr().unwrap().port(), 19002);
        assert_eq!(cfg.paste_settle(), Duration::from_millis(50));
        assert!(cfg.is_headless());
    }
}
