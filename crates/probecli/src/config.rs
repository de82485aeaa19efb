//! 探測設定檔模組
//!
//! 以 JSON 保存單一目標的連線資訊、逾時與自訂提示樣式；
//! 省略的欄位套用內建預設值

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use probecore::{ProbeConfig, PromptPatterns, TransportConfig};
use regex::bytes::Regex;

/// 單一目標的探測設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// 目標主機
    pub host: String,
    /// 連接埠
    #[serde(default = "default_port")]
    pub port: u16,
    /// 等待 banner 的總期限（秒）
    #[serde(default = "default_banner_timeout")]
    pub banner_timeout_secs: u64,
    /// 單次讀取逾時（秒）
    #[serde(default = "default_telnet_timeout")]
    pub telnet_timeout_secs: u64,
    /// 連線逾時（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 自訂登入提示樣式（省略時用內建）
    #[serde(default)]
    pub login_pattern: Option<String>,
    /// 自訂密碼提示樣式
    #[serde(default)]
    pub password_pattern: Option<String>,
    /// 自訂忙碌/拒絕樣式
    #[serde(default)]
    pub busy_pattern: Option<String>,
}

fn default_port() -> u16 {
    23
}

fn default_banner_timeout() -> u64 {
    25
}

fn default_telnet_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

impl Profile {
    /// 以預設逾時創建指向單一主機的設定
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            banner_timeout_secs: default_banner_timeout(),
            telnet_timeout_secs: default_telnet_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            login_pattern: None,
            password_pattern: None,
            busy_pattern: None,
        }
    }

    /// 從 JSON 檔載入
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let profile = serde_json::from_str(&content)?;
        Ok(profile)
    }

    /// 寫回 JSON 檔
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 組出探測設定
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            banner_timeout: Duration::from_secs(self.banner_timeout_secs),
            telnet_timeout: Duration::from_secs(self.telnet_timeout_secs),
            ..Default::default()
        }
    }

    /// 組出傳輸設定
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..Default::default()
        }
    }

    /// 編譯提示樣式，未自訂的欄位沿用內建樣式
    pub fn patterns(&self) -> Result<PromptPatterns, regex::Error> {
        let mut patterns = PromptPatterns::default();
        if let Some(p) = &self.login_pattern {
            patterns.login = Regex::new(p)?;
        }
        if let Some(p) = &self.password_pattern {
            patterns.password = Regex::new(p)?;
        }
        if let Some(p) = &self.busy_pattern {
            patterns.busy = Regex::new(p)?;
        }
        Ok(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_applies_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"host": "10.0.0.1"}"#).unwrap();
        assert_eq!(profile.host, "10.0.0.1");
        assert_eq!(profile.port, 23);
        assert_eq!(profile.banner_timeout_secs, 25);
        assert_eq!(profile.telnet_timeout_secs, 10);
        assert!(profile.login_pattern.is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut profile = Profile::new("printer.lan");
        profile.port = 2323;
        profile.busy_pattern = Some("busy".to_string());

        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, "printer.lan");
        assert_eq!(back.port, 2323);
        assert_eq!(back.busy_pattern.as_deref(), Some("busy"));
    }

    #[test]
    fn test_custom_pattern_compiled() {
        let mut profile = Profile::new("host");
        profile.login_pattern = Some(r"account\s*:".to_string());

        let patterns = profile.patterns().unwrap();
        assert!(patterns.login.is_match(b"account: "));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut profile = Profile::new("host");
        profile.login_pattern = Some("(".to_string());
        assert!(profile.patterns().is_err());
    }
}
