//! 提示樣式模組
//!
//! 以正則樣式判斷累積的 banner 停在哪種提示：登入、密碼，
//! 或伺服器忙碌（即將主動斷線）。樣式直接比對位元組，banner
//! 不保證是合法的 UTF-8

use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    static ref DEFAULT_LOGIN: Regex =
        Regex::new(r"(?i)(login|user\s?name)\s*[:>]\s*$").unwrap();
    static ref DEFAULT_PASSWORD: Regex =
        Regex::new(r"(?i)pass(word|code)\s*[:>]\s*$").unwrap();
    static ref DEFAULT_BUSY: Regex =
        Regex::new(r"(?i)(busy|too many|try again later|unavailable)").unwrap();
}

/// 提示種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// 登入（帳號）提示
    Login,
    /// 密碼提示
    Password,
    /// 伺服器忙碌，即將斷線
    Busy,
}

/// 登入/密碼/忙碌三種提示樣式
///
/// 由呼叫端在建構時提供；`Default` 帶常見的 telnet 提示簽名
#[derive(Debug, Clone)]
pub struct PromptPatterns {
    /// 登入提示樣式
    pub login: Regex,
    /// 密碼提示樣式
    pub password: Regex,
    /// 忙碌/拒絕樣式
    pub busy: Regex,
}

impl PromptPatterns {
    /// 以自訂樣式創建
    pub fn new(login: Regex, password: Regex, busy: Regex) -> Self {
        Self {
            login,
            password,
            busy,
        }
    }

    /// 比對 banner，回傳第一個成立的提示種類
    ///
    /// 優先序固定：登入、密碼、忙碌
    pub fn classify(&self, banner: &[u8]) -> Option<PromptKind> {
        if self.login.is_match(banner) {
            return Some(PromptKind::Login);
        }
        if self.password.is_match(banner) {
            return Some(PromptKind::Password);
        }
        if self.busy.is_match(banner) {
            return Some(PromptKind::Busy);
        }
        None
    }
}

impl Default for PromptPatterns {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN.clone(),
            password: DEFAULT_PASSWORD.clone(),
            busy: DEFAULT_BUSY.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_login() {
        let patterns = PromptPatterns::default();
        assert_eq!(
            patterns.classify(b"Ubuntu 20.04\nhost login: "),
            Some(PromptKind::Login)
        );
        assert_eq!(
            patterns.classify(b"Username:"),
            Some(PromptKind::Login)
        );
    }

    #[test]
    fn test_classify_password() {
        let patterns = PromptPatterns::default();
        assert_eq!(
            patterns.classify(b"Password: "),
            Some(PromptKind::Password)
        );
    }

    #[test]
    fn test_classify_busy() {
        let patterns = PromptPatterns::default();
        assert_eq!(
            patterns.classify(b"Console busy, disconnecting"),
            Some(PromptKind::Busy)
        );
    }

    #[test]
    fn test_classify_none() {
        let patterns = PromptPatterns::default();
        assert_eq!(patterns.classify(b"Welcome to the server"), None);
    }

    #[test]
    fn test_priority_login_first() {
        // 同時符合登入與忙碌樣式時，登入優先
        let patterns = PromptPatterns::default();
        assert_eq!(
            patterns.classify(b"server busy\nlogin: "),
            Some(PromptKind::Login)
        );
    }

    #[test]
    fn test_non_utf8_banner() {
        let patterns = PromptPatterns::default();
        let mut banner = vec![0xFF, 0xFE];
        banner.extend_from_slice(b"login: ");
        assert_eq!(patterns.classify(&banner), Some(PromptKind::Login));
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = PromptPatterns::new(
            Regex::new(r"enter code:").unwrap(),
            Regex::new(r"secret:").unwrap(),
            Regex::new(r"go away").unwrap(),
        );
        assert_eq!(
            patterns.classify(b"please enter code:"),
            Some(PromptKind::Login)
        );
        assert_eq!(patterns.classify(b"go away"), Some(PromptKind::Busy));
    }
}
