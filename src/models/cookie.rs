use serde::{Deserialize, Serialize};

/// 持久化的 Cookie 记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// 过期时间（秒级时间戳），会话 Cookie 为空
    #[serde(default)]
    pub expires: Option<f64>,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            secure: false,
            http_only: false,
            expires: None,
        }
    }

    /// 是否已过期
    pub fn is_expired(&self, now_secs: f64) -> bool {
        matches!(self.expires, Some(exp) if exp > 0.0 && exp <= now_secs)
    }
}
