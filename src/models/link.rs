//! 候选链接及其来源信息

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 候选投注单链接
///
/// 由消息采集层产生，每条只被流程消费一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// 分享链接
    pub link: String,
    /// 发布者
    #[serde(default)]
    pub author: Option<String>,
    /// 来源频道
    #[serde(default)]
    pub source_channel: Option<String>,
    /// 来源消息
    #[serde(default)]
    pub message_id: Option<String>,
    /// 发布时间（ISO-8601）
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl CandidateLink {
    /// 只有链接、没有来源信息（手动提交）
    pub fn bare(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            author: None,
            source_channel: None,
            message_id: None,
            timestamp: None,
        }
    }

    /// 带上来源信息
    pub fn with_provenance(
        link: impl Into<String>,
        author: Option<String>,
        source_channel: Option<String>,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            link: link.into(),
            author,
            source_channel,
            message_id: None,
            timestamp,
        }
    }
}

/// 抓取到的原始聊天消息
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedMessage {
    #[serde(default)]
    pub id: Option<JsonValue>,
    pub content: String,
    #[serde(default)]
    pub author: Option<JsonValue>,
    #[serde(default)]
    pub channel_id: Option<JsonValue>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ScrapedMessage {
    /// 把消息里的某条链接包装成候选链接
    pub fn to_candidate(&self, link: &str) -> CandidateLink {
        CandidateLink {
            link: link.to_string(),
            author: self.author.as_ref().map(value_to_string),
            source_channel: self.channel_id.as_ref().map(value_to_string),
            message_id: self.id.as_ref().map(value_to_string),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// 抓取文件中的一项：原始消息，或已经提取好的链接
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScrapedEntry {
    Message(ScrapedMessage),
    Link(CandidateLink),
}

/// 聊天平台的 ID 可能是数字也可能是字符串
fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(map) => map
            .get("username")
            .or_else(|| map.get("name"))
            .map(value_to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
