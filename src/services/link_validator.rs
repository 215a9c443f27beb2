//! 链接校验服务 - 业务能力层
//!
//! 判断一个字符串是不是平台的投注单分享链接，无副作用

use std::sync::LazyLock;

use regex::Regex;

/// 单条匹配规则
struct LinkRule {
    name: &'static str,
    pattern: Regex,
}

static RULES: LazyLock<Vec<LinkRule>> = LazyLock::new(|| {
    [
        (
            "share-entry",
            r"(?i)^https?://prizepicks\.onelink\.me/[a-z0-9]+/shareEntry\?(?:[^\s#]*&)?entryId=[^\s&#]+",
        ),
        ("onelink", r"(?i)^https?://prizepicks\.onelink\.me/\S+"),
        (
            "platform-domain",
            r"(?i)^https?://(?:[a-z0-9-]+\.)*prizepicks\.com(?:[/?#]\S*)?$",
        ),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| {
        Regex::new(pattern)
            .map(|pattern| LinkRule { name, pattern })
            .ok()
    })
    .collect()
});

/// 在消息正文中找 URL
static URL_IN_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s<>()\[\]]+").ok());

/// 链接校验器
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkValidator;

impl LinkValidator {
    pub fn new() -> Self {
        Self
    }

    /// 按顺序应用规则，任意一条命中即为有效链接
    pub fn validate(&self, candidate: &str) -> bool {
        self.matching_rule(candidate).is_some()
    }

    /// 返回命中的规则名
    ///
    /// 不裁剪空白：必须以 `http://` 或 `https://` 开头
    pub fn matching_rule(&self, candidate: &str) -> Option<&'static str> {
        RULES
            .iter()
            .find(|rule| rule.pattern.is_match(candidate))
            .map(|rule| rule.name)
    }
}

/// 从聊天消息中提取有效链接，去重并保持出现顺序
pub fn extract_links(content: &str) -> Vec<String> {
    let Some(url_re) = URL_IN_TEXT.as_ref() else {
        return Vec::new();
    };
    let validator = LinkValidator::new();
    let mut links: Vec<String> = Vec::new();
    for m in url_re.find_iter(content) {
        // 聊天里常见的结尾标点不属于链接
        let link = m.as_str().trim_end_matches(['.', ',', '!', '?', ';', ':', '>', '*', '_', '|']);
        if validator.validate(link) && !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
    }
    links
}
