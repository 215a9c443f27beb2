//! 选择器与选择器集合
//!
//! 一个 `SelectorSet` 描述定位同一个页面元素的多种写法，顺序即优先级。

use std::fmt;

/// 选择器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// CSS 选择器
    Css,
    /// XPath 表达式
    XPath,
    /// 标签名 + 文本包含匹配
    Text { tag: &'static str },
}

/// 单个选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: &'static str,
}

impl Selector {
    pub const fn css(value: &'static str) -> Self {
        Self {
            kind: SelectorKind::Css,
            value,
        }
    }

    pub const fn xpath(value: &'static str) -> Self {
        Self {
            kind: SelectorKind::XPath,
            value,
        }
    }

    /// `tag` 元素中文本包含 `text` 的元素
    pub const fn text(tag: &'static str, text: &'static str) -> Self {
        Self {
            kind: SelectorKind::Text { tag },
            value: text,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::Css => write!(f, "css:{}", self.value),
            SelectorKind::XPath => write!(f, "xpath:{}", self.value),
            SelectorKind::Text { tag } => write!(f, "text:{}[{}]", tag, self.value),
        }
    }
}

/// 有序的选择器集合，运行期不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSet {
    name: &'static str,
    candidates: &'static [Selector],
}

impl SelectorSet {
    pub const fn new(name: &'static str, candidates: &'static [Selector]) -> Self {
        Self { name, candidates }
    }

    /// 逻辑元素名（用于日志和错误信息）
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn candidates(&self) -> &'static [Selector] {
        self.candidates
    }

    /// 第 `index` 个候选（从 0 开始）
    pub fn get(&self, index: usize) -> Option<&'static Selector> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
