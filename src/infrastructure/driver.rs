//! 页面驱动接口
//!
//! 流程层与会话层只通过 `PageDriver` 操作浏览器，真实实现是 [`CdpDriver`]，
//! 测试中可以替换为内存中的假页面。
//!
//! [`CdpDriver`]: crate::infrastructure::CdpDriver

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{CookieRecord, Selector};

/// 元素在查询瞬间的状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub displayed: bool,
    pub enabled: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub class_name: String,
}

impl ElementState {
    /// 可见且可交互
    pub fn is_interactive(&self) -> bool {
        self.displayed && self.enabled
    }
}

/// 已定位的元素
///
/// 通过"选择器 + 第几个匹配"重新定位，页面重绘后可能失效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub selector: Selector,
    pub index: usize,
    pub state: ElementState,
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定地址，等待页面加载
    async fn goto(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    /// 查询选择器的所有匹配（按文档顺序），不等待
    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// 清空输入框后写入文本
    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<()>;

    /// 读取输入框当前值
    async fn read_value(&self, element: &ElementHandle) -> Result<String>;

    async fn cookies(&self) -> Result<Vec<CookieRecord>>;

    async fn set_cookies(&self, cookies: &[CookieRecord]) -> Result<()>;

    /// 当前视口的 PNG 截图
    async fn screenshot_png(&self) -> Result<Vec<u8>>;

    /// 关闭浏览器，重复调用无副作用
    async fn close(&self) -> Result<()>;
}
