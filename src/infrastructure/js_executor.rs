//! 页面脚本执行 - 基础设施层
//!
//! 投注页上的查询、点击、填值都是注入的一段 IIFE 脚本，这里负责执行并把失败
//! 带上脚本摘要，方便从日志里看出是哪一步的 DOM 操作出了问题。

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::utils::truncate_text;

/// 错误信息里保留的脚本长度
const PREVIEW_LEN: usize = 120;

/// 页面脚本执行器，持有标签页本身
///
/// 不知道选择器和投注单是什么，只负责"跑脚本、拿 JSON"。
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航、截图、Cookie 直接走 CDP
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行脚本，返回脚本的 JSON 结果
    pub async fn eval(&self, script: impl Into<String>) -> Result<JsonValue> {
        let script = script.into();
        let preview = script_preview(&script);
        let evaluation = self
            .page
            .evaluate(script)
            .await
            .inspect_err(|e| debug!("脚本执行失败: {} | {}", preview, e))
            .with_context(|| format!("执行页面脚本失败: {}", preview))?;
        evaluation
            .into_value()
            .with_context(|| format!("读取脚本返回值失败: {}", preview))
    }

    /// 执行脚本并把结果解析成 `T`
    pub async fn eval_as<T: DeserializeOwned>(&self, script: impl Into<String>) -> Result<T> {
        let script = script.into();
        let preview = script_preview(&script);
        let value = self.eval(script).await?;
        serde_json::from_value(value).with_context(|| {
            format!(
                "脚本返回值不是 {}: {}",
                std::any::type_name::<T>(),
                preview
            )
        })
    }
}

/// 把多行脚本压成一行并截断
fn script_preview(script: &str) -> String {
    let flat = script.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_text(&flat, PREVIEW_LEN)
}
