//! 基于 chromiumoxide 的页面驱动
//!
//! DOM 查询和交互全部通过 `JsExecutor` 注入脚本完成，导航、Cookie、截图走 CDP。

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::driver::{ElementHandle, ElementState, PageDriver};
use crate::infrastructure::JsExecutor;
use crate::models::{CookieRecord, Selector, SelectorKind};

pub struct CdpDriver {
    executor: JsExecutor,
    browser: Mutex<Option<Browser>>,
}

impl CdpDriver {
    pub fn new(browser: Browser, page: Page) -> Self {
        Self {
            executor: JsExecutor::new(page),
            browser: Mutex::new(Some(browser)),
        }
    }

    /// 按配置启动浏览器；配置了调试端口时连接已打开的浏览器
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port, &config.home_url).await?,
            None => browser::launch_browser(config).await?,
        };
        Ok(Self::new(browser, page))
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }

    /// 对第 `index` 个匹配执行一段脚本，`body` 中可用变量 `el`
    async fn with_element(&self, element: &ElementHandle, body: &str) -> Result<JsonValue> {
        let script = format!(
            r#"
            (() => {{
                let els;
                try {{ els = {locate}; }} catch (e) {{ return null; }}
                const el = els[{index}];
                if (!el) return null;
                {body}
            }})()
            "#,
            locate = locate_expr(&element.selector),
            index = element.index,
            body = body,
        );
        let value = self.executor.eval(script).await?;
        if value.is_null() {
            bail!("元素已从页面消失: {}#{}", element.selector, element.index);
        }
        Ok(value)
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page()
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page().get_title().await?.unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page().url().await?.unwrap_or_default())
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>> {
        let script = format!(
            r#"
            (() => {{
                let els;
                try {{ els = {locate}; }} catch (e) {{ return []; }}
                return els.map(el => {{
                    const style = window.getComputedStyle(el);
                    const rect = el.getBoundingClientRect();
                    return {{
                        displayed: style.display !== 'none'
                            && style.visibility !== 'hidden'
                            && (rect.width > 0 || rect.height > 0),
                        enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true',
                        text: (el.innerText || el.textContent || '').trim(),
                        class_name: typeof el.className === 'string' ? el.className : '',
                    }};
                }});
            }})()
            "#,
            locate = locate_expr(selector),
        );
        self.executor.eval_as(script).await
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.with_element(
            element,
            "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
        )
        .await?;
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<()> {
        // 通过原生 setter 写值，受控组件才能收到 input 事件
        let body = format!(
            r#"
            const proto = el instanceof HTMLTextAreaElement
                ? HTMLTextAreaElement.prototype
                : HTMLInputElement.prototype;
            const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
            el.focus();
            setter.call(el, '');
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            setter.call(el, {text});
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            el.blur();
            return true;
            "#,
            text = js_string(text),
        );
        self.with_element(element, &body).await?;
        Ok(())
    }

    async fn read_value(&self, element: &ElementHandle) -> Result<String> {
        let value = self
            .with_element(
                element,
                "return String(el.value !== undefined ? el.value : (el.textContent || ''));",
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        let cookies = self.page().get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| CookieRecord {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
                expires: if c.session { None } else { Some(c.expires) },
            })
            .collect())
    }

    async fn set_cookies(&self, cookies: &[CookieRecord]) -> Result<()> {
        let mut params = Vec::with_capacity(cookies.len());
        for c in cookies {
            let mut builder = CookieParam::builder()
                .name(c.name.clone())
                .value(c.value.clone())
                .domain(c.domain.clone())
                .path(c.path.clone())
                .secure(c.secure)
                .http_only(c.http_only);
            if let Some(expires) = c.expires {
                builder = builder.expires(TimeSinceEpoch::new(expires));
            }
            params.push(builder.build().map_err(anyhow::Error::msg)?);
        }
        self.page().set_cookies(params).await?;
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let png = self
            .page()
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await?;
        Ok(png)
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                debug!("等待浏览器进程退出失败: {}", e);
            }
            info!("🛑 浏览器已关闭");
        }
        Ok(())
    }
}

/// 生成返回元素数组的 JS 表达式
fn locate_expr(selector: &Selector) -> String {
    let value = js_string(selector.value);
    match selector.kind {
        SelectorKind::Css => format!("Array.from(document.querySelectorAll({}))", value),
        SelectorKind::XPath => format!(
            "(() => {{ const r = document.evaluate({}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
             for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
             return out; }})()",
            value
        ),
        SelectorKind::Text { tag } => format!(
            "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
            js_string(tag),
            value
        ),
    }
}

/// 转成 JS 字符串字面量
fn js_string(s: &str) -> String {
    JsonValue::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_expr_escapes_quotes() {
        let expr = locate_expr(&Selector::css("input[name='unitSize']"));
        assert_eq!(
            expr,
            r#"Array.from(document.querySelectorAll("input[name='unitSize']"))"#
        );

        let text = locate_expr(&Selector::text("div", "Say \"hi\""));
        assert!(text.contains(r#"querySelectorAll("div")"#));
        assert!(text.contains(r#"includes("Say \"hi\"")"#));
    }

    #[test]
    fn test_locate_expr_xpath_snapshot() {
        let expr = locate_expr(&Selector::xpath("//button[contains(., 'Submit')]"));
        assert!(expr.contains("document.evaluate(\"//button[contains(., 'Submit')]\""));
        assert!(expr.contains("snapshotItem"));
    }
}
