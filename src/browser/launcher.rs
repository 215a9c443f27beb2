use anyhow::Context;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, EnvironmentError};

/// 固定的桌面浏览器 UA
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 在每个新文档中隐藏 navigator.webdriver
const HIDE_WEBDRIVER_JS: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// 启动浏览器参数
pub fn launch_args() -> Vec<String> {
    vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--user-agent={}", USER_AGENT),
    ]
}

/// 启动浏览器并打开空白页
pub async fn launch_browser(config: &Config) -> AppResult<(Browser, Page)> {
    info!("🚀 启动浏览器 (无头: {})...", config.headless);

    let mut builder = BrowserConfig::builder()
        .args(launch_args())
        .request_timeout(config.page_load_timeout);
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &config.chrome_executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        AppError::Environment(EnvironmentError::ConfigurationFailed { message: e })
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::launch_failed(e))?;
    hide_automation(&page)
        .await
        .map_err(|e| AppError::launch_failed(e))?;

    info!("✅ 浏览器已就绪");
    Ok((browser, page))
}

/// 隐藏自动化标记
pub async fn hide_automation(page: &Page) -> anyhow::Result<()> {
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
        HIDE_WEBDRIVER_JS.to_string(),
    ))
    .await
    .context("注入 webdriver 覆盖脚本失败")?;
    Ok(())
}
