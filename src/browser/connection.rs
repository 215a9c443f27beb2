use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::launcher::hide_automation;
use crate::error::{AppError, AppResult};

/// 连接到已开启调试端口的浏览器
///
/// 优先复用已经打开平台页面的标签页，否则新建标签页并导航到 `home_url`
pub async fn connect_to_browser_and_page(port: u16, home_url: &str) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

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

    let pages = browser
        .pages()
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;
    debug!("获取到 {} 个页面", pages.len());

    let host = host_of(home_url);
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            if !host.is_empty() && url.contains(host) {
                info!("✓ 复用已打开的页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("未找到平台页面，创建新页面并导航到: {}", home_url);
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;
    hide_automation(&page)
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;
    page.goto(home_url)
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;
    info!("已导航到: {}", home_url);

    Ok((browser, page))
}

/// 取出 URL 中的主机名
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', '?', '#']).next().unwrap_or_default()
}
