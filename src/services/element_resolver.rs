//! 元素定位服务 - 业务能力层
//!
//! 按优先级依次尝试选择器集合中的每个选择器，返回第一个可见且可交互的元素。
//! 只做语法匹配，不理解页面语义。

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::infrastructure::{ElementHandle, PageDriver};
use crate::models::{Selector, SelectorSet};

/// 元素定位器
#[derive(Debug, Clone, Copy)]
pub struct ElementResolver {
    poll_interval: Duration,
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl ElementResolver {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// 定位元素
    ///
    /// # 参数
    /// - `driver`: 页面驱动
    /// - `set`: 选择器集合，顺序即优先级
    /// - `timeout`: 为空时每个选择器只查一次；否则每个选择器轮询到超时再换下一个
    ///
    /// # 返回
    /// 第一个命中选择器的第一个可交互元素；全部未命中返回 `None`
    pub async fn resolve(
        &self,
        driver: &dyn PageDriver,
        set: &SelectorSet,
        timeout: Option<Duration>,
    ) -> Option<ElementHandle> {
        for selector in set.candidates() {
            let found = match timeout {
                Some(timeout) => self.poll(driver, selector, timeout).await,
                None => self.lookup(driver, selector).await,
            };
            if let Some(handle) = found {
                debug!("✓ {} 命中: {}", set.name(), selector);
                return Some(handle);
            }
        }
        debug!("{} 未找到 (共尝试 {} 个选择器)", set.name(), set.len());
        None
    }

    /// 返回第一个有命中的选择器的全部可交互元素（不等待）
    pub async fn resolve_all(&self, driver: &dyn PageDriver, set: &SelectorSet) -> Vec<ElementHandle> {
        for selector in set.candidates() {
            let handles = self.lookup_all(driver, selector).await;
            if !handles.is_empty() {
                debug!("✓ {} 命中 {} 个: {}", set.name(), handles.len(), selector);
                return handles;
            }
        }
        Vec::new()
    }

    async fn lookup(&self, driver: &dyn PageDriver, selector: &Selector) -> Option<ElementHandle> {
        self.lookup_all(driver, selector).await.into_iter().next()
    }

    async fn lookup_all(&self, driver: &dyn PageDriver, selector: &Selector) -> Vec<ElementHandle> {
        match driver.query(selector).await {
            Ok(states) => states
                .into_iter()
                .enumerate()
                .filter(|(_, state)| state.is_interactive())
                .map(|(index, state)| ElementHandle {
                    selector: *selector,
                    index,
                    state,
                })
                .collect(),
            Err(e) => {
                // 查询失败等同于未命中，交给下一个选择器
                debug!("查询 {} 失败: {}", selector, e);
                Vec::new()
            }
        }
    }

    async fn poll(
        &self,
        driver: &dyn PageDriver,
        selector: &Selector,
        timeout: Duration,
    ) -> Option<ElementHandle> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(handle) = self.lookup(driver, selector).await {
                return Some(handle);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
