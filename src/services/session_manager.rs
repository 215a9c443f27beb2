//! 会话管理服务 - 业务能力层
//!
//! 持有唯一的浏览器会话：恢复 / 保存 Cookie、登录、登录状态探测、关闭。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials};
use crate::error::{AppError, AppResult, AuthenticationError, EnvironmentError};
use crate::infrastructure::{CdpDriver, ElementHandle, PageDriver};
use crate::models::page_selectors::{
    AUTHENTICATED_INDICATORS, LOGIN_EMAIL, LOGIN_PASSWORD, LOGIN_SUBMIT,
};
use crate::models::{CookieRecord, SelectorSet};
use crate::services::{CookieStore, ElementResolver};

/// 已建立的浏览器会话
///
/// 同一时刻只能有一个流程在会话上运行，`SlipFlow::run` 通过 `&mut Session` 保证这一点。
pub struct Session {
    driver: Arc<dyn PageDriver>,
    alive: bool,
    cookies: Option<Vec<CookieRecord>>,
}

impl Session {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            alive: true,
            cookies: None,
        }
    }

    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// 最近一次恢复或保存的 Cookie
    pub fn cookies(&self) -> Option<&[CookieRecord]> {
        self.cookies.as_deref()
    }
}

/// 会话管理器
pub struct SessionManager {
    config: Config,
    store: CookieStore,
    resolver: ElementResolver,
    session: Option<Session>,
}

impl SessionManager {
    /// 启动浏览器并创建会话
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let driver = CdpDriver::from_config(&config).await?;
        Ok(Self::with_driver(config, Arc::new(driver)))
    }

    /// 使用外部提供的驱动创建会话
    pub fn with_driver(config: Config, driver: Arc<dyn PageDriver>) -> Self {
        Self {
            store: CookieStore::new(config.cookies_file.clone()),
            resolver: ElementResolver::new(config.poll_interval),
            session: Some(Session::new(driver)),
            config,
        }
    }

    /// 取得可变会话，已关闭时报错
    pub fn session_mut(&mut self) -> AppResult<&mut Session> {
        self.session
            .as_mut()
            .filter(|s| s.alive)
            .ok_or(AppError::Environment(EnvironmentError::SessionClosed))
    }

    fn driver(&self) -> AppResult<Arc<dyn PageDriver>> {
        self.session
            .as_ref()
            .filter(|s| s.alive)
            .map(|s| Arc::clone(&s.driver))
            .ok_or(AppError::Environment(EnvironmentError::SessionClosed))
    }

    /// 从 Cookie 文件恢复会话
    ///
    /// # 返回
    /// 是否应用了 Cookie（不检查 Cookie 是否仍然有效）
    pub async fn restore_session(&mut self) -> bool {
        let driver = match self.driver() {
            Ok(d) => d,
            Err(e) => {
                warn!("无法恢复会话: {}", e);
                return false;
            }
        };

        let cookies = match self.store.load().await {
            Ok(Some(cookies)) => {
                let now = chrono::Utc::now().timestamp() as f64;
                let (expired, valid): (Vec<_>, Vec<_>) =
                    cookies.into_iter().partition(|c| c.is_expired(now));
                if !expired.is_empty() {
                    debug!("丢弃 {} 条已过期的 Cookie", expired.len());
                }
                if valid.is_empty() {
                    info!("已保存的 Cookie 全部过期");
                    return false;
                }
                valid
            }
            Ok(None) => {
                info!("没有已保存的 Cookie");
                return false;
            }
            Err(e) => {
                warn!("读取 Cookie 失败: {}", e);
                return false;
            }
        };

        let home = self.config.home_url.clone();
        let applied = async {
            driver.goto(&home).await?;
            driver.set_cookies(&cookies).await?;
            // 重新加载，让页面带上 Cookie
            driver.goto(&home).await?;
            anyhow::Ok(())
        }
        .await;

        match applied {
            Ok(()) => {
                info!("🍪 已恢复 {} 条 Cookie", cookies.len());
                if let Some(session) = self.session.as_mut() {
                    session.cookies = Some(cookies);
                }
                true
            }
            Err(e) => {
                warn!("应用 Cookie 失败: {:#}", e);
                false
            }
        }
    }

    /// 登录
    ///
    /// 已登录时直接返回，不会重复提交凭据。成功后保存 Cookie。
    pub async fn authenticate(&mut self, credentials: &Credentials) -> AppResult<()> {
        let driver = self.driver()?;

        info!("🔐 打开登录页: {}", self.config.login_url);
        driver
            .goto(&self.config.login_url)
            .await
            .map_err(AppError::auth_browser_failed)?;

        if self.detect_login(driver.as_ref()).await {
            info!("✓ 已处于登录状态");
            return Ok(());
        }

        let email = self
            .require(driver.as_ref(), &LOGIN_EMAIL, Some(self.config.element_wait_timeout))
            .await?;
        driver
            .fill(&email, &credentials.email)
            .await
            .map_err(AppError::auth_browser_failed)?;

        let password = self.require(driver.as_ref(), &LOGIN_PASSWORD, None).await?;
        driver
            .fill(&password, &credentials.password)
            .await
            .map_err(AppError::auth_browser_failed)?;

        let submit = self.require(driver.as_ref(), &LOGIN_SUBMIT, None).await?;
        driver
            .click(&submit)
            .await
            .map_err(AppError::auth_browser_failed)?;
        debug!("已提交登录表单");

        self.wait_until_authenticated(driver.as_ref()).await?;
        info!("✅ 登录成功");

        match driver.cookies().await {
            Ok(cookies) => {
                if let Err(e) = self.store.save(&cookies).await {
                    warn!("保存 Cookie 失败: {}", e);
                }
                if let Some(session) = self.session.as_mut() {
                    session.cookies = Some(cookies);
                }
            }
            Err(e) => warn!("读取浏览器 Cookie 失败: {:#}", e),
        }

        Ok(())
    }

    /// 是否处于登录状态，出错时视为未登录
    pub async fn is_authenticated(&self) -> bool {
        match self.driver() {
            Ok(driver) => self.detect_login(driver.as_ref()).await,
            Err(_) => false,
        }
    }

    /// 先恢复 Cookie，仍未登录时再用凭据登录
    pub async fn ensure_authenticated(&mut self, credentials: Option<&Credentials>) -> AppResult<()> {
        if self.restore_session().await && self.is_authenticated().await {
            info!("✓ Cookie 有效，跳过登录");
            return Ok(());
        }
        let credentials = credentials.ok_or(AuthenticationError::MissingCredentials)?;
        self.authenticate(credentials).await
    }

    /// 关闭浏览器，可重复调用
    pub async fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.alive = false;
            if let Err(e) = session.driver.close().await {
                warn!("关闭浏览器失败: {:#}", e);
            }
        }
    }

    async fn detect_login(&self, driver: &dyn PageDriver) -> bool {
        self.resolver
            .resolve(driver, &AUTHENTICATED_INDICATORS, None)
            .await
            .is_some()
    }

    async fn require(
        &self,
        driver: &dyn PageDriver,
        set: &SelectorSet,
        timeout: Option<Duration>,
    ) -> AppResult<ElementHandle> {
        self.resolver.resolve(driver, set, timeout).await.ok_or_else(|| {
            AppError::Authentication(AuthenticationError::FieldNotFound {
                field: set.name().to_string(),
            })
        })
    }

    async fn wait_until_authenticated(&self, driver: &dyn PageDriver) -> AppResult<()> {
        let timeout = self.config.element_wait_timeout;
        let deadline = Instant::now() + timeout;
        loop {
            if self.detect_login(driver).await {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(AuthenticationError::Timeout {
                    timeout_secs: timeout.as_secs(),
                }
                .into());
            }
            sleep(self.config.poll_interval.min(deadline - now)).await;
        }
    }
}
