//! 测试用的内存假页面
//!
//! 按 URL 预先登记页面（标题、落地地址、元素），元素按 `Selector` 相等匹配。

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use slip_submit::config::Config;
use slip_submit::infrastructure::{ElementHandle, ElementState, PageDriver};
use slip_submit::models::page_selectors::{
    AUTHENTICATED_INDICATORS, LOGIN_EMAIL, LOGIN_PASSWORD, LOGIN_SUBMIT, PICK_ITEM,
    SLIP_CONTAINER, SUBMIT_CONTROL, SUCCESS_INDICATOR, UNIT_SIZE_INPUT,
};
use slip_submit::models::{CookieRecord, Selector, SelectorSet};

pub const HOME_URL: &str = "https://app.prizepicks.com";
pub const LOGIN_URL: &str = "https://app.prizepicks.com/login";
pub const SHARE_LINK: &str = "https://prizepicks.onelink.me/gCQS/shareEntry?entryId=abc123";
pub const BOARD_URL: &str = "https://app.prizepicks.com/board?entry=abc123";

pub const SESSION_COOKIE: &str = "pp_session";
pub const VALID_TOKEN: &str = "valid-token";

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// 第 `index` 个候选选择器
pub fn nth(set: &SelectorSet, index: usize) -> Selector {
    *set.get(index).unwrap()
}

/// 假页面上的元素
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub selector: Selector,
    pub state: ElementState,
    pub value: String,
    /// 为 false 时写入不生效（模拟页面拒绝注额）
    pub accepts_input: bool,
}

impl FakeElement {
    pub fn visible(selector: Selector) -> Self {
        Self {
            selector,
            state: ElementState {
                displayed: true,
                enabled: true,
                text: String::new(),
                class_name: String::new(),
            },
            value: String::new(),
            accepts_input: true,
        }
    }

    pub fn hidden(selector: Selector) -> Self {
        let mut element = Self::visible(selector);
        element.state.displayed = false;
        element
    }

    pub fn disabled(selector: Selector) -> Self {
        let mut element = Self::visible(selector);
        element.state.enabled = false;
        element
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.state.text = text.to_string();
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.state.class_name = class_name.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.accepts_input = false;
        self
    }
}

/// 点击提交按钮后页面的变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitEffect {
    /// 出现成功提示
    #[default]
    ShowSuccess,
    /// 投注单被清空
    EmptySlip,
    /// 投注单容器被隐藏，内容保持不变
    HideSlip,
    /// 页面没有任何变化
    Nothing,
}

/// 预先登记的页面
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub title: String,
    /// 重定向后的地址，为空时等于请求地址
    pub landing_url: Option<String>,
    pub elements: Vec<FakeElement>,
    pub on_submit: SubmitEffect,
}

impl Route {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn landing_at(mut self, url: &str) -> Self {
        self.landing_url = Some(url.to_string());
        self
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn on_submit(mut self, effect: SubmitEffect) -> Self {
        self.on_submit = effect;
        self
    }

    pub fn without(mut self, selector: Selector) -> Self {
        self.elements.retain(|e| e.selector != selector);
        self
    }
}

/// 分享链接打开后的完整投注单页面
pub fn slip_page() -> Route {
    Route::new("PrizePicks")
        .landing_at(BOARD_URL)
        .with(FakeElement::visible(nth(&SLIP_CONTAINER, 0)).with_text("2 picks"))
        .with(FakeElement::visible(nth(&PICK_ITEM, 0)).with_text("LeBron O 25.5"))
        .with(FakeElement::visible(nth(&PICK_ITEM, 0)).with_text("Curry O 4.5"))
        .with(FakeElement::visible(nth(&SUBMIT_CONTROL, 0)).with_text("Submit"))
        .with(FakeElement::visible(nth(&UNIT_SIZE_INPUT, 0)).with_value("1"))
}

/// 登录页
pub fn login_page() -> Route {
    Route::new("Log in | PrizePicks")
        .with(FakeElement::visible(nth(&LOGIN_EMAIL, 0)))
        .with(FakeElement::visible(nth(&LOGIN_PASSWORD, 0)))
        .with(FakeElement::visible(nth(&LOGIN_SUBMIT, 0)))
}

#[derive(Debug, Default)]
struct PageState {
    routes: HashMap<String, Route>,
    url: String,
    title: String,
    elements: Vec<FakeElement>,
    on_submit: SubmitEffect,
    cookies: Vec<CookieRecord>,
    authenticated: bool,
    login_succeeds: bool,
    goto_delay: Option<Duration>,
    fail_goto: bool,
    fail_screenshot: bool,
    submit_vanishes_on_fill: bool,
    gotos: Vec<String>,
    fills: Vec<(Selector, String)>,
    clicks: Vec<Selector>,
    screenshots: usize,
    closes: usize,
}

/// 内存中的页面驱动
#[derive(Debug, Default)]
pub struct FakePage {
    state: Mutex<PageState>,
}

impl FakePage {
    pub fn new() -> Self {
        let page = Self::default();
        page.edit(|s| {
            s.login_succeeds = true;
            s.routes.insert(HOME_URL.to_string(), Route::new("PrizePicks"));
            s.routes.insert(LOGIN_URL.to_string(), login_page());
        });
        page
    }

    fn edit<T>(&self, f: impl FnOnce(&mut PageState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn route(&self, url: &str, route: Route) {
        self.edit(|s| {
            s.routes.insert(url.to_string(), route);
        });
    }

    /// 直接在当前页面上增加元素
    pub fn add_element(&self, element: FakeElement) {
        self.edit(|s| s.elements.push(element));
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.edit(|s| s.authenticated = authenticated);
    }

    pub fn set_login_succeeds(&self, succeeds: bool) {
        self.edit(|s| s.login_succeeds = succeeds);
    }

    pub fn set_goto_delay(&self, delay: Duration) {
        self.edit(|s| s.goto_delay = Some(delay));
    }

    pub fn set_fail_goto(&self, fail: bool) {
        self.edit(|s| s.fail_goto = fail);
    }

    pub fn set_fail_screenshot(&self, fail: bool) {
        self.edit(|s| s.fail_screenshot = fail);
    }

    /// 写入注额后提交按钮消失（页面重绘）
    pub fn set_submit_vanishes_on_fill(&self, vanishes: bool) {
        self.edit(|s| s.submit_vanishes_on_fill = vanishes);
    }

    pub fn gotos(&self) -> Vec<String> {
        self.edit(|s| s.gotos.clone())
    }

    pub fn fills(&self) -> Vec<(Selector, String)> {
        self.edit(|s| s.fills.clone())
    }

    pub fn clicks(&self) -> Vec<Selector> {
        self.edit(|s| s.clicks.clone())
    }

    pub fn screenshots(&self) -> usize {
        self.edit(|s| s.screenshots)
    }

    pub fn closes(&self) -> usize {
        self.edit(|s| s.closes)
    }

    pub fn applied_cookies(&self) -> Vec<CookieRecord> {
        self.edit(|s| s.cookies.clone())
    }

    fn submit_clicked(state: &mut PageState) {
        match state.on_submit {
            SubmitEffect::ShowSuccess => state
                .elements
                .push(FakeElement::visible(nth(&SUCCESS_INDICATOR, 0)).with_text("Submitted!")),
            SubmitEffect::EmptySlip => {
                state.elements.retain(|e| !PICK_ITEM.candidates().contains(&e.selector));
                for element in state.elements.iter_mut() {
                    if SLIP_CONTAINER.candidates().contains(&element.selector) {
                        element.state.text.clear();
                        element.state.class_name = "slip-builder empty".to_string();
                    }
                }
            }
            SubmitEffect::HideSlip => {
                for element in state.elements.iter_mut() {
                    if SLIP_CONTAINER.candidates().contains(&element.selector) {
                        element.state.displayed = false;
                    }
                }
            }
            SubmitEffect::Nothing => {}
        }
    }

    fn login_clicked(state: &mut PageState) {
        if state.login_succeeds {
            state.authenticated = true;
            state
                .cookies
                .push(CookieRecord::new(SESSION_COOKIE, VALID_TOKEN, ".prizepicks.com"));
        }
    }
}

fn find<'a>(state: &'a mut PageState, handle: &ElementHandle) -> Result<&'a mut FakeElement> {
    state
        .elements
        .iter_mut()
        .filter(|e| e.selector == handle.selector)
        .nth(handle.index)
        .ok_or_else(|| anyhow!("元素已失效: {}", handle.selector))
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let (delay, fail) = self.edit(|s| {
            s.gotos.push(url.to_string());
            (s.goto_delay, s.fail_goto)
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            bail!("net::ERR_CONNECTION_RESET");
        }
        self.edit(|s| {
            let route = s
                .routes
                .get(url)
                .cloned()
                .unwrap_or_else(|| Route::new("404 Not Found"));
            s.url = route.landing_url.clone().unwrap_or_else(|| url.to_string());
            s.title = route.title;
            s.elements = route.elements;
            s.on_submit = route.on_submit;
        });
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.edit(|s| s.title.clone()))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.edit(|s| s.url.clone()))
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>> {
        Ok(self.edit(|s| {
            let mut states: Vec<ElementState> = s
                .elements
                .iter()
                .filter(|e| e.selector == *selector)
                .map(|e| e.state.clone())
                .collect();
            if s.authenticated && *selector == nth(&AUTHENTICATED_INDICATORS, 0) {
                states.push(FakeElement::visible(*selector).state);
            }
            states
        }))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.edit(|s| {
            find(s, element)?;
            s.clicks.push(element.selector);
            if SUBMIT_CONTROL.candidates().contains(&element.selector) {
                Self::submit_clicked(s);
            }
            if LOGIN_SUBMIT.candidates().contains(&element.selector) {
                Self::login_clicked(s);
            }
            Ok(())
        })
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.edit(|s| {
            let target = find(s, element)?;
            if target.accepts_input {
                target.value = text.to_string();
            }
            s.fills.push((element.selector, text.to_string()));
            if s.submit_vanishes_on_fill {
                s.elements
                    .retain(|e| !SUBMIT_CONTROL.candidates().contains(&e.selector));
            }
            Ok(())
        })
    }

    async fn read_value(&self, element: &ElementHandle) -> Result<String> {
        self.edit(|s| Ok(find(s, element)?.value.clone()))
    }

    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        Ok(self.edit(|s| s.cookies.clone()))
    }

    async fn set_cookies(&self, cookies: &[CookieRecord]) -> Result<()> {
        self.edit(|s| {
            if cookies
                .iter()
                .any(|c| c.name == SESSION_COOKIE && c.value == VALID_TOKEN)
            {
                s.authenticated = true;
            }
            s.cookies.extend_from_slice(cookies);
        });
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.edit(|s| {
            if s.fail_screenshot {
                bail!("截图被拒绝");
            }
            s.screenshots += 1;
            Ok(PNG_BYTES.to_vec())
        })
    }

    async fn close(&self) -> Result<()> {
        self.edit(|s| s.closes += 1);
        Ok(())
    }
}

/// 所有等待都很短的配置，文件写入 `dir`
pub fn fast_config(dir: &Path) -> Config {
    Config {
        home_url: HOME_URL.to_string(),
        login_url: LOGIN_URL.to_string(),
        email: Some("bettor@example.com".to_string()),
        password: Some("hunter2".to_string()),
        auto_place_bets: true,
        page_load_timeout: Duration::from_millis(500),
        element_wait_timeout: Duration::from_millis(200),
        navigation_settle_delay: Duration::ZERO,
        unit_settle_delay: Duration::ZERO,
        submission_delay: Duration::ZERO,
        inter_bet_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(10),
        screenshot_on_submission: false,
        cookies_file: dir.join("cookies.json"),
        screenshots_dir: dir.join("screenshots"),
        results_dir: dir.join("results"),
        ..Config::default()
    }
}
