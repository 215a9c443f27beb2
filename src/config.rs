use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, FileError};

/// 程序配置
///
/// 启动时加载一次，之后只读。
#[derive(Clone, Debug)]
pub struct Config {
    /// 平台首页
    pub home_url: String,
    /// 登录页
    pub login_url: String,
    /// 登录邮箱
    pub email: Option<String>,
    /// 登录密码
    pub password: Option<String>,
    /// 默认注额
    pub default_unit_size: u32,
    /// 注额上限（仅提示，不强制）
    pub max_unit_size: u32,
    /// 是否自动下注（否则只校验链接）
    pub auto_place_bets: bool,
    /// 页面加载超时
    pub page_load_timeout: Duration,
    /// 等待元素超时
    pub element_wait_timeout: Duration,
    /// 导航后的固定等待
    pub navigation_settle_delay: Duration,
    /// 写入注额后的等待
    pub unit_settle_delay: Duration,
    /// 点击提交后的等待
    pub submission_delay: Duration,
    /// 两笔投注之间的间隔
    pub inter_bet_delay: Duration,
    /// 轮询元素的间隔
    pub poll_interval: Duration,
    /// 提交前后是否截图
    pub screenshot_on_submission: bool,
    /// 是否无头模式
    pub headless: bool,
    /// 连接已打开浏览器的调试端口（为空则自行启动）
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<PathBuf>,
    /// Cookie 文件
    pub cookies_file: PathBuf,
    /// 截图目录
    pub screenshots_dir: PathBuf,
    /// 结果目录
    pub results_dir: PathBuf,
    /// 日志级别
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_url: "https://app.prizepicks.com".to_string(),
            login_url: "https://app.prizepicks.com/login".to_string(),
            email: None,
            password: None,
            default_unit_size: 1,
            max_unit_size: 10,
            auto_place_bets: false,
            page_load_timeout: Duration::from_secs(30),
            element_wait_timeout: Duration::from_secs(10),
            navigation_settle_delay: Duration::from_secs(3),
            unit_settle_delay: Duration::from_secs(1),
            submission_delay: Duration::from_secs(1),
            inter_bet_delay: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
            screenshot_on_submission: true,
            headless: false,
            browser_debug_port: None,
            chrome_executable: None,
            cookies_file: PathBuf::from("prizepicks_cookies.json"),
            screenshots_dir: PathBuf::from("screenshots"),
            results_dir: PathBuf::from("results"),
            log_level: "info".to_string(),
        }
    }
}

/// 登录凭据
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// TOML 配置文件，所有字段可选，覆盖默认值
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    home_url: Option<String>,
    login_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    default_unit_size: Option<u32>,
    max_unit_size: Option<u32>,
    auto_place_bets: Option<bool>,
    page_load_timeout_secs: Option<u64>,
    element_wait_timeout_secs: Option<u64>,
    submission_delay_secs: Option<u64>,
    inter_bet_delay_secs: Option<u64>,
    screenshot_on_submission: Option<bool>,
    headless: Option<bool>,
    browser_debug_port: Option<u16>,
    chrome_executable: Option<PathBuf>,
    cookies_file: Option<PathBuf>,
    screenshots_dir: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    log_level: Option<String>,
}

impl Config {
    /// 只从环境变量加载
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 加载配置：默认值 → TOML 文件（存在时）→ 环境变量
    pub fn load(path: &Path) -> AppResult<Self> {
        let mut config = Self::default();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            let file: FileConfig = toml::from_str(&content).map_err(|e| {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?;
            config.apply_file(file);
        }
        Ok(config.with_env())
    }

    /// 取出登录凭据，缺一不可
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Credentials {
                    email: email.clone(),
                    password: password.clone(),
                })
            }
            _ => None,
        }
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.home_url {
            self.home_url = v;
        }
        if let Some(v) = file.login_url {
            self.login_url = v;
        }
        if file.email.is_some() {
            self.email = file.email;
        }
        if file.password.is_some() {
            self.password = file.password;
        }
        if let Some(v) = file.default_unit_size {
            self.default_unit_size = v;
        }
        if let Some(v) = file.max_unit_size {
            self.max_unit_size = v;
        }
        if let Some(v) = file.auto_place_bets {
            self.auto_place_bets = v;
        }
        if let Some(v) = file.page_load_timeout_secs {
            self.page_load_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.element_wait_timeout_secs {
            self.element_wait_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.submission_delay_secs {
            self.submission_delay = Duration::from_secs(v);
        }
        if let Some(v) = file.inter_bet_delay_secs {
            self.inter_bet_delay = Duration::from_secs(v);
        }
        if let Some(v) = file.screenshot_on_submission {
            self.screenshot_on_submission = v;
        }
        if let Some(v) = file.headless {
            self.headless = v;
        }
        if file.browser_debug_port.is_some() {
            self.browser_debug_port = file.browser_debug_port;
        }
        if file.chrome_executable.is_some() {
            self.chrome_executable = file.chrome_executable;
        }
        if let Some(v) = file.cookies_file {
            self.cookies_file = v;
        }
        if let Some(v) = file.screenshots_dir {
            self.screenshots_dir = v;
        }
        if let Some(v) = file.results_dir {
            self.results_dir = v;
        }
        if let Some(v) = file.log_level {
            self.log_level = v;
        }
    }

    fn with_env(self) -> Self {
        let d = self;
        Self {
            home_url: env_string("PRIZEPICKS_URL").unwrap_or(d.home_url),
            login_url: env_string("PRIZEPICKS_LOGIN_URL").unwrap_or(d.login_url),
            email: env_string("PRIZEPICKS_EMAIL").or(d.email),
            password: env_string("PRIZEPICKS_PASSWORD").or(d.password),
            default_unit_size: env_parse("DEFAULT_UNIT_SIZE").unwrap_or(d.default_unit_size),
            max_unit_size: env_parse("MAX_UNIT_SIZE").unwrap_or(d.max_unit_size),
            auto_place_bets: env_bool("AUTO_PLACE_BETS").unwrap_or(d.auto_place_bets),
            page_load_timeout: env_secs("PAGE_LOAD_TIMEOUT").unwrap_or(d.page_load_timeout),
            element_wait_timeout: env_secs("ELEMENT_WAIT_TIMEOUT")
                .unwrap_or(d.element_wait_timeout),
            navigation_settle_delay: d.navigation_settle_delay,
            unit_settle_delay: d.unit_settle_delay,
            submission_delay: env_secs("SUBMISSION_DELAY").unwrap_or(d.submission_delay),
            inter_bet_delay: env_secs("INTER_BET_DELAY").unwrap_or(d.inter_bet_delay),
            poll_interval: d.poll_interval,
            screenshot_on_submission: env_bool("SCREENSHOT_ON_SUBMISSION")
                .unwrap_or(d.screenshot_on_submission),
            headless: env_bool("HEADLESS").unwrap_or(d.headless),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").or(d.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE")
                .map(PathBuf::from)
                .or(d.chrome_executable),
            cookies_file: env_string("COOKIES_FILE")
                .map(PathBuf::from)
                .unwrap_or(d.cookies_file),
            screenshots_dir: env_string("SCREENSHOTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.screenshots_dir),
            results_dir: env_string("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.results_dir),
            log_level: env_string("LOG_LEVEL").unwrap_or(d.log_level),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn env_bool(name: &str) -> Option<bool> {
    env_string(name).and_then(|v| parse_bool(&v))
}
