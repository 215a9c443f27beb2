use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器环境错误（进程级致命）
    #[error("环境错误: {0}")]
    Environment(#[from] EnvironmentError),
    /// 登录错误
    #[error("登录错误: {0}")]
    Authentication(#[from] AuthenticationError),
    /// 导航错误
    #[error("导航错误: {0}")]
    Navigation(#[from] NavigationError),
    /// 投注单校验错误
    #[error("校验错误: {0}")]
    Verification(#[from] VerificationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器环境错误
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 浏览器已关闭
    #[error("浏览器会话已关闭")]
    SessionClosed,
}

/// 登录错误
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// 缺少账号或密码
    #[error("缺少登录凭据")]
    MissingCredentials,
    /// 登录表单字段未找到
    #[error("登录表单字段未找到: {field}")]
    FieldNotFound { field: String },
    /// 等待登录状态超时
    #[error("等待登录状态超时 ({timeout_secs} 秒)")]
    Timeout { timeout_secs: u64 },
    /// 浏览器操作失败
    #[error("登录过程中浏览器操作失败: {source}")]
    Browser {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 导航错误
#[derive(Debug, Error)]
pub enum NavigationError {
    /// 链接未通过校验
    #[error("链接无效: {url}")]
    InvalidLink { url: String },
    /// 页面加载超时
    #[error("页面加载超时: {url}")]
    Timeout { url: String },
    /// 页面加载失败
    #[error("导航到 {url} 失败: {message}")]
    LoadFailed { url: String, message: String },
    /// 落地页是错误页
    #[error("落地页为错误页 (标题: {title:?}, URL: {current_url:?})")]
    ErrorPage { title: String, current_url: String },
}

impl NavigationError {
    /// 写入结果记录的失败分类
    pub fn reason(&self) -> &'static str {
        match self {
            NavigationError::InvalidLink { .. } => "invalid link",
            _ => "navigation",
        }
    }
}

/// 投注单校验错误
#[derive(Debug, Error)]
pub enum VerificationError {
    /// 投注单未填充
    #[error("投注单未填充: 缺少 {element}")]
    SlipNotPopulated { element: String },
    /// 注额输入框未找到
    #[error("注额输入框未找到")]
    UnitInputMissing,
    /// 注额未生效
    #[error("注额未生效 (期望: {expected}, 实际: {actual:?})")]
    UnitSizeNotApplied { expected: u32, actual: String },
    /// 提交按钮缺失
    #[error("提交按钮缺失")]
    SubmitControlMissing,
}

impl VerificationError {
    /// 写入结果记录的失败分类
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationError::SlipNotPopulated { .. } => "slip not populated",
            VerificationError::UnitInputMissing | VerificationError::UnitSizeNotApplied { .. } => {
                "unit size not applied"
            }
            VerificationError::SubmitControlMissing => "submit control missing",
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {name} 不合法: {message}")]
    InvalidValue { name: String, message: String },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Navigation(NavigationError::LoadFailed {
            url: String::new(),
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器启动错误
    pub fn launch_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        AppError::Environment(EnvironmentError::LaunchFailed {
            source: source.into(),
        })
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Environment(EnvironmentError::ConnectionFailed {
            port,
            source: source.into(),
        })
    }

    /// 创建登录过程中的浏览器错误
    pub fn auth_browser_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        AppError::Authentication(AuthenticationError::Browser {
            source: source.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
