use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurlwrapError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("未知的承运商: {0}")]
    UnknownCarrier(String),

    #[error("验证码链接缺失，下载链接可能已过期: {0}")]
    CaptchaExpired(String),

    #[error("验证码输入失败: {0}")]
    CaptchaInput(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML 解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for CurlwrapError {
    fn from(err: anyhow::Error) -> Self {
        CurlwrapError::Other(err.to_string())
    }
}

impl From<inquire::InquireError> for CurlwrapError {
    fn from(err: inquire::InquireError) -> Self {
        CurlwrapError::CaptchaInput(err.to_string())
    }
}

/// Result type for curlwrap crate
pub type Result<T> = std::result::Result<T, CurlwrapError>;
