use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// curlwrap.toml 的内容，所有字段都可省略
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// curl 可执行文件
    pub curl_path: String,
    /// 普通请求超时（秒），下载不受限制
    pub timeout_secs: u64,
    /// 超时或执行失败后的额外尝试次数
    pub retries: u32,
    /// cookie 缓存目录
    pub cookie_dir: PathBuf,
    /// cookie 缓存有效期（小时）
    pub cookie_max_age_hours: u64,
    /// host:port 形式的代理
    pub proxy: Option<String>,
    /// 下载文件保存目录
    pub download_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            curl_path: "curl".to_string(),
            timeout_secs: 8,
            retries: 0,
            cookie_dir: PathBuf::from("."),
            cookie_max_age_hours: 24,
            proxy: None,
            download_dir: None,
        }
    }
}

impl Settings {
    /// cookie 缓存有效期，超大配置值截断到 u64::MAX 秒
    pub fn cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.cookie_max_age_hours.saturating_mul(60 * 60))
    }
}
