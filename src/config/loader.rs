use crate::config::types::Settings;
use crate::error::CurlwrapError;
use crate::Result;
use crate::variable::VariableResolver;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "curlwrap.toml";
    /// 覆盖 cookie 目录的环境变量
    pub const COOKIE_DIR_ENV: &'static str = "CURLWRAP_COOKIE_DIR";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CurlwrapError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let settings: Settings = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.as_ref().display());
        Ok(Self::resolve(settings))
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/curlwrap/
    ///
    /// 找不到时返回默认配置
    pub fn find_and_load() -> Result<Settings> {
        let settings = match Self::find_config_file() {
            Some(path) => Self::load_from_path(path)?,
            None => Settings::default(),
        };
        Ok(Self::apply_env(settings))
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            // 尝试父目录
            if !current.pop() {
                break;
            }
        }

        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("curlwrap").join(Self::CONFIG_FILE);
        config_path.exists().then_some(config_path)
    }

    /// 解析字符串字段中的 ${VAR}
    fn resolve(mut settings: Settings) -> Settings {
        settings.curl_path = VariableResolver::resolve_env_vars(&settings.curl_path);
        settings.proxy = settings
            .proxy
            .map(|p| VariableResolver::resolve_env_vars(&p))
            .filter(|p| !p.trim().is_empty());
        settings
    }

    /// 环境变量优先于配置文件
    fn apply_env(mut settings: Settings) -> Settings {
        if let Ok(dir) = std::env::var(Self::COOKIE_DIR_ENV)
            && !dir.is_empty()
        {
            settings.cookie_dir = PathBuf::from(dir);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_path() {
        let config_content = r#"
curl_path = "/opt/curl/bin/curl"
timeout_secs = 20
retries = 1
cookie_dir = "/tmp/curlwrap-cookies"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let settings = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(settings.curl_path, "/opt/curl/bin/curl");
        assert_eq!(settings.timeout_secs, 20);
        assert_eq!(settings.retries, 1);
        assert_eq!(settings.cookie_dir, PathBuf::from("/tmp/curlwrap-cookies"));
    }

    #[test]
    fn test_proxy_env_reference() {
        unsafe {
            std::env::set_var("CURLWRAP_LOADER_TEST_PROXY", "127.0.0.1:8888");
        }

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"proxy = "${CURLWRAP_LOADER_TEST_PROXY}""#)
            .unwrap();
        temp_file.flush().unwrap();

        let settings = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(settings.proxy.as_deref(), Some("127.0.0.1:8888"));

        unsafe {
            std::env::remove_var("CURLWRAP_LOADER_TEST_PROXY");
        }
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"timeout_secs = \"soon\"").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, CurlwrapError::TomlError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_path("/nonexistent/curlwrap.toml").unwrap_err();
        assert!(matches!(err, CurlwrapError::ConfigError(_)));
    }
}
