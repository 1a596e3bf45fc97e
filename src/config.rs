//! 配置模块
//!
//! 支持从 JSON 文件加载抓取配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::common::DEFAULT_USER_AGENT;

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 数据文件输出目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// HTTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 抓取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// 新浪分页接口每页条数
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// 东方财富分页接口每页条数
    #[serde(default = "default_eastmoney_page_size")]
    pub eastmoney_page_size: usize,
    /// 分页上限，防止接口异常时无限翻页
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// 港股逐只查询的并发数
    #[serde(default = "default_hk_concurrency")]
    pub hk_concurrency: usize,
    /// 港股逐只查询每隔多少只打印一次进度
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_output_dir() -> PathBuf { PathBuf::from("public/data") }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_page_size() -> usize { 80 }
fn default_eastmoney_page_size() -> usize { 100 }
fn default_max_pages() -> usize { 200 }
fn default_hk_concurrency() -> usize { 8 }
fn default_progress_every() -> usize { 50 }
fn default_log_level() -> String { "info".to_string() }

impl LogConfig {
    /// 解析日志级别，无法识别时返回 `None`
    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.level.trim().parse().ok()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            eastmoney_page_size: default_eastmoney_page_size(),
            max_pages: default_max_pages(),
            hk_concurrency: default_hk_concurrency(),
            progress_every: default_progress_every(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"output":{"dir":"/tmp/out"},"fetch":{"hk_concurrency":2}}"#)
                .unwrap();

        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.fetch.hk_concurrency, 2);
        assert_eq!(config.fetch.page_size, 80);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"http":{"timeout_secs":5},"log":{"level":"debug"}}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.output.dir, PathBuf::from("public/data"));
    }

    #[test]
    fn test_log_level_filter() {
        let level = |s: &str| LogConfig { level: s.to_string() }.level_filter();
        assert_eq!(level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(level(" WARN "), Some(log::LevelFilter::Warn));
        assert_eq!(level("off"), Some(log::LevelFilter::Off));
        assert_eq!(level("verbose"), None);
    }
}
