//! 错误类型
//!
//! - [`ProviderError`]: 单个数据源整体抓取失败，触发降级到下一个数据源
//! - [`PipelineError`]: 数据文件读写失败，其中缺少历史数据文件是唯一致命错误

use std::path::PathBuf;
use thiserror::Error;

/// 数据源抓取失败
///
/// 单行数据异常不会产生该错误，只在整个数据源不可用时返回
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 网络请求失败（超时、连接错误、响应体读取失败）
    #[error("网络请求失败: {provider} - {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 状态码非 2xx
    #[error("请求失败: {provider} - HTTP {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },

    /// 响应内容无法解析
    #[error("解析响应失败: {provider} - {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    /// 数据源没有返回任何数据行
    #[error("数据源返回空结果: {provider}")]
    Empty { provider: &'static str },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Network { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Parse { provider, .. }
            | ProviderError::Empty { provider } => *provider,
        }
    }

    pub fn parse(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Parse {
            provider,
            message: message.into(),
        }
    }
}

/// 数据文件相关错误
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 港股增量更新需要已发布的 A 股 / 美股数据文件
    #[error("缺少已发布的数据文件: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("读写数据文件失败 {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("数据文件格式错误 {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 输入无法识别为任何市场的股票代码
    #[error("无法识别的股票代码: {input}")]
    IndexKey { input: String },
}
