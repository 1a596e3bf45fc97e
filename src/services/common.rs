//! 公共常量和辅助函数

use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::HttpConfig;

// ==================== 新浪财经 API 常量 ====================

/// 新浪 A 股分页行情 API
pub const SINA_CN_SPOT_API: &str =
    "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/Market_Center.getHQNodeData";
/// 新浪港股分页行情 API
pub const SINA_HK_SPOT_API: &str =
    "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/Market_Center.getHKStockData";
/// 新浪美股列表 API（JSONP）
pub const SINA_US_SPOT_API: &str = "https://stock.finance.sina.com.cn/usstock/api/jsonp.php/IO.XSRV2.CallbackList['fTqwkKCPQrXbqxwO']/US_CategoryService.getList";
/// 新浪请求需要带的 Referer
pub const SINA_REFERER: &str = "https://finance.sina.com.cn/";

// ==================== 其他数据源常量 ====================

/// 东方财富美股列表 API
pub const EASTMONEY_US_SPOT_API: &str = "https://72.push2.eastmoney.com/api/qt/clist/get";
/// 东方财富美股市场过滤：NASDAQ / NYSE / AMEX
pub const EASTMONEY_US_MARKETS: &str = "m:105,m:106,m:107";
/// Yahoo Finance 单只行情 API
pub const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 按配置创建共享 HTTP 客户端
pub fn build_http_client(config: &HttpConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(config.user_agent.clone())
        .gzip(true)
        .build()
}

/// 新浪接口返回 GBK 编码
pub fn decode_gbk(bytes: &[u8]) -> String {
    encoding_rs::GBK.decode(bytes).0.into_owned()
}

/// 响应体解码：优先按 UTF-8，失败再按 GBK
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_gbk(bytes),
    }
}

/// 去掉 JSONP 包裹，返回最外层 `(...)` 中的内容
///
/// 如 `IO.XSRV2.CallbackList['x'](({"count":"1","data":[...]}));`
pub fn strip_jsonp(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed);
    }

    // 跳过回调名中的 ['...']，从第一个 '(' 开始
    let start = trimmed.find('(')?;
    let end = trimmed.rfind(')')?;
    if end <= start {
        return None;
    }

    let mut inner = trimmed[start + 1..end].trim();
    while inner.starts_with('(') && inner.ends_with(')') {
        inner = inner[1..inner.len() - 1].trim();
    }
    Some(inner)
}

fn js_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([{,])\s*([A-Za-z_][A-Za-z0-9_]*)\s*:"#).unwrap())
}

/// 解析新浪返回的 JSON；部分接口返回未加引号的 JS 对象字面量，需要先补全引号
///
/// 例: `[{symbol:"00700",name:"腾讯控股"}]`
pub fn parse_sina_json(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) => {
            let fixed = js_key_regex().replace_all(text, r#"$1"$2":"#);
            serde_json::from_str(&fixed).map_err(|_| e)
        }
    }
}

/// 将单元格转为数字：数字、数字字符串按值解析，"-"、空值等一律视为 0
pub fn value_to_f64(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// 将单元格转为字符串，数字代码也会转成字符串
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
