//! Yahoo Finance 港股逐只行情
//!
//! 对接 https://query1.finance.yahoo.com/v8/finance/chart/{ticker}，
//! 取 chart.result[0].meta 作为原始数据行

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::services::common::YAHOO_CHART_API;
use crate::services::provider::{FieldMap, RawRow, SymbolLookup};

pub static YAHOO_HK_FIELDS: FieldMap = FieldMap {
    code: "code",
    name: "shortName",
    name_cn: Some("longName"),
    price: &["regularMarketPrice", "currentPrice"],
    prev_close: &["regularMarketPreviousClose", "previousClose", "chartPreviousClose"],
    uppercase_code: false,
    round_prices: true,
};

const PROVIDER: &str = "YAHOO_HK";

/// Yahoo 港股代码为 4 位，5 位代码去掉一个前导 0
///
/// 00700 -> 0700.HK，09988 -> 9988.HK
pub fn yahoo_ticker(code: &str) -> String {
    let code = code.trim();
    let code = if code.len() == 5 && code.starts_with('0') {
        &code[1..]
    } else {
        code
    };
    format!("{}.HK", code)
}

/// 从 chart 响应中取出 meta，并写入原始代码
fn parse_chart_meta(text: &str, code: &str) -> Result<RawRow, ProviderError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::parse(PROVIDER, format!("解析JSON失败: {}", e)))?;

    let chart = &value["chart"];
    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        return Err(ProviderError::parse(
            PROVIDER,
            format!("{} 查询失败: {}", code, error),
        ));
    }

    let mut meta = chart["result"][0]["meta"]
        .as_object()
        .cloned()
        .ok_or_else(|| ProviderError::parse(PROVIDER, format!("{} 缺少 meta 数据", code)))?;

    meta.insert("code".to_string(), Value::String(code.to_string()));
    Ok(meta)
}

/// Yahoo 港股单只查询
pub struct YahooHkLookup {
    client: Client,
}

impl YahooHkLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SymbolLookup for YahooHkLookup {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn fields(&self) -> &'static FieldMap {
        &YAHOO_HK_FIELDS
    }

    async fn lookup(&self, code: &str) -> Result<RawRow, ProviderError> {
        let url = format!("{}/{}", YAHOO_CHART_API, yahoo_ticker(code));

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|source| ProviderError::Network { provider: PROVIDER, source })?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: response.status(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ProviderError::Network { provider: PROVIDER, source })?;
        parse_chart_meta(&text, code)
    }
}
