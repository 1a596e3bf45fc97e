//! 新浪财经行情列表接口
//!
//! - A 股: Market_Center.getHQNodeData（对应 akshare 的 stock_zh_a_spot）
//! - 港股: Market_Center.getHKStockData（对应 akshare 的 stock_hk_spot）
//! - 美股: US_CategoryService.getList（对应 akshare 的 stock_us_spot）

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::FetchConfig;
use crate::errors::ProviderError;
use crate::models::Market;
use crate::services::common::{
    decode_body, parse_sina_json, strip_jsonp, value_to_string, SINA_CN_SPOT_API,
    SINA_HK_SPOT_API, SINA_REFERER, SINA_US_SPOT_API,
};
use crate::services::normalize::normalize_code;
use crate::services::provider::{FieldMap, QuoteProvider, RawRow, SymbolUniverse};

const SINA_CN: &str = "SINA_CN";
const SINA_HK: &str = "SINA_HK";
const SINA_US: &str = "SINA_US";

pub static SINA_CN_FIELDS: FieldMap = FieldMap {
    code: "code",
    name: "name",
    name_cn: None,
    price: &["trade"],
    prev_close: &["settlement"],
    uppercase_code: false,
    round_prices: false,
};

pub static SINA_HK_FIELDS: FieldMap = FieldMap {
    code: "symbol",
    name: "name",
    name_cn: Some("engname"),
    price: &["lasttrade"],
    prev_close: &["prevclose"],
    uppercase_code: false,
    round_prices: false,
};

pub static SINA_US_FIELDS: FieldMap = FieldMap {
    code: "symbol",
    name: "cname",
    name_cn: None,
    price: &["price"],
    prev_close: &["preclose"],
    uppercase_code: true,
    round_prices: false,
};

/// 一页新浪数据的响应格式
#[derive(Debug, Clone, Copy)]
enum PageFormat {
    /// 直接返回数组（可能是未加引号的 JS 字面量）
    Array,
    /// JSONP 包裹的 `{"count": .., "data": [...]}`
    JsonpData,
}

/// 解析一页响应为原始数据行
fn parse_page(
    provider: &'static str,
    text: &str,
    format: PageFormat,
) -> Result<Vec<RawRow>, ProviderError> {
    let trimmed = text.trim();
    // 翻页超出范围时新浪返回 null 或空串
    if trimmed.is_empty() || trimmed == "null" || trimmed == "[]" {
        return Ok(Vec::new());
    }

    let body = match format {
        PageFormat::Array => trimmed,
        PageFormat::JsonpData => {
            strip_jsonp(trimmed).ok_or_else(|| ProviderError::parse(provider, "无效的 JSONP 数据"))?
        }
    };

    let value = parse_sina_json(body)
        .map_err(|e| ProviderError::parse(provider, format!("解析JSON失败: {}", e)))?;

    let items = match format {
        PageFormat::Array => value,
        PageFormat::JsonpData => value.get("data").cloned().unwrap_or(Value::Null),
    };

    match items {
        Value::Array(arr) => Ok(arr
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(ProviderError::parse(
            provider,
            format!("数据格式异常: {}", other.to_string().chars().take(100).collect::<String>()),
        )),
    }
}

/// 逐页拉取，遇到空页或不足一页时停止
async fn fetch_pages(
    client: &Client,
    provider: &'static str,
    url: &str,
    params: &[(&str, &str)],
    format: PageFormat,
    fetch: &FetchConfig,
) -> Result<Vec<RawRow>, ProviderError> {
    let page_size = fetch.page_size.max(1);
    let num = page_size.to_string();
    let mut rows = Vec::new();

    for page in 1..=fetch.max_pages {
        let page_str = page.to_string();
        let response = client
            .get(url)
            .query(params)
            .query(&[("page", page_str.as_str()), ("num", num.as_str())])
            .header("Referer", SINA_REFERER)
            .send()
            .await
            .map_err(|source| ProviderError::Network { provider, source })?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider,
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ProviderError::Network { provider, source })?;
        let page_rows = parse_page(provider, &decode_body(&bytes), format)?;
        log::debug!("{} 第 {} 页 {} 行", provider, page, page_rows.len());

        let count = page_rows.len();
        rows.extend(page_rows);
        if count < page_size {
            break;
        }
    }

    Ok(rows)
}

/// 新浪 A 股行情
pub struct SinaCnProvider {
    client: Client,
    fetch: FetchConfig,
}

impl SinaCnProvider {
    pub fn new(client: Client, fetch: FetchConfig) -> Self {
        Self { client, fetch }
    }
}

#[async_trait]
impl QuoteProvider for SinaCnProvider {
    fn id(&self) -> &'static str {
        SINA_CN
    }

    fn market(&self) -> Market {
        Market::CN
    }

    fn fields(&self) -> &'static FieldMap {
        &SINA_CN_FIELDS
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        let params = [
            ("node", "hs_a"),
            ("sort", "symbol"),
            ("asc", "1"),
            ("symbol", ""),
            ("_s_r_a", "page"),
        ];
        fetch_pages(
            &self.client,
            SINA_CN,
            SINA_CN_SPOT_API,
            &params,
            PageFormat::Array,
            &self.fetch,
        )
        .await
    }
}

/// 新浪港股行情
pub struct SinaHkProvider {
    client: Client,
    fetch: FetchConfig,
}

impl SinaHkProvider {
    pub fn new(client: Client, fetch: FetchConfig) -> Self {
        Self { client, fetch }
    }
}

#[async_trait]
impl QuoteProvider for SinaHkProvider {
    fn id(&self) -> &'static str {
        SINA_HK
    }

    fn market(&self) -> Market {
        Market::HK
    }

    fn fields(&self) -> &'static FieldMap {
        &SINA_HK_FIELDS
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        let params = [("node", "qbgg_hk"), ("sort", "symbol"), ("asc", "1")];
        fetch_pages(
            &self.client,
            SINA_HK,
            SINA_HK_SPOT_API,
            &params,
            PageFormat::Array,
            &self.fetch,
        )
        .await
    }
}

/// 港股代码列表，供逐只查询使用
#[async_trait]
impl SymbolUniverse for SinaHkProvider {
    fn id(&self) -> &'static str {
        SINA_HK
    }

    async fn symbols(&self) -> Result<Vec<String>, ProviderError> {
        let rows = QuoteProvider::fetch_rows(self).await?;
        let symbols: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get(SINA_HK_FIELDS.code))
            .map(value_to_string)
            .filter(|code| !code.is_empty())
            .map(|code| normalize_code(Market::HK, &code, false))
            .collect();

        if symbols.is_empty() {
            return Err(ProviderError::Empty { provider: SINA_HK });
        }
        Ok(symbols)
    }
}

/// 新浪美股行情，速度较慢，作为东方财富的备用源
pub struct SinaUsProvider {
    client: Client,
    fetch: FetchConfig,
}

impl SinaUsProvider {
    pub fn new(client: Client, fetch: FetchConfig) -> Self {
        Self { client, fetch }
    }
}

#[async_trait]
impl QuoteProvider for SinaUsProvider {
    fn id(&self) -> &'static str {
        SINA_US
    }

    fn market(&self) -> Market {
        Market::US
    }

    fn fields(&self) -> &'static FieldMap {
        &SINA_US_FIELDS
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        let params = [("sort", ""), ("asc", "0"), ("market", ""), ("id", "")];
        fetch_pages(
            &self.client,
            SINA_US,
            SINA_US_SPOT_API,
            &params,
            PageFormat::JsonpData,
            &self.fetch,
        )
        .await
    }
}
