//! 东方财富美股行情接口
//!
//! 对应 akshare 的 stock_us_spot_em，字段含义：
//! f2 最新价 / f12 代码 / f14 名称 / f18 昨收

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::FetchConfig;
use crate::errors::ProviderError;
use crate::models::Market;
use crate::services::common::{EASTMONEY_US_MARKETS, EASTMONEY_US_SPOT_API};
use crate::services::provider::{FieldMap, QuoteProvider, RawRow};

pub static EASTMONEY_US_FIELDS: FieldMap = FieldMap {
    code: "f12",
    name: "f14",
    name_cn: None,
    price: &["f2"],
    prev_close: &["f18"],
    uppercase_code: false,
    round_prices: false,
};

const PROVIDER: &str = "EASTMONEY_US";

/// 解析一页 clist 响应，返回 (总条数, 数据行)
///
/// 页码超出范围时 data 为 null，返回空列表
fn parse_clist_page(text: &str) -> Result<(usize, Vec<RawRow>), ProviderError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ProviderError::parse(PROVIDER, format!("解析JSON失败: {}", e)))?;

    let data = match value.get("data") {
        Some(Value::Object(data)) => data,
        Some(Value::Null) | None => return Ok((0, Vec::new())),
        Some(_) => return Err(ProviderError::parse(PROVIDER, "data 字段格式异常")),
    };

    let total = data.get("total").and_then(Value::as_u64).unwrap_or(0) as usize;

    // np=1 时 diff 为数组，否则为 {"0": {...}, "1": {...}}
    let rows = match data.get("diff") {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        Some(Value::Object(map)) => map
            .values()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    };

    Ok((total, rows))
}

/// 东方财富美股行情
pub struct EastmoneyUsProvider {
    client: Client,
    fetch: FetchConfig,
}

impl EastmoneyUsProvider {
    pub fn new(client: Client, fetch: FetchConfig) -> Self {
        Self { client, fetch }
    }

    async fn fetch_page(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<(usize, Vec<RawRow>), ProviderError> {
        let pn = page.to_string();
        let pz = page_size.to_string();

        let response = self
            .client
            .get(EASTMONEY_US_SPOT_API)
            .query(&[
                ("pn", pn.as_str()),
                ("pz", pz.as_str()),
                ("po", "1"),
                ("np", "1"),
                ("ut", "bd1d9ddb04089700cf9c27f6f7426281"),
                ("fltt", "2"),
                ("invt", "2"),
                ("fid", "f12"),
                ("fs", EASTMONEY_US_MARKETS),
                ("fields", "f2,f12,f14,f18"),
            ])
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
        parse_clist_page(&text)
    }
}

#[async_trait]
impl QuoteProvider for EastmoneyUsProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn market(&self) -> Market {
        Market::US
    }

    fn fields(&self) -> &'static FieldMap {
        &EASTMONEY_US_FIELDS
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        let page_size = self.fetch.eastmoney_page_size.max(1);
        let (total, mut rows) = self.fetch_page(1, page_size).await?;

        let pages = total.div_ceil(page_size).min(self.fetch.max_pages);
        log::info!("{} 共 {} 条，{} 页", PROVIDER, total, pages);

        for page in 2..=pages {
            let (_, page_rows) = self.fetch_page(page, page_size).await?;
            if page_rows.is_empty() {
                break;
            }
            rows.extend(page_rows);
        }

        Ok(rows)
    }
}
