//! 数据源抽象
//!
//! 每个 (市场, 数据源) 对应一个 [`QuoteProvider`]。数据源只负责拿到原始数据行，
//! 字段映射由固定的 [`FieldMap`] 表完成，过滤与涨跌计算在 [`map_row`] 中统一处理。

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ProviderError;
use crate::models::{Market, MarketBatch, StockQuote};

use super::common::{value_to_f64, value_to_string};
use super::normalize::{derive_change, make_symbol, normalize_code, round2};

/// 数据源原始数据行，保留数据源自己的字段名
pub type RawRow = Map<String, Value>;

/// 数据源字段映射表
///
/// 价格字段可配置多个候选，取第一个非 0 的值
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub code: &'static str,
    pub name: &'static str,
    pub name_cn: Option<&'static str>,
    pub price: &'static [&'static str],
    pub prev_close: &'static [&'static str],
    /// 代码取自名称类字段时需要转大写
    pub uppercase_code: bool,
    /// 价格和昨收先保留两位小数再计算
    pub round_prices: bool,
}

fn first_nonzero(row: &RawRow, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .map(value_to_f64)
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

/// 将一行原始数据映射为行情记录
///
/// 代码为空或价格（保留两位后）为 0 的行返回 `None`，不视为错误
pub fn map_row(market: Market, fields: &FieldMap, row: &RawRow) -> Option<StockQuote> {
    let raw_code = row.get(fields.code).map(value_to_string).unwrap_or_default();
    if raw_code.is_empty() {
        return None;
    }

    let mut price = first_nonzero(row, fields.price);
    let mut prev_close = first_nonzero(row, fields.prev_close);
    if round2(price) == 0.0 {
        return None;
    }
    if fields.round_prices {
        price = round2(price);
        prev_close = round2(prev_close);
    }

    let code = normalize_code(market, &raw_code, fields.uppercase_code);
    let (change, change_pct) = derive_change(price, prev_close);

    Some(StockQuote {
        symbol: make_symbol(market, &code),
        code,
        name: row.get(fields.name).map(value_to_string).unwrap_or_default(),
        name_cn: fields
            .name_cn
            .map(|key| row.get(key).map(value_to_string).unwrap_or_default()),
        price,
        prev_close,
        change,
        change_pct,
    })
}

/// 映射整批数据行，返回批次和被跳过的行数
pub fn map_rows(market: Market, fields: &FieldMap, rows: &[RawRow]) -> (MarketBatch, usize) {
    let stocks: Vec<StockQuote> = rows
        .iter()
        .filter_map(|row| map_row(market, fields, row))
        .collect();
    let skipped = rows.len() - stocks.len();
    (MarketBatch::new(market, stocks), skipped)
}

/// 批量行情数据源
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 数据源标识，如 "SINA_CN"
    fn id(&self) -> &'static str;

    fn market(&self) -> Market;

    fn fields(&self) -> &'static FieldMap;

    /// 拉取原始数据行
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError>;

    /// 拉取并规范化为一个市场批次
    ///
    /// 原始数据为空视为失败；有数据但全部被过滤则返回空批次
    async fn fetch_batch(&self) -> Result<MarketBatch, ProviderError> {
        let rows = self.fetch_rows().await?;
        if rows.is_empty() {
            return Err(ProviderError::Empty { provider: self.id() });
        }

        let (batch, skipped) = map_rows(self.market(), self.fields(), &rows);
        log::info!(
            "{} 获取 {} 行，有效 {} 只，跳过 {} 行",
            self.id(),
            rows.len(),
            batch.len(),
            skipped
        );
        Ok(batch)
    }
}

/// 逐只查询行情的数据源（港股 Yahoo）
#[async_trait]
pub trait SymbolLookup: Send + Sync {
    fn id(&self) -> &'static str;

    fn fields(&self) -> &'static FieldMap;

    /// 查询单只股票，返回原始数据行
    async fn lookup(&self, code: &str) -> Result<RawRow, ProviderError>;
}

/// 只提供代码列表的数据源
#[async_trait]
pub trait SymbolUniverse: Send + Sync {
    fn id(&self) -> &'static str;

    async fn symbols(&self) -> Result<Vec<String>, ProviderError>;
}
