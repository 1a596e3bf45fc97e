//! 测试用内存数据源

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

use crate::errors::ProviderError;
use crate::models::Market;

use super::provider::{FieldMap, QuoteProvider, RawRow, SymbolLookup};

pub static FAKE_FIELDS: FieldMap = FieldMap {
    code: "code",
    name: "name",
    name_cn: None,
    price: &["price"],
    prev_close: &["prev_close"],
    uppercase_code: false,
    round_prices: false,
};

pub static FAKE_LOOKUP_FIELDS: FieldMap = FieldMap {
    code: "code",
    name: "shortName",
    name_cn: Some("longName"),
    price: &["regularMarketPrice"],
    prev_close: &["previousClose"],
    uppercase_code: false,
    round_prices: true,
};

/// 构造一行原始数据
pub fn raw_row(code: &str, name: &str, price: f64, prev_close: f64) -> RawRow {
    json!({"code": code, "name": name, "price": price, "prev_close": prev_close})
        .as_object()
        .unwrap()
        .clone()
}

/// 返回固定数据行的数据源；`rows` 为 `None` 时模拟网络失败
pub struct FakeProvider {
    pub id: &'static str,
    pub market: Market,
    pub rows: Option<Vec<RawRow>>,
}

impl FakeProvider {
    pub fn ok(id: &'static str, market: Market, rows: Vec<RawRow>) -> Self {
        Self {
            id,
            market,
            rows: Some(rows),
        }
    }

    pub fn failing(id: &'static str, market: Market) -> Self {
        Self {
            id,
            market,
            rows: None,
        }
    }
}

#[async_trait]
impl QuoteProvider for FakeProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn market(&self) -> Market {
        self.market
    }

    fn fields(&self) -> &'static FieldMap {
        &FAKE_FIELDS
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        self.rows
            .clone()
            .ok_or_else(|| ProviderError::parse(self.id, "connection reset"))
    }
}

/// 内存中的逐只查询，未登记的代码返回错误
pub struct FakeLookup {
    prices: HashMap<String, f64>,
}

impl FakeLookup {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(c, p)| (c.to_string(), *p)).collect(),
        }
    }
}

#[async_trait]
impl SymbolLookup for FakeLookup {
    fn id(&self) -> &'static str {
        "FAKE_LOOKUP"
    }

    fn fields(&self) -> &'static FieldMap {
        &FAKE_LOOKUP_FIELDS
    }

    async fn lookup(&self, code: &str) -> Result<RawRow, ProviderError> {
        let price = self
            .prices
            .get(code)
            .ok_or_else(|| ProviderError::parse("FAKE_LOOKUP", format!("{} not found", code)))?;
        let row = json!({
            "code": code,
            "shortName": format!("NAME{}", code),
            "longName": format!("LONG{}", code),
            "regularMarketPrice": price,
            "previousClose": 10.0,
        });
        Ok(row.as_object().unwrap().clone())
    }
}
