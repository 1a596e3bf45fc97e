//! 合并结果与数据文件模型
//!
//! 对应输出目录下的 stocks.json / stocks-index.json / stocks-{market}.json

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::quote::StockQuote;

/// 各市场数量统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketCounts {
    #[serde(rename = "CN")]
    pub cn: usize,
    #[serde(rename = "HK")]
    pub hk: usize,
    #[serde(rename = "US")]
    pub us: usize,
    pub total: usize,
}

/// 本次运行的元数据，每次运行重新生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub updated_at: DateTime<Utc>,
    pub counts: MarketCounts,
}

/// 合并后的全市场数据
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub metadata: RunMetadata,
    /// 按 CN、HK、US 顺序拼接
    pub stocks: Vec<StockQuote>,
    /// symbol -> 行情，重复 symbol 以后出现的为准
    pub index: BTreeMap<String, StockQuote>,
}

/// stocks.json
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogArtifact {
    pub metadata: RunMetadata,
    pub stocks: Vec<StockQuote>,
}

/// stocks-index.json
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub metadata: RunMetadata,
    pub index: BTreeMap<String, StockQuote>,
}

/// 分市场文件的元数据，只有数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    pub updated_at: DateTime<Utc>,
    pub count: usize,
}

/// stocks-cn.json / stocks-hk.json / stocks-us.json
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketArtifact {
    pub metadata: MarketMetadata,
    pub stocks: Vec<StockQuote>,
}
