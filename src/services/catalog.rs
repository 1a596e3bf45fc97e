//! 合并各市场批次并建立索引

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::{Catalog, Market, MarketBatch, MarketCounts, RunMetadata, StockQuote};

/// 合并最多三个市场的批次
///
/// 拼接顺序固定为 CN、HK、US，与传入顺序无关；缺失的市场按空批次处理。
/// 索引按拼接顺序逐条写入，symbol 重复时后写入的覆盖先写入的。
pub fn build_catalog(batches: &[MarketBatch], updated_at: DateTime<Utc>) -> Catalog {
    let mut stocks: Vec<StockQuote> = Vec::new();
    let mut counts = MarketCounts::default();

    for market in Market::ALL {
        for batch in batches.iter().filter(|b| b.market == market) {
            stocks.extend(batch.stocks.iter().cloned());
            match market {
                Market::CN => counts.cn += batch.len(),
                Market::HK => counts.hk += batch.len(),
                Market::US => counts.us += batch.len(),
            }
        }
    }
    counts.total = stocks.len();

    let index = build_index(&stocks);
    if index.len() < stocks.len() {
        log::warn!("存在重复代码: {} 条记录合并为 {} 个索引", stocks.len(), index.len());
    }

    Catalog {
        metadata: RunMetadata { updated_at, counts },
        stocks,
        index,
    }
}

/// symbol -> 行情
pub fn build_index(stocks: &[StockQuote]) -> BTreeMap<String, StockQuote> {
    stocks
        .iter()
        .map(|s| (s.symbol.clone(), s.clone()))
        .collect()
}
