//! 行情数据模型
//!
//! 定义三个市场统一的行情记录结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 市场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    /// A 股
    CN,
    /// 港股
    HK,
    /// 美股
    US,
}

impl Market {
    /// 合并顺序固定为 CN、HK、US
    pub const ALL: [Market; 3] = [Market::CN, Market::HK, Market::US];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::CN => "CN",
            Market::HK => "HK",
            Market::US => "US",
        }
    }

    /// 中文显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Market::CN => "A 股",
            Market::HK => "港股",
            Market::US => "美股",
        }
    }

    /// 分市场数据文件名，如 stocks-cn.json
    pub fn artifact_name(&self) -> String {
        format!("stocks-{}.json", self.as_str().to_lowercase())
    }

    /// 从 symbol 前缀解析市场，如 "HK:00700" -> HK
    pub fn from_symbol(symbol: &str) -> Option<Market> {
        let (prefix, _) = symbol.split_once(':')?;
        match prefix {
            "CN" => Some(Market::CN),
            "HK" => Some(Market::HK),
            "US" => Some(Market::US),
            _ => None,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单只股票的行情快照
///
/// `market` 不写入 JSON，由 symbol 前缀推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    /// 全局唯一键，格式 `{MARKET}:{code}`
    pub symbol: String,
    /// 市场内代码（A 股数字代码 / 港股 5 位代码 / 美股 ticker）
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 中文名称，仅港股
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,
    /// 最新价
    pub price: f64,
    /// 昨收价，未知时为 0
    pub prev_close: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_pct: f64,
}

impl StockQuote {
    pub fn market(&self) -> Option<Market> {
        Market::from_symbol(&self.symbol)
    }
}

/// 单个市场一次抓取得到的行情列表
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBatch {
    pub market: Market,
    pub stocks: Vec<StockQuote>,
}

impl MarketBatch {
    pub fn new(market: Market, stocks: Vec<StockQuote>) -> Self {
        Self { market, stocks }
    }

    pub fn empty(market: Market) -> Self {
        Self::new(market, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}
