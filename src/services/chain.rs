//! 数据源降级链
//!
//! 每个市场按优先级依次尝试数据源，某个数据源返回 [`ProviderError`] 时切换到下一个，
//! 全部失败后使用静态兜底：A 股 / 美股为空批次，港股为常见代码列表逐只查询。
//! 数据源错误只记录日志，不向调用方返回。

use std::sync::Arc;

use crate::errors::ProviderError;
use crate::models::{Market, MarketBatch};

use super::batch_lookup::{lookup_rows, LookupOptions};
use super::provider::{map_rows, QuoteProvider, SymbolLookup};

/// 所有动态数据源都失败后的兜底方式
pub enum StaticFallback {
    /// 接受空批次
    Empty,
    /// 对固定代码列表逐只查询
    Lookup {
        codes: Vec<String>,
        lookup: Arc<dyn SymbolLookup>,
        options: LookupOptions,
    },
}

/// 批次来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    Provider(&'static str),
    Fallback,
}

/// 单个市场的抓取结果
#[derive(Debug)]
pub struct ChainOutcome {
    pub batch: MarketBatch,
    pub source: BatchSource,
    /// 依次失败的数据源
    pub failures: Vec<String>,
}

/// 降级状态
enum ChainState {
    Try(usize),
    UseStaticFallback,
    Done(MarketBatch, BatchSource),
}

/// 单个市场的数据源链
pub struct MarketChain {
    market: Market,
    providers: Vec<Box<dyn QuoteProvider>>,
    fallback: StaticFallback,
}

impl MarketChain {
    pub fn new(market: Market) -> Self {
        Self {
            market,
            providers: Vec::new(),
            fallback: StaticFallback::Empty,
        }
    }

    /// 追加一个数据源，先加入的优先级高
    pub fn with_provider(mut self, provider: impl QuoteProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_fallback(mut self, fallback: StaticFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn market(&self) -> Market {
        self.market
    }

    /// 依次尝试各数据源，必要时走兜底，总能得到一个批次
    pub async fn run(&self) -> ChainOutcome {
        let mut failures = Vec::new();
        let mut state = ChainState::Try(0);

        loop {
            state = match state {
                ChainState::Try(i) if i < self.providers.len() => {
                    let provider = &self.providers[i];
                    log::info!("抓取{} ({})", self.market.display_name(), provider.id());

                    match provider.fetch_batch().await {
                        Ok(batch) => ChainState::Done(batch, BatchSource::Provider(provider.id())),
                        Err(e) => {
                            self.log_failure(&e, i + 1 < self.providers.len());
                            failures.push(e.to_string());
                            ChainState::Try(i + 1)
                        }
                    }
                }
                ChainState::Try(_) => ChainState::UseStaticFallback,
                ChainState::UseStaticFallback => {
                    let batch = self.run_fallback().await;
                    ChainState::Done(batch, BatchSource::Fallback)
                }
                ChainState::Done(batch, source) => {
                    if batch.is_empty() {
                        log::warn!("{} 没有可用数据，本次以空批次继续", self.market.display_name());
                    }
                    return ChainOutcome {
                        batch,
                        source,
                        failures,
                    };
                }
            };
        }
    }

    fn log_failure(&self, error: &ProviderError, has_next: bool) {
        if has_next {
            log::warn!("{} 源失败: {}，尝试下一个数据源", error.provider(), error);
        } else {
            log::warn!("{} 源失败: {}", error.provider(), error);
        }
    }

    async fn run_fallback(&self) -> MarketBatch {
        match &self.fallback {
            StaticFallback::Empty => {
                log::warn!("{} 所有数据源均失败，返回空列表", self.market.display_name());
                MarketBatch::empty(self.market)
            }
            StaticFallback::Lookup {
                codes,
                lookup,
                options,
            } => {
                log::warn!(
                    "{} 所有数据源均失败，使用备用代码列表 ({} 只) 逐只查询",
                    self.market.display_name(),
                    codes.len()
                );
                let rows = lookup_rows(lookup.as_ref(), codes, *options).await;
                let (batch, skipped) = map_rows(self.market, lookup.fields(), &rows);
                log::info!("{} 备用查询有效 {} 只，跳过 {} 行", lookup.id(), batch.len(), skipped);
                batch
            }
        }
    }
}
