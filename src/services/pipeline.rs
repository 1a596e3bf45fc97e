//! 抓取流程
//!
//! - 全量：依次抓取 A 股、港股、美股，合并后写入全部数据文件
//! - 港股增量：只抓取港股，与已发布的 A 股 / 美股数据重新合并

use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;

use crate::config::FetchConfig;
use crate::errors::PipelineError;
use crate::models::{Catalog, Market, MarketBatch};

use super::batch_lookup::{hk_fallback_codes, LookupOptions, UniverseLookupProvider};
use super::catalog::build_catalog;
use super::chain::{BatchSource, MarketChain, StaticFallback};
use super::stock::{
    EastmoneyUsProvider, SinaCnProvider, SinaHkProvider, SinaUsProvider, YahooHkLookup,
};
use super::writer::ArtifactStore;

/// 单个市场本次的抓取结果摘要
#[derive(Debug, Clone, PartialEq)]
pub struct MarketReport {
    pub market: Market,
    pub source: BatchSource,
    pub count: usize,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunReport {
    pub catalog: Catalog,
    pub markets: Vec<MarketReport>,
}

fn lookup_options(fetch: &FetchConfig) -> LookupOptions {
    LookupOptions {
        concurrency: fetch.hk_concurrency,
        progress_every: fetch.progress_every,
    }
}

fn hk_fallback(client: &Client, fetch: &FetchConfig) -> StaticFallback {
    StaticFallback::Lookup {
        codes: hk_fallback_codes(),
        lookup: Arc::new(YahooHkLookup::new(client.clone())),
        options: lookup_options(fetch),
    }
}

/// 全量流程的数据源链，按 CN、HK、US 顺序
pub fn default_chains(client: &Client, fetch: &FetchConfig) -> Vec<MarketChain> {
    vec![
        MarketChain::new(Market::CN)
            .with_provider(SinaCnProvider::new(client.clone(), fetch.clone())),
        MarketChain::new(Market::HK)
            .with_provider(SinaHkProvider::new(client.clone(), fetch.clone()))
            .with_fallback(hk_fallback(client, fetch)),
        MarketChain::new(Market::US)
            .with_provider(EastmoneyUsProvider::new(client.clone(), fetch.clone()))
            .with_provider(SinaUsProvider::new(client.clone(), fetch.clone())),
    ]
}

/// 港股增量流程的数据源链：新浪代码列表 + Yahoo 逐只查询，失败时改用常见代码列表
pub fn hk_incremental_chain(client: &Client, fetch: &FetchConfig) -> MarketChain {
    let provider = UniverseLookupProvider::new(
        Box::new(SinaHkProvider::new(client.clone(), fetch.clone())),
        Arc::new(YahooHkLookup::new(client.clone())),
        lookup_options(fetch),
    );
    MarketChain::new(Market::HK)
        .with_provider(provider)
        .with_fallback(hk_fallback(client, fetch))
}

/// 全量流程
///
/// 各市场依次抓取；单个市场失败只会得到空批次，不影响整体运行
pub async fn run_full(
    chains: &[MarketChain],
    store: &ArtifactStore,
) -> Result<RunReport, PipelineError> {
    let mut batches = Vec::with_capacity(chains.len());
    let mut markets = Vec::with_capacity(chains.len());

    for chain in chains {
        let outcome = chain.run().await;
        if !outcome.failures.is_empty() {
            log::info!("{} 失败的数据源: {}", chain.market(), outcome.failures.join("; "));
        }
        println!("  {}: {} 只", chain.market().display_name(), outcome.batch.len());
        markets.push(MarketReport {
            market: chain.market(),
            source: outcome.source,
            count: outcome.batch.len(),
        });
        batches.push(outcome.batch);
    }

    let catalog = build_catalog(&batches, Utc::now());
    store.write_catalog(&catalog)?;

    for market in Market::ALL {
        let batch = batches
            .iter()
            .find(|b| b.market == market)
            .cloned()
            .unwrap_or_else(|| MarketBatch::empty(market));
        store.write_market(&batch, catalog.metadata.updated_at)?;
    }

    Ok(RunReport { catalog, markets })
}

/// 港股增量流程
///
/// 先读取已发布的 A 股 / 美股数据（缺失即失败），再抓取港股并重新合并。
/// 港股没有任何有效数据时不改动已有文件，返回 `Ok(None)`。
pub async fn run_hk_incremental(
    chain: &MarketChain,
    store: &ArtifactStore,
) -> Result<Option<RunReport>, PipelineError> {
    let cn = store.read_market(Market::CN)?;
    let us = store.read_market(Market::US)?;
    log::info!("读取已发布数据: A 股 {} 只，美股 {} 只", cn.len(), us.len());

    let outcome = chain.run().await;
    if outcome.batch.is_empty() {
        println!("未获取到港股数据");
        return Ok(None);
    }

    let hk_report = MarketReport {
        market: Market::HK,
        source: outcome.source,
        count: outcome.batch.len(),
    };
    store.write_market(&outcome.batch, Utc::now())?;

    println!("\n更新合并数据...");
    let catalog = build_catalog(&[cn, outcome.batch, us], Utc::now());
    store.write_catalog(&catalog)?;

    Ok(Some(RunReport {
        catalog,
        markets: vec![hk_report],
    }))
}
