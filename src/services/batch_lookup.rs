//! 港股逐只查询
//!
//! 先拿到代码列表，再逐只调用 [`SymbolLookup`]。查询以固定窗口并发执行，
//! 结果保持输入顺序；单只失败只记录日志并跳过。

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::models::Market;

use super::provider::{FieldMap, QuoteProvider, RawRow, SymbolLookup, SymbolUniverse};

/// 常见港股代码，代码列表接口不可用时使用
pub const HK_FALLBACK_CODES: [&str; 63] = [
    "00700", "09988", "03690", "01810", "02318",
    "00941", "00005", "02020", "09618", "01211",
    "00388", "00883", "02269", "00027", "01038",
    "00016", "00002", "00001", "00003", "00006",
    "00011", "00012", "00017", "00019", "00066",
    "00175", "00267", "00288", "00386", "00688",
    "00762", "00823", "00857", "00868", "00939",
    "00960", "00981", "01024", "01109", "01177",
    "01299", "01398", "01876", "01928", "02007",
    "02018", "02313", "02319", "02328", "02382",
    "02388", "02628", "02899", "03328", "03988",
    "06030", "06098", "06618", "06862", "09633",
    "09888", "09961", "09999",
];

pub fn hk_fallback_codes() -> Vec<String> {
    HK_FALLBACK_CODES.iter().map(|c| c.to_string()).collect()
}

/// 逐只查询参数
#[derive(Debug, Clone, Copy)]
pub struct LookupOptions {
    /// 同时进行的查询数，至少为 1
    pub concurrency: usize,
    /// 每隔多少只打印一次进度，0 表示不打印
    pub progress_every: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            progress_every: 50,
        }
    }
}

/// 逐只查询代码列表，返回成功的原始数据行（保持输入顺序）
pub async fn lookup_rows(
    lookup: &dyn SymbolLookup,
    codes: &[String],
    options: LookupOptions,
) -> Vec<RawRow> {
    let total = codes.len();
    let results: Vec<Option<RawRow>> = stream::iter(codes.iter().cloned().enumerate())
        .map(|(i, code)| async move {
            if options.progress_every > 0 && i % options.progress_every == 0 {
                log::info!("  进度: {}/{} ({}%)", i, total, i * 100 / total.max(1));
            }
            match lookup.lookup(&code).await {
                Ok(row) => Some(row),
                Err(e) => {
                    log::debug!("{} 查询 {} 失败: {}", lookup.id(), code, e);
                    None
                }
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let rows: Vec<RawRow> = results.into_iter().flatten().collect();
    log::info!("{} 逐只查询 {} 只，成功 {} 只", lookup.id(), total, rows.len());
    rows
}

/// 代码列表 + 逐只查询组合成的港股数据源
pub struct UniverseLookupProvider {
    universe: Box<dyn SymbolUniverse>,
    lookup: Arc<dyn SymbolLookup>,
    options: LookupOptions,
}

impl UniverseLookupProvider {
    pub fn new(
        universe: Box<dyn SymbolUniverse>,
        lookup: Arc<dyn SymbolLookup>,
        options: LookupOptions,
    ) -> Self {
        Self {
            universe,
            lookup,
            options,
        }
    }
}

#[async_trait]
impl QuoteProvider for UniverseLookupProvider {
    fn id(&self) -> &'static str {
        self.lookup.id()
    }

    fn market(&self) -> Market {
        Market::HK
    }

    fn fields(&self) -> &'static FieldMap {
        self.lookup.fields()
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, ProviderError> {
        let codes = self.universe.symbols().await?;
        log::info!("从 {} 获取 {} 只港股代码", self.universe.id(), codes.len());
        Ok(lookup_rows(self.lookup.as_ref(), &codes, self.options).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chain::{BatchSource, MarketChain};
    use crate::services::testing::FakeLookup;

    struct FakeUniverse(Result<Vec<String>, ()>);

    #[async_trait]
    impl SymbolUniverse for FakeUniverse {
        fn id(&self) -> &'static str {
            "FAKE_UNIVERSE"
        }

        async fn symbols(&self) -> Result<Vec<String>, ProviderError> {
            self.0
                .clone()
                .map_err(|_| ProviderError::Empty { provider: "FAKE_UNIVERSE" })
        }
    }

    #[test]
    fn test_fallback_codes() {
        let codes = hk_fallback_codes();
        assert_eq!(codes.len(), 63);
        assert!(codes.iter().all(|c| c.len() == 5 && c.chars().all(|ch| ch.is_ascii_digit())));
    }

    #[tokio::test]
    async fn test_lookup_rows_keeps_order_and_skips_failures() {
        let lookup = FakeLookup::new(&[("00001", 11.0), ("00005", 12.0), ("00700", 13.0)]);
        let codes: Vec<String> = ["00700", "99999", "00001", "00005"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let options = LookupOptions {
            concurrency: 2,
            progress_every: 0,
        };
        let rows = lookup_rows(&lookup, &codes, options).await;
        let got: Vec<&str> = rows.iter().map(|r| r["code"].as_str().unwrap()).collect();
        assert_eq!(got, vec!["00700", "00001", "00005"]);
    }

    #[tokio::test]
    async fn test_universe_lookup_provider() {
        let provider = UniverseLookupProvider::new(
            Box::new(FakeUniverse(Ok(vec!["00700".to_string(), "00005".to_string()]))),
            Arc::new(FakeLookup::new(&[("00700", 11.0), ("00005", 0.0)])),
            LookupOptions::default(),
        );

        let batch = provider.fetch_batch().await.unwrap();
        assert_eq!(batch.market, Market::HK);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.stocks[0].symbol, "HK:00700");
        assert_eq!(batch.stocks[0].change_pct, 10.0);
    }

    #[tokio::test]
    async fn test_universe_lookup_provider_in_chain() {
        let provider = UniverseLookupProvider::new(
            Box::new(FakeUniverse(Ok(vec!["00005".to_string(), "00700".to_string()]))),
            Arc::new(FakeLookup::new(&[("00700", 320.0), ("00005", 60.0)])),
            LookupOptions {
                concurrency: 4,
                progress_every: 1,
            },
        );
        let chain = MarketChain::new(Market::HK).with_provider(provider);

        let outcome = chain.run().await;
        assert_eq!(outcome.source, BatchSource::Provider("FAKE_LOOKUP"));
        assert!(outcome.failures.is_empty());
        let symbols: Vec<&str> = outcome.batch.stocks.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["HK:00005", "HK:00700"]);
    }

    #[tokio::test]
    async fn test_universe_failure_is_provider_error() {
        let provider = UniverseLookupProvider::new(
            Box::new(FakeUniverse(Err(()))),
            Arc::new(FakeLookup::new(&[])),
            LookupOptions::default(),
        );
        assert!(provider.fetch_batch().await.is_err());
    }
}
