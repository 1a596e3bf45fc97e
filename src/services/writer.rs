//! 数据文件读写
//!
//! 输出目录由调用方传入，所有文件每次运行整体覆盖

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;
use crate::models::{
    Catalog, CatalogArtifact, IndexArtifact, Market, MarketArtifact, MarketBatch, MarketMetadata,
};

pub const CATALOG_FILE: &str = "stocks.json";
pub const INDEX_FILE: &str = "stocks-index.json";

/// 输出目录
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    fn ensure_root(&self) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.root).map_err(|source| PipelineError::Io {
            path: self.root.clone(),
            source,
        })
    }

    fn write_json<T: Serialize>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, PipelineError> {
        self.ensure_root()?;
        let path = self.path(file_name);
        let content = serde_json::to_string(value).map_err(|source| PipelineError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> Result<T, PipelineError> {
        let path = self.path(file_name);
        if !path.exists() {
            return Err(PipelineError::MissingArtifact { path });
        }
        let content = fs::read_to_string(&path).map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PipelineError::Json { path, source })
    }

    /// 写入 stocks.json 和 stocks-index.json
    pub fn write_catalog(&self, catalog: &Catalog) -> Result<(), PipelineError> {
        let artifact = CatalogArtifact {
            metadata: catalog.metadata.clone(),
            stocks: catalog.stocks.clone(),
        };
        self.write_json(CATALOG_FILE, &artifact)?;
        println!("保存 {} ({} 只股票)", CATALOG_FILE, catalog.stocks.len());

        let artifact = IndexArtifact {
            metadata: catalog.metadata.clone(),
            index: catalog.index.clone(),
        };
        self.write_json(INDEX_FILE, &artifact)?;
        println!("保存 {}", INDEX_FILE);
        Ok(())
    }

    /// 写入 stocks-{market}.json
    pub fn write_market(
        &self,
        batch: &MarketBatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        let artifact = MarketArtifact {
            metadata: MarketMetadata {
                updated_at,
                count: batch.len(),
            },
            stocks: batch.stocks.clone(),
        };
        let file_name = batch.market.artifact_name();
        self.write_json(&file_name, &artifact)?;
        println!("保存 {} ({} 只)", file_name, batch.len());
        Ok(())
    }

    /// 读取已发布的分市场数据，文件不存在时返回 [`PipelineError::MissingArtifact`]
    pub fn read_market(&self, market: Market) -> Result<MarketBatch, PipelineError> {
        let artifact: MarketArtifact = self.read_json(&market.artifact_name())?;
        Ok(MarketBatch::new(market, artifact.stocks))
    }

    pub fn read_index(&self) -> Result<IndexArtifact, PipelineError> {
        self.read_json(INDEX_FILE)
    }

    #[cfg(test)]
    pub fn read_catalog(&self) -> Result<CatalogArtifact, PipelineError> {
        self.read_json(CATALOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockQuote;
    use crate::services::catalog::build_catalog;

    fn quote(symbol: &str, name_cn: Option<&str>) -> StockQuote {
        let code = symbol.split_once(':').unwrap().1;
        StockQuote {
            symbol: symbol.to_string(),
            code: code.to_string(),
            name: "测试".to_string(),
            name_cn: name_cn.map(|s| s.to_string()),
            price: 10.5,
            prev_close: 10.0,
            change: 0.5,
            change_pct: 5.0,
        }
    }

    #[test]
    fn test_write_market_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("data"));
        let batch = MarketBatch::new(Market::HK, vec![quote("HK:00700", Some("腾讯控股"))]);

        store.write_market(&batch, Utc::now()).unwrap();

        let text = fs::read_to_string(store.path("stocks-hk.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["count"], 1);
        assert!(value["metadata"]["updated_at"].is_string());
        assert_eq!(value["stocks"][0]["symbol"], "HK:00700");
        assert_eq!(value["stocks"][0]["name_cn"], "腾讯控股");
        // 非 ASCII 字符原样写入
        assert!(text.contains("腾讯控股"));

        let read_back = store.read_market(Market::HK).unwrap();
        assert_eq!(read_back, batch);
    }

    #[test]
    fn test_write_catalog_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let batches = vec![
            MarketBatch::new(Market::CN, vec![quote("CN:600000", None)]),
            MarketBatch::new(Market::US, vec![quote("US:AAPL", None)]),
        ];
        let catalog = build_catalog(&batches, Utc::now());

        store.write_catalog(&catalog).unwrap();

        let text = fs::read_to_string(store.path(CATALOG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["counts"]["CN"], 1);
        assert_eq!(value["metadata"]["counts"]["HK"], 0);
        assert_eq!(value["metadata"]["counts"]["US"], 1);
        assert_eq!(value["metadata"]["counts"]["total"], 2);
        assert_eq!(value["stocks"][1]["symbol"], "US:AAPL");
        assert!(value["stocks"][0].get("name_cn").is_none());

        let index = store.read_index().unwrap();
        assert_eq!(index.index.len(), 2);
        assert_eq!(index.metadata, catalog.metadata);
        assert_eq!(index.index["US:AAPL"].code, "AAPL");

        let catalog_back = store.read_catalog().unwrap();
        assert_eq!(catalog_back.stocks, catalog.stocks);
    }

    #[test]
    fn test_read_missing_market() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        match store.read_market(Market::CN) {
            Err(PipelineError::MissingArtifact { path }) => {
                assert!(path.ends_with("stocks-cn.json"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_read_corrupt_market() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.path("stocks-us.json"), "{not json").unwrap();

        assert!(matches!(store.read_market(Market::US), Err(PipelineError::Json { .. })));
    }
}
