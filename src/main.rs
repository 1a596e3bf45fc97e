//! 市相 (ShiXiang) 行情数据抓取
//!
//! 抓取 A 股、港股、美股行情，合并后生成静态 JSON 数据文件
//! 数据来源：新浪财经、东方财富、Yahoo Finance

mod config;   // 配置
mod errors;   // 错误类型
mod models;   // 数据模型定义
mod services; // 业务逻辑服务

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::Market;
use crate::services::common::{build_http_client, get_beijing_time};
use crate::services::pipeline::{
    default_chains, hk_incremental_chain, run_full, run_hk_incremental, RunReport,
};
use crate::services::index;
use crate::services::writer::ArtifactStore;

#[derive(Parser)]
#[command(name = "shixiang-data", about = "市相行情数据抓取")]
struct Cli {
    /// 配置文件路径，默认依次查找 config.json、config/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出目录，覆盖配置文件中的 output.dir
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 全量抓取三个市场（默认）
    All,
    /// 只抓取港股，并与已发布的 A 股 / 美股数据合并
    Hk,
    /// 从已发布索引查询单只股票
    Show {
        /// 股票代码，如 600519、700.HK、BRK.B
        input: String,
    },
    /// 在已发布索引中搜索
    Search {
        query: String,
        #[arg(long, default_value_t = index::DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

fn print_banner(title: &str) {
    println!("{}", "=".repeat(50));
    println!("{}", title);
    println!("时间: {}", get_beijing_time());
    println!("{}", "=".repeat(50));
}

fn print_summary(report: &RunReport) {
    let counts = report.catalog.metadata.counts;
    println!("\n{}", "=".repeat(50));
    println!("抓取完成!");
    for m in &report.markets {
        println!("  {} 来源: {:?} ({} 只)", m.market.display_name(), m.source, m.count);
    }
    println!("  {}: {}", Market::CN.display_name(), counts.cn);
    println!("  {}: {}", Market::HK.display_name(), counts.hk);
    println!("  {}: {}", Market::US.display_name(), counts.us);
    println!("  合计: {}", counts.total);
    println!("{}", "=".repeat(50));
}

/// 应用程序入口
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 先初始化日志系统，保证加载配置时的日志可见；未设置 RUST_LOG 时级别取自配置文件
    let rust_log = std::env::var_os("RUST_LOG").is_some();
    env_logger::init_from_env(Env::default().default_filter_or("trace"));
    if !rust_log {
        log::set_max_level(LevelFilter::Info);
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load(),
    };
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    if !rust_log {
        match config.log.level_filter() {
            Some(level) => log::set_max_level(level),
            None => log::warn!("无法识别的日志级别 {}，使用 info", config.log.level),
        }
    }

    let store = ArtifactStore::new(&config.output.dir);
    log::info!("输出目录: {}", store.root().display());

    match cli.command.unwrap_or(Commands::All) {
        Commands::All => {
            print_banner("市相 (ShiXiang) 数据抓取");
            let client = build_http_client(&config.http)?;
            let chains = default_chains(&client, &config.fetch);
            let report = run_full(&chains, &store).await?;
            print_summary(&report);
        }
        Commands::Hk => {
            print_banner("港股数据抓取 (增量)");
            let client = build_http_client(&config.http)?;
            let chain = hk_incremental_chain(&client, &config.fetch);
            if let Some(report) = run_hk_incremental(&chain, &store).await? {
                print_summary(&report);
            }
        }
        Commands::Show { input } => {
            let artifact = store.read_index()?;
            match index::find(&artifact.index, &input)? {
                Some(quote) => {
                    let market = quote.market().map(|m| m.display_name()).unwrap_or("未知市场");
                    println!("[{}]", market);
                    println!("{}", serde_json::to_string_pretty(quote)?);
                }
                None => println!("未找到: {}", input),
            }
            println!("数据更新时间: {}", artifact.metadata.updated_at.to_rfc3339());
        }
        Commands::Search { query, limit } => {
            let artifact = store.read_index()?;
            let hits = index::search(&artifact.index, &query, limit);
            for quote in &hits {
                println!(
                    "{:<12} {:<20} {:>10.2} {:>8.2}%",
                    quote.symbol, quote.name, quote.price, quote.change_pct
                );
            }
            println!("共 {} 条", hits.len());
        }
    }

    Ok(())
}
