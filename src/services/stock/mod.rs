//! 各市场行情数据源
//!
//! 新浪财经、东方财富为批量列表接口，Yahoo 为港股逐只查询接口

pub mod eastmoney;
pub mod sina;
pub mod yahoo;

pub use eastmoney::EastmoneyUsProvider;
pub use sina::{SinaCnProvider, SinaHkProvider, SinaUsProvider};
pub use yahoo::YahooHkLookup;
