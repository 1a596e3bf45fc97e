//! 业务逻辑服务模块
//!
//! 数据源抓取、降级、规范化、合并与数据文件读写

pub mod batch_lookup; // 港股逐只查询
pub mod catalog;      // 合并与索引
pub mod chain;        // 数据源降级链
pub mod common;
pub mod index;        // 已发布索引查询
pub mod normalize;    // 代码规范化与涨跌计算
pub mod pipeline;     // 全量 / 港股增量流程
pub mod provider;     // 数据源抽象与字段映射
pub mod stock;        // 各市场数据源实现
pub mod writer;       // 数据文件读写

#[cfg(test)]
pub(crate) mod testing;
