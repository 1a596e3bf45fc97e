//! 已发布索引的查询
//!
//! 把用户输入的代码（600519.SS、700.HK、BRK.B 等）转换为索引键，
//! 并在 stocks-index.json 上做单只查询和模糊搜索

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::errors::PipelineError;
use crate::models::{Market, StockQuote};

use super::normalize::{make_symbol, normalize_code};

struct KeyPatterns {
    valid: Regex,
    exchange_suffix: Regex,
    share_class: Regex,
    a_share: Regex,
    beijing: Regex,
    hk: Regex,
}

fn patterns() -> &'static KeyPatterns {
    static PATTERNS: OnceLock<KeyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| KeyPatterns {
        valid: Regex::new(r"^[A-Za-z0-9.-]{1,10}$").unwrap(),
        exchange_suffix: Regex::new(r"\.(SS|SZ|HK|T)$").unwrap(),
        share_class: Regex::new(r"\.([A-Z])$").unwrap(),
        a_share: Regex::new(r"^[03684]\d{5}$").unwrap(),
        beijing: Regex::new(r"^BJ\d+$").unwrap(),
        hk: Regex::new(r"^\d{1,5}$").unwrap(),
    })
}

/// 将输入转换为索引键
///
/// - 6 位数字（6/0/3/8/4 开头）-> `CN:{code}`，`bj` 开头 -> `CN:bj...`
/// - 1~5 位数字 -> `HK:{5 位代码}`
/// - 其他 -> `US:{ticker}`，`BRK.B` 规范为 `BRK-B`
pub fn resolve_index_key(input: &str) -> Result<String, PipelineError> {
    let p = patterns();
    let trimmed = input.trim();
    if !p.valid.is_match(trimmed) {
        return Err(PipelineError::IndexKey {
            input: input.to_string(),
        });
    }

    let upper = trimmed.to_uppercase();
    let symbol = p.exchange_suffix.replace(&upper, "");
    let symbol = p.share_class.replace(&symbol, "-$1").into_owned();

    if symbol.is_empty() {
        return Err(PipelineError::IndexKey {
            input: input.to_string(),
        });
    }

    let key = if p.a_share.is_match(&symbol) {
        make_symbol(Market::CN, &symbol)
    } else if p.beijing.is_match(&symbol) {
        make_symbol(Market::CN, &symbol.to_lowercase())
    } else if p.hk.is_match(&symbol) {
        make_symbol(Market::HK, &normalize_code(Market::HK, &symbol, false))
    } else {
        make_symbol(Market::US, &normalize_code(Market::US, &symbol, true))
    };
    Ok(key)
}

/// 按输入查询单只股票
pub fn find<'a>(
    index: &'a BTreeMap<String, StockQuote>,
    input: &str,
) -> Result<Option<&'a StockQuote>, PipelineError> {
    let key = resolve_index_key(input)?;
    Ok(index.get(&key))
}

/// 搜索默认返回条数
pub const DEFAULT_SEARCH_LIMIT: usize = 8;

/// 匹配得分：代码完全相同 100，代码前缀 80，名称前缀 60，代码或名称包含 40
fn match_score(quote: &StockQuote, q: &str) -> u32 {
    let code = quote.code.to_lowercase();
    let name = quote.name.to_lowercase();
    if code == q {
        100
    } else if code.starts_with(q) {
        80
    } else if name.starts_with(q) {
        60
    } else if code.contains(q) || name.contains(q) {
        40
    } else {
        0
    }
}

/// 按代码和名称做不区分大小写的搜索，返回至多 `limit` 条
///
/// 结果按得分降序，同分时名称较短者在前，再按索引键顺序
pub fn search<'a>(
    index: &'a BTreeMap<String, StockQuote>,
    query: &str,
    limit: usize,
) -> Vec<&'a StockQuote> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &StockQuote)> = index
        .values()
        .map(|s| (match_score(s, &q), s))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| {
        sb.cmp(sa)
            .then_with(|| a.name.chars().count().cmp(&b.name.chars().count()))
    });

    scored.into_iter().take(limit).map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::build_index;

    #[test]
    fn test_resolve_index_key() {
        let cases = vec![
            ("600519", "CN:600519"),
            ("600519.SS", "CN:600519"),
            ("000001.sz", "CN:000001"),
            ("300750", "CN:300750"),
            ("bj920000", "CN:bj920000"),
            ("700", "HK:00700"),
            ("0700.HK", "HK:00700"),
            ("09988", "HK:09988"),
            ("aapl", "US:AAPL"),
            ("BRK.B", "US:BRK-B"),
            ("brk-b", "US:BRK-B"),
            ("7203.T", "HK:07203"),
        ];
        for (input, expected) in cases {
            assert_eq!(resolve_index_key(input).unwrap(), expected, "input {}", input);
        }
    }

    #[test]
    fn test_resolve_index_key_invalid() {
        for input in ["", "   ", "ABCDEFGHIJK", "AA PL", "中文", ".HK"] {
            assert!(resolve_index_key(input).is_err(), "input {:?}", input);
        }
    }

    fn quote(symbol: &str, name: &str) -> StockQuote {
        let code = symbol.split_once(':').unwrap().1;
        StockQuote {
            symbol: symbol.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            name_cn: None,
            price: 1.0,
            prev_close: 1.0,
            change: 0.0,
            change_pct: 0.0,
        }
    }

    #[test]
    fn test_find_and_search() {
        let stocks = vec![
            quote("CN:600519", "贵州茅台"),
            quote("HK:00700", "TENCENT"),
            quote("US:AAPL", "Apple Inc."),
            quote("US:APP", "AppLovin"),
        ];
        let index = build_index(&stocks);

        assert_eq!(find(&index, "700").unwrap().unwrap().name, "TENCENT");
        assert!(find(&index, "MSFT").unwrap().is_none());
        assert!(find(&index, "bad input!").is_err());

        let hits: Vec<&str> = search(&index, "app", 20).iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(hits, vec!["US:APP", "US:AAPL"]);
        assert_eq!(search(&index, "茅台", 20)[0].symbol, "CN:600519");
        assert!(search(&index, " ", 20).is_empty());
    }

    #[test]
    fn test_search_ranks_exact_code_first() {
        let stocks = vec![
            quote("HK:00700", "TENCENT"),
            quote("US:AAPL", "Apple Inc."),
            quote("US:APP", "AppLovin"),
            quote("US:AT", "Ashtead"),
            quote("US:T", "AT&T Inc."),
        ];
        let index = build_index(&stocks);
        let symbols = |q: &str, limit: usize| -> Vec<String> {
            search(&index, q, limit).iter().map(|s| s.symbol.clone()).collect()
        };

        assert_eq!(symbols("app", 1), vec!["US:APP"]);
        assert_eq!(symbols("t", 1), vec!["US:T"]);
        // 名称前缀 60 高于包含 40
        assert_eq!(symbols("te", 5), vec!["HK:00700", "US:AT"]);
        // 同为代码前缀时名称较短者在前
        assert_eq!(symbols("a", 3), vec!["US:AT", "US:APP", "US:AAPL"]);
    }

    #[test]
    fn test_search_limit() {
        let stocks: Vec<StockQuote> = (1..=12)
            .map(|i| quote(&format!("HK:{:05}", i), "长和"))
            .collect();
        let index = build_index(&stocks);
        assert_eq!(search(&index, "000", DEFAULT_SEARCH_LIMIT).len(), 8);
        assert_eq!(search(&index, "000", 3)[0].symbol, "HK:00001");
    }
}
