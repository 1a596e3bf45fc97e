//! 代码规范化与涨跌计算

use crate::models::Market;

/// 港股代码固定宽度
pub const HK_CODE_WIDTH: usize = 5;

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 将数据源原始代码转换为市场内规范代码
///
/// - CN: 原样保留
/// - HK: 左侧补零到 5 位（超过 5 位不截断）
/// - US: `.` 替换为 `-`，如 BRK.B -> BRK-B；`uppercase` 为 true 时转大写
pub fn normalize_code(market: Market, raw: &str, uppercase: bool) -> String {
    let raw = raw.trim();
    match market {
        Market::CN => raw.to_string(),
        Market::HK => format!("{:0>width$}", raw, width = HK_CODE_WIDTH),
        Market::US => {
            let code = raw.replace('.', "-");
            if uppercase {
                code.to_uppercase()
            } else {
                code
            }
        }
    }
}

/// 全局唯一键 `{MARKET}:{code}`
pub fn make_symbol(market: Market, code: &str) -> String {
    format!("{}:{}", market, code)
}

/// 根据现价和昨收计算 (涨跌额, 涨跌幅%)，结果保留两位小数
///
/// 昨收为 0 视为数据不足，返回 (0, 0)
pub fn derive_change(price: f64, prev_close: f64) -> (f64, f64) {
    if prev_close == 0.0 {
        return (0.0, 0.0);
    }
    let change = price - prev_close;
    let change_pct = change / prev_close * 100.0;
    (round2(change), round2(change_pct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cn_passthrough() {
        assert_eq!(normalize_code(Market::CN, "600000", false), "600000");
        assert_eq!(make_symbol(Market::CN, "600000"), "CN:600000");
    }

    #[test]
    fn test_normalize_hk_padding() {
        let cases = vec![("1", "00001"), ("700", "00700"), ("9988", "09988"), ("00005", "00005")];
        for (input, expected) in cases {
            assert_eq!(normalize_code(Market::HK, input, false), expected);
        }
        assert_eq!(make_symbol(Market::HK, "00700"), "HK:00700");
    }

    #[test]
    fn test_normalize_hk_idempotent() {
        for raw in ["1", "12", "123", "1234", "12345", "00700"] {
            let once = normalize_code(Market::HK, raw, false);
            let twice = normalize_code(Market::HK, &once, false);
            assert_eq!(once.len(), HK_CODE_WIDTH);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_us_share_class() {
        let cases = vec![
            ("BRK.B", "BRK-B"),
            ("BF.A", "BF-A"),
            ("A.B.C", "A-B-C"),
            ("AAPL", "AAPL"),
        ];
        for (input, expected) in cases {
            let code = normalize_code(Market::US, input, false);
            assert_eq!(code, expected);
            assert!(!code.contains('.'));
            assert_eq!(
                code.matches('-').count(),
                input.matches('-').count() + input.matches('.').count()
            );
        }
        assert_eq!(normalize_code(Market::US, "brk.b", true), "BRK-B");
        assert_eq!(normalize_code(Market::US, "brk.b", false), "brk-b");
    }

    #[test]
    fn test_derive_change() {
        assert_eq!(derive_change(11.0, 10.0), (1.0, 10.0));
        assert_eq!(derive_change(9.5, 10.0), (-0.5, -5.0));
        assert_eq!(derive_change(10.123, 10.0), (0.12, 1.23));
    }

    #[test]
    fn test_derive_change_zero_prev_close() {
        for price in [0.0, 1.0, 123.45, -3.0] {
            assert_eq!(derive_change(price, 0.0), (0.0, 0.0));
        }
    }
}
