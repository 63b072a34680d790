// 🔤 Text Normalizer - cell text → amounts and half-width display strings
//
// Table cells come straight from a Japanese brokerage page, so amounts carry
// thousands separators and currency glyphs, and names mix full-width and
// half-width Latin characters.

use tracing::warn;

/// Characters removed before an amount is parsed
const AMOUNT_NOISE: &[char] = &[',', '，', ' ', '\u{3000}', '円', '¥', '￥', '\\'];

/// Offset between the full-width Latin block and ASCII
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

// ============================================================================
// AMOUNTS
// ============================================================================

/// Parse a monetary cell such as `"1,234円"` or `"-500"`
///
/// Empty text (after removing separators and currency glyphs) is a
/// placeholder cell and yields 0. Otherwise the leading integer is taken and
/// any trailing garbage ignored, so `"12.5"` parses as 12. Text without a
/// leading integer also yields 0, with a warning.
pub fn parse_amount(text: &str) -> i64 {
    let cleaned: String = text.chars().filter(|c| !AMOUNT_NOISE.contains(c)).collect();

    if cleaned.is_empty() {
        return 0;
    }

    match leading_integer(&cleaned) {
        Some(value) => value,
        None => {
            warn!(cell = %text, "amount cell has no leading integer, using 0");
            0
        }
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();

    let (negative, rest) = match text.strip_prefix(|c| matches!(c, '-' | '−' | '－')) {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

// ============================================================================
// DISPLAY STRINGS
// ============================================================================

/// Fold full-width characters to their half-width equivalents
///
/// The ideographic space becomes an ASCII space and every character in
/// `！`..=`～` moves down to `!`..=`~`. Everything else passes through.
pub fn normalize_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => {
                char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Format an integer with `,` thousands separators (`-1234567` → `-1,234,567`)
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_empty_is_zero() {
        assert_eq!(parse_amount(""), 0);
        assert_eq!(parse_amount(" 　円"), 0);
    }

    #[test]
    fn test_parse_amount_strips_separators_and_yen() {
        assert_eq!(parse_amount("1,234円"), 1234);
        assert_eq!(parse_amount("1，234，567円"), 1_234_567);
        assert_eq!(parse_amount("\\12,000"), 12_000);
        assert_eq!(parse_amount("￥ 3,400"), 3_400);
    }

    #[test]
    fn test_parse_amount_signs() {
        assert_eq!(parse_amount("-500"), -500);
        assert_eq!(parse_amount("+1,200円"), 1_200);
        assert_eq!(parse_amount("−2,000円"), -2_000);
    }

    #[test]
    fn test_parse_amount_truncates_trailing_garbage() {
        assert_eq!(parse_amount("12.5"), 12);
        assert_eq!(parse_amount("\n  98,765円\n"), 98_765);
        assert_eq!(parse_amount("300口"), 300);
    }

    #[test]
    fn test_parse_amount_without_digits() {
        assert_eq!(parse_amount("---"), 0);
        assert_eq!(parse_amount("n/a"), 0);
    }

    #[test]
    fn test_normalize_width_folds_full_width() {
        assert_eq!(normalize_width("ｅＭＡＸＩＳ　Ｓｌｉｍ"), "eMAXIS Slim");
        assert_eq!(normalize_width("ＳＢＩ・Ｖ・Ｓ＆Ｐ５００"), "SBI・V・S&P500");
        assert_eq!(normalize_width("（ドル）"), "(ドル)");
    }

    #[test]
    fn test_normalize_width_keeps_other_characters() {
        assert_eq!(normalize_width("三菱UFJ銀行"), "三菱UFJ銀行");
    }

    #[test]
    fn test_normalize_width_is_noop_on_half_width() {
        let half = "eMAXIS Slim 全世界株式 (オール・カントリー) 2024!~";
        assert_eq!(normalize_width(half), half);
        assert_eq!(normalize_width(&normalize_width("ＡＢＣ　１２３")), "ABC 123");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-45_000), "-45,000");
    }
}
