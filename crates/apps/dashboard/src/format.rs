//! Formatting helpers for presenting metrics.

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// SI-prefixed number with `precision` significant digits (`1.5M`, `250k`).
pub fn format_si(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }
    let precision = precision.max(1);
    let sign = if value < 0.0 { "-" } else { "" };
    let (coefficient, exponent) = decimal_parts(value.abs(), precision);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8);
    let i = exponent - prefix_exponent * 3 + 1;
    let n = coefficient.len() as i32;
    let body = if i == n {
        coefficient
    } else if i > n {
        format!("{coefficient}{}", "0".repeat((i - n) as usize))
    } else if i > 0 {
        let (int, frac) = coefficient.split_at(i as usize);
        format!("{int}.{frac}")
    } else {
        format!("0.{}{coefficient}", "0".repeat((-i) as usize))
    };
    format!("{sign}{body}{}", SI_PREFIXES[(prefix_exponent + 8) as usize])
}

/// Currency amount with two significant digits (`$1.5M`).
pub fn format_usd(value: f64) -> String {
    let si = format_si(value, 2);
    match si.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${si}"),
    }
}

/// Headline currency figure; billions read as `B` rather than `G`.
pub fn format_usd_headline(value: f64) -> String {
    format_usd(value).replace('G', "B")
}

pub fn format_hours(value: f64) -> String {
    format!("{value:.1}h")
}

/// Significant digits and decimal exponent of `x`, rounded to `precision`
/// digits.
fn decimal_parts(x: f64, precision: usize) -> (String, i32) {
    let formatted = format!("{:.*e}", precision - 1, x);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    (mantissa.replace('.', ""), exponent.parse().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::{format_hours, format_si, format_usd, format_usd_headline};

    #[test]
    fn si_prefixes_with_two_digits() {
        assert_eq!(format_si(1_500_000.0, 2), "1.5M");
        assert_eq!(format_si(1_000_000.0, 2), "1.0M");
        assert_eq!(format_si(250_000.0, 2), "250k");
        assert_eq!(format_si(42.0, 2), "42");
        assert_eq!(format_si(999.0, 2), "1.0k");
        assert_eq!(format_si(0.0, 2), "0.0");
        assert_eq!(format_si(0.5, 2), "500m");
    }

    #[test]
    fn currency_and_headline() {
        assert_eq!(format_usd(1_500_000.0), "$1.5M");
        assert_eq!(format_usd(-2_000.0), "-$2.0k");
        assert_eq!(format_usd(3_400_000_000.0), "$3.4G");
        assert_eq!(format_usd_headline(3_400_000_000.0), "$3.4B");
    }

    #[test]
    fn hours_one_decimal() {
        assert_eq!(format_hours(12.345), "12.3h");
    }
}
