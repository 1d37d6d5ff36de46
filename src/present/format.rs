//! Human-readable number formatting for KPIs.

/// Suffixes applied after each division by 1000; past the last one the
/// value is reported in millions.
const UNITS: [&str; 2] = ["", "thousand"];
const LAST_UNIT: &str = "million";

/// Render `value` with two decimals, thousands grouping and a magnitude suffix.
///
/// The layout is always `"{prefix} {number} {suffix}"`, so an empty prefix or
/// suffix still leaves its separating space:
///
/// ```text
/// format_magnitude(500.0, "")        == " 500.00 "
/// format_magnitude(1500.0, "R$")     == "R$ 1.50 thousand"
/// format_magnitude(2_500_000.0, "")  == " 2.50 million"
/// ```
pub fn format_magnitude(value: f64, prefix: &str) -> String {
    let mut value = value;
    for unit in UNITS {
        if value < 1000.0 {
            return format!("{prefix} {} {unit}", group_thousands(value, 2));
        }
        value /= 1000.0;
    }
    format!("{prefix} {} {LAST_UNIT}", group_thousands(value, 2))
}

/// Fixed-point rendering with `,` between groups of three integer digits.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_a_thousand_has_no_suffix() {
        assert_eq!(format_magnitude(500.0, ""), " 500.00 ");
        assert_eq!(format_magnitude(0.0, "R$"), "R$ 0.00 ");
    }

    #[test]
    fn thousands_and_millions() {
        assert_eq!(format_magnitude(1500.0, ""), " 1.50 thousand");
        assert_eq!(format_magnitude(2_500_000.0, ""), " 2.50 million");
        assert_eq!(format_magnitude(1500.0, "R$"), "R$ 1.50 thousand");
    }

    #[test]
    fn millions_keep_growing_with_grouping() {
        assert_eq!(format_magnitude(5_000_000_000.0, "R$"), "R$ 5,000.00 million");
    }

    #[test]
    fn rounding_can_reach_the_next_group() {
        assert_eq!(format_magnitude(999.999, ""), " 1,000.00 ");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(-1234.5, 2), "-1,234.50");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(100000.0, 0), "100,000");
    }
}
