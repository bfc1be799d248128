/// Format a number with comma thousands separators and a fixed number of
/// decimals: `format_thousands(12345.678, 2) == "12,345.68"`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `$12,345` style, as shown by the summary metrics.
pub fn dollars(value: f64) -> String {
    with_sign(value, 0)
}

/// `$12,345.67` style, as shown for an estimated price.
pub fn dollars_cents(value: f64) -> String {
    with_sign(value, 2)
}

fn with_sign(value: f64, decimals: usize) -> String {
    let digits = format_thousands(value, decimals);
    match digits.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${digits}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-98765.4, 1), "-98,765.4");
    }

    #[test]
    fn rounding_can_carry_into_a_new_group() {
        assert_eq!(format_thousands(999.6, 0), "1,000");
        assert_eq!(format_thousands(-0.2, 0), "0");
    }

    #[test]
    fn dollar_amounts() {
        assert_eq!(dollars(12345.4), "$12,345");
        assert_eq!(dollars_cents(17200.0), "$17,200.00");
        assert_eq!(dollars_cents(-50.5), "-$50.50");
    }
}
