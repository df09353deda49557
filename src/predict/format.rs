//! Currency rendering for predictions and deltas

/// `1234.5` -> `"1,234.50"`; with `always_sign` positive values get a `+`
fn group_thousands(value: f64, always_sign: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rounded != "0.00" {
        "-"
    } else if always_sign {
        "+"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac)
}

/// `$1,234.56`
pub fn format_currency(value: f64) -> String {
    format!("${}", group_thousands(value, false))
}

/// `$+1,234.56` / `$-12.00`
pub fn format_delta(value: f64) -> String {
    format!("${}", group_thousands(value, true))
}
