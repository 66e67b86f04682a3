//! Small shared value helpers for money handling
//!
//! Prices are carried as integer centavos everywhere money matters; reais
//! floats exist only at the display boundary.

/// Format centavos in the regional display format, e.g. `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let reais = cents / 100;
    let frac = cents % 100;

    let mut grouped = String::new();
    let digits = reais.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{frac:02}")
}

/// Centavos as a reais float for JSON payloads.
pub fn cents_to_reais(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Reais float (e.g. from an extracted page price) to centavos, rounded.
pub fn reais_to_cents(reais: f64) -> i64 {
    (reais * 100.0).round() as i64
}
