use sqlx::types::BigDecimal;

/// Clamps a similarity score into `[0, 1]` and renders it as a three-place
/// decimal. Non-finite inputs collapse to zero so a bad vector can never
/// poison a stored score.
pub fn clamp_score(value: f64) -> BigDecimal {
    let value = if value.is_finite() { value } else { 0.0 };
    fixed_decimal(value.clamp(0.0, 1.0), 3)
}

pub fn fixed_decimal(value: f64, places: usize) -> BigDecimal {
    // The scale is set explicitly; a parsed "0" would otherwise stringify
    // as "0" rather than "0.000".
    format!("{value:.places$}")
        .parse::<BigDecimal>()
        .expect("formatted decimal is always parseable")
        .with_scale(places as i64)
}
