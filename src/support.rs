
/// Counted string. First byte is the number of
/// characters that follow. A count exceeding the
/// available bytes is clamped.
pub(crate) fn counted_string(bytes: &[u8], ignore_null: bool) -> String {
    let Some((count, rest)) = bytes.split_first() else {
        return String::new();
    };
    let end = (*count as usize).min(rest.len());
    match ignore_null {
        true => rest[.. end].iter()
            .filter_map(|b| if b != &0 {Some(*b as char)} else {None})
            .collect(),
        false => rest[.. end].iter()
            .map(|b| *b as char)
            .collect(),
    }
}

/// Fixed-point value from its two 16-bit halves.
///
/// Integer and fraction are joined as decimal text,
/// `"{integer}.{fraction}"`, and parsed back, i.e. the
/// fraction field is read as decimal digits rather than
/// as a 1/65536 fraction: `(72, 0)` is `72.0`, `(1, 5)` is `1.5`.
pub(crate) fn fixed_point_decimal(integer: u16, fraction: u16) -> f64 {
    format!("{integer}.{fraction}")
        .parse::<f64>()
        .unwrap_or(integer as f64)
}

/// Lower case, zero padded hex for each byte.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
