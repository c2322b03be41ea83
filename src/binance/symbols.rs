use super::types::SymbolInfo;

/// Keep spot pairs that are trading, quoted in `quote_asset`, and whose
/// ticker contains none of `excluded_markers`. Listing order is preserved.
pub fn filter_tradable_symbols(
    symbols: &[SymbolInfo],
    quote_asset: &str,
    excluded_markers: &[String],
) -> Vec<String> {
    symbols
        .iter()
        .filter(|s| s.is_trading())
        .filter(|s| s.quote_asset.eq_ignore_ascii_case(quote_asset))
        .filter(|s| !excluded_markers.iter().any(|m| s.symbol.contains(m.as_str())))
        .map(|s| s.symbol.clone())
        .collect()
}
