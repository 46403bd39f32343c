use bytesize::ByteSize;

/// Renders a byte count with 1000-based units, e.g. `1.5 kB`.
pub fn format_size_si(bytes: u64) -> String {
    ByteSize(bytes).display().si().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_sizes_stay_in_bytes() {
        assert_eq!(format_size_si(0), "0 B");
        assert_eq!(format_size_si(999), "999 B");
    }

    #[test]
    fn test_uses_decimal_units() {
        assert!(format_size_si(1_500).starts_with("1.5"));
        assert!(format_size_si(1_500).ends_with("kB"));
        assert!(format_size_si(2_000_000).starts_with("2.0"));
        assert!(format_size_si(2_000_000).ends_with("MB"));
    }
}
