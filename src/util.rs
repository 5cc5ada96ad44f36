pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

pub fn truncate_label(label: &str) -> String {
    const MAX_CHARS: usize = 40;
    const KEPT_CHARS: usize = 37;

    if label.chars().count() <= MAX_CHARS {
        return label.to_owned();
    }

    let mut truncated = label.chars().take(KEPT_CHARS).collect::<String>();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_reports_small_values_as_plain_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn format_bytes_scales_to_binary_units() {
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn truncate_label_keeps_labels_up_to_forty_chars() {
        let label = "x".repeat(40);
        assert_eq!(
            truncate_label(&label),
            label,
            "a 40-char label must pass through unchanged"
        );
    }

    #[test]
    fn truncate_label_cuts_long_labels_to_thirty_seven_plus_ellipsis() {
        let label = "x".repeat(50);
        let truncated = truncate_label(&label);

        assert_eq!(
            truncated.chars().count(),
            38,
            "expected 37 kept characters plus one ellipsis"
        );
        assert!(truncated.starts_with(&"x".repeat(37)));
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn truncate_label_counts_characters_not_bytes() {
        let label = "é".repeat(41);
        let truncated = truncate_label(&label);

        assert_eq!(truncated.chars().count(), 38);
        assert!(truncated.ends_with('…'));
    }
}
