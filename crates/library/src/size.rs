//! Human-readable byte counts.

/// Binary unit labels, smallest first.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units and one decimal place.
///
/// The first unit where the magnitude drops below 1024 is used; anything
/// larger than that stays in TB.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} TB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(10), "10.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
    }

    #[test]
    fn test_format_size_kb() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn test_format_size_mb_gb() {
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.0 GB");
    }

    #[test]
    fn test_format_size_tb_and_beyond() {
        assert_eq!(format_size(1_099_511_627_776), "1.0 TB");
        assert_eq!(format_size(2048 * 1_099_511_627_776), "2048.0 TB");
    }
}
