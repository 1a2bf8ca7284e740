use chrono::NaiveDate;

/// Format a phone number for display
/// Handles various input formats and normalizes to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ),
        11 if digits.starts_with('1') => format!(
            "({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Parse a `YYYY-MM-DD` date, ignoring any time part that follows it.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let day: String = date.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    match parse_date(date) {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// Format a decimal amount as dollars with thousands separators.
/// Amounts arrive as strings ("1200.50"); anything unparseable is shown as-is.
pub fn format_currency(amount: &str) -> String {
    let Ok(value) = amount.trim().parse::<f64>() else {
        return amount.to_string();
    };
    if !value.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("15551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Priya Sharma", "sharma"));
        assert!(contains_ignore_case("PRIYA@EXAMPLE.COM", "priya@"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Priya", "raj"));
    }

    #[test]
    fn test_parse_and_format_date() {
        assert_eq!(parse_date("2026-02-28"), NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(parse_date("2026-02-28T10:00:00Z"), NaiveDate::from_ymd_opt(2026, 2, 28));
        assert_eq!(parse_date("28/02/2026"), None);
        assert_eq!(format_date("2026-02-28"), "Feb 28, 2026");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("1200.00"), "$1,200.00");
        assert_eq!(format_currency("999.5"), "$999.50");
        assert_eq!(format_currency("1500000"), "$1,500,000.00");
        assert_eq!(format_currency("-42.1"), "-$42.10");
        assert_eq!(format_currency("n/a"), "n/a");
    }
}
