use chrono::NaiveDate;

/// Format a phone number for display
/// Handles various input formats and normalizes to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
        11 if digits.starts_with('1') => {
            format!("({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..11])
        }
        _ => phone.to_string(),
    }
}

/// Truncate to `max_chars` characters, adding an ellipsis if needed
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional date, "-" when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

/// Format a decimal string as whole dollars with thousands separators
fn format_dollars(amount: &str) -> Option<String> {
    let value = amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())?;
    // `as` saturates, so i64::MIN is reachable; unsigned_abs handles it.
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    Some(format!("{}${}", sign, grouped))
}

/// Salary range label, matching what the backend computes for `salary_range`
pub fn format_salary_range(min: Option<&str>, max: Option<&str>) -> String {
    let min = min.and_then(format_dollars);
    let max = max.and_then(format_dollars);
    match (min, max) {
        (Some(min), Some(max)) => format!("{} - {}", min, max),
        (Some(min), None) => format!("{}+", min),
        (None, Some(max)) => format!("Up to {}", max),
        (None, None) => "Not specified".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("15551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("123"), "123");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Zürich Zürich", 7), "Züri...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 5, 1)), "May 01, 2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_format_salary_range() {
        assert_eq!(
            format_salary_range(Some("90000.00"), Some("120000.00")),
            "$90,000 - $120,000"
        );
        assert_eq!(format_salary_range(Some("85000"), None), "$85,000+");
        assert_eq!(format_salary_range(None, Some("999.50")), "Up to $1,000");
        assert_eq!(format_salary_range(None, Some("abc")), "Not specified");
        assert_eq!(format_salary_range(None, None), "Not specified");
    }

    #[test]
    fn test_format_salary_range_rejects_non_finite() {
        assert_eq!(format_salary_range(Some("-inf"), None), "Not specified");
        assert_eq!(format_salary_range(Some("NaN"), Some("inf")), "Not specified");
        assert_eq!(format_salary_range(Some("-1e30"), None), "-$9,223,372,036,854,775,808+");
    }
}
