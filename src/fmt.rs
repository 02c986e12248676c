/// Group digits the Indian way: last three, then pairs (1,23,45,678).
fn group_indian(int_part: &str) -> String {
    let len = int_part.len();
    if len <= 3 {
        return int_part.to_string();
    }
    let (head, tail) = int_part.split_at(len - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Format a float as rupees with Indian grouping: Rs.1,23,456.78
pub fn rupees(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let grouped = group_indian(int_part);
    if val < 0.0 && cents != "0.00" {
        format!("-Rs.{grouped}.{dec_part}")
    } else {
        format!("Rs.{grouped}.{dec_part}")
    }
}

/// Credits carry an explicit plus sign.
pub fn signed_rupees(val: f64) -> String {
    if val >= 0.0 {
        format!("+{}", rupees(val))
    } else {
        rupees(val)
    }
}

/// `YYYY-MM-DD` to `DD/MM/YYYY`; anything else is returned unchanged.
pub fn display_date(iso: &str) -> String {
    chrono::NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| iso.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupee_formatting() {
        assert_eq!(rupees(1234.56), "Rs.1,234.56");
        assert_eq!(rupees(123456.78), "Rs.1,23,456.78");
        assert_eq!(rupees(12345678.0), "Rs.1,23,45,678.00");
        assert_eq!(rupees(-500.0), "-Rs.500.00");
        assert_eq!(rupees(0.0), "Rs.0.00");
        assert_eq!(rupees(-0.001), "Rs.0.00");
    }

    #[test]
    fn test_signed_rupees() {
        assert_eq!(signed_rupees(200.0), "+Rs.200.00");
        assert_eq!(signed_rupees(-50.5), "-Rs.50.50");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-03-15"), "15/03/2024");
        assert_eq!(display_date("garbage"), "garbage");
    }
}
