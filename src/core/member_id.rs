use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MEMBER_ID_RE: Regex = Regex::new(r"^[A-Z]{3}-\d{4}$").unwrap();
}

// Member-ID codes double as the login username and the bootstrap password, so
// the format is a hard contract, not a display convention.
pub fn is_valid_code(code: &str) -> bool {
    MEMBER_ID_RE.is_match(code)
}

pub fn seed(prefix: &str) -> String {
    format!("{}-0001", prefix)
}

// Increment the numeric suffix of the highest existing code. A missing or
// malformed code falls back to the seed; downstream uniqueness checks catch
// any collision that causes.
pub fn next_code(prefix: &str, latest: Option<&str>) -> String {
    let latest = match latest {
        Some(l) => l,
        None => return seed(prefix),
    };
    let digits = match latest.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('-')) {
        Some(d) => d,
        None => return seed(prefix),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return seed(prefix);
    }
    match digits.parse::<u32>() {
        Ok(n) => format!("{}-{:04}", prefix, n + 1),
        Err(_) => seed(prefix),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seed_when_no_members() {
        assert_eq!(next_code("ZEH", None), "ZEH-0001");
    }

    #[test]
    fn test_increments_numeric_suffix() {
        assert_eq!(next_code("ZEH", Some("ZEH-0047")), "ZEH-0048");
    }

    #[test]
    fn test_keeps_zero_padding() {
        assert_eq!(next_code("ZEH", Some("ZEH-0009")), "ZEH-0010");
        assert_eq!(next_code("ZEH", Some("ZEH-9999")), "ZEH-10000");
    }

    #[test]
    fn test_malformed_latest_falls_back_to_seed() {
        assert_eq!(next_code("ZEH", Some("LEGACY-12")), "ZEH-0001");
        assert_eq!(next_code("ZEH", Some("ZEH-12a")), "ZEH-0001");
        assert_eq!(next_code("ZEH", Some("ZEH-")), "ZEH-0001");
        assert_eq!(next_code("ZEH", Some("ZEH-+47")), "ZEH-0001");
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code("ZEH-0001"));
        assert!(is_valid_code("ABC-9999"));
        assert!(!is_valid_code("zeh-1"));
        assert!(!is_valid_code("ZEH-001"));
        assert!(!is_valid_code("ZEH-00011"));
        assert!(!is_valid_code("ZEHS-0001"));
        assert!(!is_valid_code(" ZEH-0001"));
    }
}
