//! Status replies. A status whose first byte is `'0'` reports success.

pub const SUCCESS_MARKER: char = '0';

pub const OK: &str = "0 OK";
pub const NOT_INSERTED: &str = "1 Not Insert";

pub fn is_success(status: &str) -> bool {
    status.starts_with(SUCCESS_MARKER)
}

pub fn failure(reason: impl std::fmt::Display) -> String {
    format!("1 {}", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_marker() {
        assert!(is_success(OK));
        assert!(is_success("0"));
        assert!(!is_success(NOT_INSERTED));
        assert!(!is_success(""));
        assert_eq!(failure("Table Not Exist"), "1 Table Not Exist");
    }
}
