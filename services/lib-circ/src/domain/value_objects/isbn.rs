//! ISBN 值对象

use campus_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// ISBN（入库边界处校验，存储规范化后的纯数字形式）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Isbn(String);

impl Isbn {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if normalized.is_empty() {
            return Err(AppError::validation("ISBN is required"));
        }

        // 仅 ISBN-10 允许末位校验位为 X
        let is_isbn10 = normalized.len() == 10;
        let digits_ok = normalized
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || (is_isbn10 && i == 9 && (c == 'X' || c == 'x')));

        if !digits_ok || !(normalized.len() == 10 || normalized.len() == 13) {
            return Err(AppError::validation(format!("Invalid ISBN: {}", raw)));
        }

        Ok(Self(normalized.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_isbn13_with_hyphens() {
        let isbn = Isbn::new("978-4-297-13993-8").unwrap();
        assert_eq!(isbn.as_str(), "9784297139938");
    }

    #[test]
    fn accepts_isbn10_with_check_x() {
        let isbn = Isbn::new("0-8044-2957-X").unwrap();
        assert_eq!(isbn.as_str(), "080442957X");
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        assert!(Isbn::new("").is_err());
        assert!(Isbn::new("12345").is_err());
        assert!(Isbn::new("not-an-isbn-at-all").is_err());
    }

    #[test]
    fn rejects_x_outside_isbn10_check_digit() {
        // X 只允许作为 ISBN-10 的末位校验位
        assert!(Isbn::new("978429713X938").is_err());
        assert!(Isbn::new("080442957X123").is_err());
        assert!(Isbn::new("X804429571").is_err());
    }
}
