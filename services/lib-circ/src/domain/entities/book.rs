//! 馆藏图书实体

use campus_common::{BookId, UserId};
use campus_domain_core::{AggregateRoot, AuditInfo, Entity};
use campus_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Isbn;

/// 图书可借状态（由可借副本数派生，不单独存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    Unavailable,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// 馆藏图书
///
/// 不变式：available_copies <= total_copies，借出减一、归还加一，
/// 由存储侧的条件更新保证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub total_copies: u32,
    pub available_copies: u32,
    pub audit: AuditInfo,
}

impl Book {
    /// 登记新书，初始可借副本数等于馆藏总数
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: Isbn,
        total_copies: u32,
        created_by: Option<UserId>,
    ) -> AppResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::validation("Book title is required"));
        }
        if total_copies == 0 {
            return Err(AppError::validation("Total copies must be at least 1"));
        }

        Ok(Self {
            id: BookId::new(),
            title,
            author: author.into(),
            isbn,
            total_copies,
            available_copies: total_copies,
            audit: AuditInfo::new(created_by),
        })
    }

    /// 从存储行重建，入库边界处校验不变式
    pub fn from_parts(
        id: BookId,
        title: String,
        author: String,
        isbn: Isbn,
        total_copies: u32,
        available_copies: u32,
        audit: AuditInfo,
    ) -> AppResult<Self> {
        if available_copies > total_copies {
            return Err(AppError::internal(format!(
                "book {} has {} available copies out of {} total",
                id, available_copies, total_copies
            )));
        }
        Ok(Self {
            id,
            title,
            author,
            isbn,
            total_copies,
            available_copies,
            audit,
        })
    }

    pub fn status(&self) -> BookStatus {
        if self.available_copies > 0 {
            BookStatus::Available
        } else {
            BookStatus::Unavailable
        }
    }
}

impl Entity for Book {
    type Id = BookId;

    fn id(&self) -> &BookId {
        &self.id
    }
}

impl AggregateRoot for Book {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isbn() -> Isbn {
        Isbn::new("9784297139938").unwrap()
    }

    #[test]
    fn new_book_starts_fully_available() {
        let book = Book::new("Rust in Action", "Tim McNamara", isbn(), 4, None).unwrap();
        assert_eq!(book.available_copies, 4);
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn empty_title_or_zero_copies_rejected() {
        assert!(Book::new("  ", "a", isbn(), 1, None).is_err());
        assert!(Book::new("t", "a", isbn(), 0, None).is_err());
    }

    #[test]
    fn status_flips_when_no_copies_left() {
        let mut book = Book::new("t", "a", isbn(), 1, None).unwrap();
        book.available_copies = 0;
        assert_eq!(book.status(), BookStatus::Unavailable);
    }

    #[test]
    fn from_parts_rejects_corrupt_counts() {
        let book = Book::new("t", "a", isbn(), 2, None).unwrap();
        let result = Book::from_parts(
            book.id,
            book.title,
            book.author,
            book.isbn,
            2,
            3,
            book.audit,
        );
        assert!(result.is_err());
    }
}
