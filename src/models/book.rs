//! Book record models.
//!
//! `Book` is the wire shape used for both request and response bodies.
//! `NewBook` is a `Book` that passed validation and is ready to be inserted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator used to store the page sequence in a single text column.
pub const PAGE_SEPARATOR: &str = "\n";

/// A book record as exchanged over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Assigned by the database on creation. Ignored when supplied on create.
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: i32,
    /// Pages, in reading order.
    pub content: Vec<String>,
    pub summary: String,
}

/// A validated book without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: i32,
    pub content: Vec<String>,
    pub summary: String,
}

/// Semantic validation failures for a book payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("page {index} contains a line break; pages are stored one per line")]
    LineBreakInPage { index: usize },
}

impl TryFrom<Book> for NewBook {
    type Error = ValidationError;

    fn try_from(book: Book) -> Result<Self, Self::Error> {
        if book.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if let Some(index) = book
            .content
            .iter()
            .position(|page| page.contains(['\n', '\r']))
        {
            return Err(ValidationError::LineBreakInPage { index });
        }

        Ok(Self {
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            publication_year: book.publication_year,
            content: book.content,
            summary: book.summary,
        })
    }
}

impl NewBook {
    /// Attach the id assigned by the database.
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id: Some(id),
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            publication_year: self.publication_year,
            content: self.content,
            summary: self.summary,
        }
    }

    /// The page sequence in its stored text form.
    pub fn encoded_content(&self) -> String {
        encode_content(&self.content)
    }
}

/// Join pages into the stored text form.
pub fn encode_content(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

/// Split stored text back into pages.
///
/// Empty text yields no pages. A trailing `\r` is dropped from every line so
/// rows written with CRLF line endings decode to the same pages.
pub fn decode_content(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(PAGE_SEPARATOR)
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Requested page range does not fit the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page range {start}..{end} is out of bounds for {len} pages")]
pub struct PageRangeError {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

/// Return pages `start..end` (end exclusive).
pub fn read_pages(content: &[String], start: usize, end: usize) -> Result<&[String], PageRangeError> {
    content.get(start..end).ok_or(PageRangeError {
        start,
        end,
        len: content.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            id: None,
            title: "Laskar Pelangi".to_string(),
            author: "Andrea Hirata".to_string(),
            publisher: "Bentang Pustaka".to_string(),
            publication_year: 2005,
            content: vec!["page one".to_string(), "page two".to_string()],
            summary: "Ten children on Belitung".to_string(),
        }
    }

    #[test]
    fn test_deserialize_without_id() {
        let json = r#"{
            "title": "T",
            "author": "A",
            "publisher": "P",
            "publication_year": 1999,
            "content": ["one", "two"],
            "summary": "S"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, None);
        assert_eq!(book.content, vec!["one", "two"]);
    }

    #[test]
    fn test_deserialize_missing_title_fails() {
        let json = r#"{
            "author": "A",
            "publisher": "P",
            "publication_year": 1999,
            "content": [],
            "summary": "S"
        }"#;
        let err = serde_json::from_str::<Book>(json).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_deserialize_wrong_type_fails() {
        let json = r#"{
            "title": "T",
            "author": "A",
            "publisher": "P",
            "publication_year": "nineteen",
            "content": [],
            "summary": "S"
        }"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_validation_accepts_sample() {
        let new_book = NewBook::try_from(sample_book()).unwrap();
        assert_eq!(new_book.title, "Laskar Pelangi");
        assert_eq!(new_book.encoded_content(), "page one\npage two");
    }

    #[test]
    fn test_validation_ignores_supplied_id() {
        let mut book = sample_book();
        book.id = Some(99);
        let created = NewBook::try_from(book).unwrap().into_book(7);
        assert_eq!(created.id, Some(7));
    }

    #[test]
    fn test_validation_rejects_blank_title() {
        let mut book = sample_book();
        book.title = "   ".to_string();
        assert_eq!(
            NewBook::try_from(book),
            Err(ValidationError::Empty { field: "title" })
        );
    }

    #[test]
    fn test_validation_rejects_line_break_in_page() {
        let mut book = sample_book();
        book.content.push("first line\nsecond line".to_string());
        assert_eq!(
            NewBook::try_from(book),
            Err(ValidationError::LineBreakInPage { index: 2 })
        );

        let mut book = sample_book();
        book.content[0] = "carriage\rreturn".to_string();
        assert_eq!(
            NewBook::try_from(book),
            Err(ValidationError::LineBreakInPage { index: 0 })
        );
    }

    #[test]
    fn test_content_round_trip() {
        let pages = vec!["page one".to_string(), "page two".to_string()];
        assert_eq!(decode_content(&encode_content(&pages)), pages);

        let with_blank = vec!["".to_string(), "middle".to_string(), "".to_string()];
        assert_eq!(decode_content(&encode_content(&with_blank)), with_blank);
    }

    #[test]
    fn test_encode_uses_page_separator() {
        let pages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let text = encode_content(&pages);
        assert_eq!(text, format!("a{PAGE_SEPARATOR}b{PAGE_SEPARATOR}c"));
        assert_eq!(text.split(PAGE_SEPARATOR).count(), pages.len());
    }

    #[test]
    fn test_decode_empty_text() {
        assert!(decode_content("").is_empty());
        assert!(decode_content(&encode_content(&[])).is_empty());
    }

    #[test]
    fn test_decode_crlf() {
        assert_eq!(decode_content("one\r\ntwo"), vec!["one", "two"]);
    }

    #[test]
    fn test_read_pages_in_range() {
        let content = sample_book().content;
        assert_eq!(read_pages(&content, 0, 1).unwrap(), ["page one"]);
        assert_eq!(read_pages(&content, 0, 2).unwrap().len(), 2);
        assert!(read_pages(&content, 2, 2).unwrap().is_empty());
    }

    #[test]
    fn test_read_pages_out_of_range() {
        let content = sample_book().content;
        let err = read_pages(&content, 1, 3).unwrap_err();
        assert_eq!(err, PageRangeError { start: 1, end: 3, len: 2 });
        assert!(err.to_string().contains("out of bounds"));

        assert!(read_pages(&content, 2, 1).is_err());
    }
}
