//! Book record produced by the book page extractor
//!
//! Every field except `url` is optional; an absent value is the normal outcome of
//! a page that simply does not carry that piece of metadata.

use serde::Serialize;

/// Column order of tabular snapshots; matches the field order of [`BookRecord`]
pub const COLUMNS: [&str; 16] = [
    "url",
    "title",
    "authors",
    "rating",
    "rating_count",
    "reviews_count",
    "price",
    "genres",
    "age_limit",
    "release_date",
    "written_date",
    "pages",
    "isbn",
    "copyright_holder",
    "formats",
    "description",
];

/// Number of fields besides the always-present `url`
pub const OPTIONAL_FIELDS: usize = COLUMNS.len() - 1;

/// Separator used when list fields are flattened into a single cell
pub const LIST_SEPARATOR: &str = ", ";

/// Structured metadata of one book page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookRecord {
    pub url: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub reviews_count: Option<u64>,
    pub price: Option<f64>,
    pub genres: Vec<String>,
    pub age_limit: Option<String>,
    pub release_date: Option<String>,
    pub written_date: Option<String>,
    pub pages: Option<String>,
    pub isbn: Option<String>,
    pub copyright_holder: Option<String>,
    pub formats: Vec<String>,
    pub description: Option<String>,
}

impl BookRecord {
    /// Creates an empty record for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Flattens the record into cells in [`COLUMNS`] order
    ///
    /// Absent values become empty cells and lists are joined with
    /// [`LIST_SEPARATOR`].
    pub fn to_row(&self) -> [String; 16] {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        [
            self.url.clone(),
            opt(&self.title),
            self.authors.join(LIST_SEPARATOR),
            opt(&self.rating),
            opt(&self.rating_count),
            opt(&self.reviews_count),
            opt(&self.price),
            self.genres.join(LIST_SEPARATOR),
            opt(&self.age_limit),
            opt(&self.release_date),
            opt(&self.written_date),
            opt(&self.pages),
            opt(&self.isbn),
            opt(&self.copyright_holder),
            self.formats.join(LIST_SEPARATOR),
            opt(&self.description),
        ]
    }

    /// Number of optional fields that carry a value
    pub fn filled_fields(&self) -> usize {
        self.to_row().iter().skip(1).filter(|cell| !cell.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = BookRecord::new("https://litres.ru/book/x-1/");
        assert_eq!(record.url, "https://litres.ru/book/x-1/");
        assert_eq!(record.filled_fields(), 0);
    }

    #[test]
    fn test_row_follows_column_order() {
        let record = BookRecord {
            url: "https://litres.ru/book/x-1/".to_string(),
            title: Some("Драконы".to_string()),
            authors: vec!["Иван Петров".to_string(), "Анна Смирнова".to_string()],
            rating: Some(4.5),
            rating_count: Some(150),
            genres: vec!["Фэнтези".to_string(), "Приключения".to_string()],
            formats: vec!["fb2".to_string(), "epub".to_string()],
            ..BookRecord::default()
        };

        let row = record.to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "https://litres.ru/book/x-1/");
        assert_eq!(row[1], "Драконы");
        assert_eq!(row[2], "Иван Петров, Анна Смирнова");
        assert_eq!(row[3], "4.5");
        assert_eq!(row[4], "150");
        assert_eq!(row[5], "");
        assert_eq!(row[7], "Фэнтези, Приключения");
        assert_eq!(row[14], "fb2, epub");
        assert_eq!(record.filled_fields(), 6);
    }

    #[test]
    fn test_fully_filled_record_counts_every_optional_field() {
        let text = || Some("x".to_string());
        let record = BookRecord {
            url: "https://litres.ru/book/x-1/".to_string(),
            title: text(),
            authors: vec!["a".to_string()],
            rating: Some(4.0),
            rating_count: Some(1),
            reviews_count: Some(1),
            price: Some(99.0),
            genres: vec!["g".to_string()],
            age_limit: text(),
            release_date: text(),
            written_date: text(),
            pages: text(),
            isbn: text(),
            copyright_holder: text(),
            formats: vec!["fb2".to_string()],
            description: text(),
        };

        assert_eq!(OPTIONAL_FIELDS, 15);
        assert_eq!(record.filled_fields(), OPTIONAL_FIELDS);
    }
}
