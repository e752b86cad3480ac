//! Book page extractor
//!
//! Turns the HTML of one book page into a [`BookRecord`]. Extraction is layered:
//!
//! 1. JSON-LD blocks typed `Book` (title, authors, rating, price)
//! 2. UI counters for ratings and reviews, overriding the JSON-LD counts
//! 3. Genre links
//! 4. The characteristics list (age limit, dates, volume, ISBN, rights holder,
//!    download formats)
//! 5. The description, with fallbacks for self-published books
//!
//! Every step is best-effort: a missing or malformed fragment leaves the
//! corresponding field empty and never fails the record.

use crate::record::{BookRecord, OPTIONAL_FIELDS};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;
const MARKS_SELECTOR: &str = r#"[data-testid="book-factoids__marks"]"#;
const REVIEWS_SELECTOR: &str = r#"[data-testid="book-factoids__reviews"] span"#;
const GENRE_SELECTOR: &str = r#"a[data-test="book-genre-link"], a[href*="/genre/"]"#;
const CHARACTERISTICS_SELECTOR: &str = r#"div[data-testid="book-characteristics__wrapper"]"#;
const CHARACTERISTIC_ITEM_SELECTOR: &str = "div.ddd308de";
const CHARACTERISTIC_LABEL_SELECTOR: &str = "div.ae1c618c span";
const DESCRIPTION_SELECTOR: &str = r#"div[data-testid="book-description__text"]"#;
const SHORT_DESCRIPTION_SELECTOR: &str = "div._86af713b";
const LONG_DESCRIPTION_SELECTOR: &str = "div.ac83cc29";

/// Link residue left at the end of collapsible description blocks
const DESCRIPTION_RESIDUE: [&str; 2] = ["Далее", "Свернуть"];

/// Record fields filled from the characteristics list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Characteristic {
    AgeLimit,
    ReleaseDate,
    WrittenDate,
    Pages,
    Isbn,
    CopyrightHolder,
    Formats,
}

/// Label keyword table; the first keyword contained in a label wins
const CHARACTERISTIC_LABELS: [(&str, Characteristic); 7] = [
    ("Возрастное ограничение", Characteristic::AgeLimit),
    ("Дата выхода", Characteristic::ReleaseDate),
    ("Дата написания", Characteristic::WrittenDate),
    ("Объем", Characteristic::Pages),
    ("ISBN", Characteristic::Isbn),
    ("Правообладатель", Characteristic::CopyrightHolder),
    ("Формат скачивания", Characteristic::Formats),
];

/// Extracts a book record from a book page
///
/// Never fails: every field the page does not carry stays `None` (or empty for
/// list fields). The record's `url` is always the `url` argument.
///
/// # Example
///
/// ```
/// use litres_harvest::crawler::extract_book;
///
/// let html = r#"<script type="application/ld+json">
///     {"@type": "Book", "name": "Драконы", "author": {"name": "Иван Петров"}}
/// </script>"#;
///
/// let record = extract_book(html, "https://www.litres.ru/book/ivan/drakony-1/");
/// assert_eq!(record.title.as_deref(), Some("Драконы"));
/// assert_eq!(record.authors, vec!["Иван Петров"]);
/// ```
pub fn extract_book(html: &str, url: &str) -> BookRecord {
    let document = Html::parse_document(html);
    let mut record = BookRecord::new(url);

    apply_structured_data(&document, &mut record);
    apply_counters(&document, &mut record);
    record.genres = extract_genres(&document);
    apply_characteristics(&document, &mut record);
    record.description = extract_description(&document);

    tracing::debug!(
        "Extracted {} of {} fields from {}",
        record.filled_fields(),
        OPTIONAL_FIELDS,
        url
    );

    record
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    found
}

/// Text of an element with each text node trimmed and empty nodes dropped
fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ===== JSON-LD =====

/// Applies every JSON-LD block typed `Book`; later blocks overwrite earlier ones
fn apply_structured_data(document: &Html, record: &mut BookRecord) {
    let Some(sel) = selector(JSON_LD_SELECTOR) else {
        return;
    };

    for script in document.select(&sel) {
        let raw = script.text().collect::<String>();
        let payload: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block on {}: {}", record.url, e);
                continue;
            }
        };

        if let Some(book) = find_book(&payload) {
            apply_book_object(book, record);
        }
    }
}

/// Locates the `Book` object in a JSON-LD payload
///
/// A list payload yields its first `Book` entry; an object payload is used only
/// if it is a `Book` itself or carries one in its `@graph`.
fn find_book(payload: &Value) -> Option<&Value> {
    match payload {
        Value::Array(items) => items.iter().find(|item| is_book(item)),
        Value::Object(map) => {
            if is_book(payload) {
                Some(payload)
            } else {
                match map.get("@graph") {
                    Some(Value::Array(items)) => items.iter().find(|item| is_book(item)),
                    _ => None,
                }
            }
        }
        _ => None,
    }
}

fn is_book(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == "Book",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("Book")),
        _ => false,
    }
}

fn apply_book_object(book: &Value, record: &mut BookRecord) {
    if let Some(title) = book.get("name").and_then(string_of) {
        record.title = Some(title);
    }

    let authors = match book.get("author") {
        Some(Value::Array(items)) => items.iter().filter_map(author_name).collect(),
        Some(author) => author_name(author).into_iter().collect(),
        None => Vec::new(),
    };
    if !authors.is_empty() {
        record.authors = authors;
    }

    if let Some(rating) = book.get("aggregateRating") {
        if let Some(value) = rating.get("ratingValue").and_then(number_of) {
            record.rating = Some(value);
        }
        if let Some(count) = rating.get("ratingCount").and_then(count_of) {
            record.rating_count = Some(count);
        }
    }

    let offer = match book.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };
    if let Some(price) = offer.and_then(|o| o.get("price")).and_then(number_of) {
        record.price = Some(price);
    }
}

fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::Object(_) => author.get("name").and_then(string_of),
        Value::String(_) => string_of(author),
        _ => None,
    }
}

fn string_of(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads a JSON number or a numeric string such as `"4,5"` or `"299.00"`
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => first_integer(s),
        _ => None,
    }
}

// ===== UI counters =====

/// Applies the rating and review counters shown in the page header
///
/// A counter found here overwrites the JSON-LD count.
fn apply_counters(document: &Html, record: &mut BookRecord) {
    let root = document.root_element();

    if let Some(count) = select_first(root, MARKS_SELECTOR)
        .and_then(|el| first_integer(&joined_text(el, "")))
    {
        record.rating_count = Some(count);
    }

    if let Some(count) = select_first(root, REVIEWS_SELECTOR)
        .and_then(|el| first_integer(&joined_text(el, "")))
    {
        record.reviews_count = Some(count);
    }
}

/// First run of ASCII digits after all whitespace (including NBSP) is removed
///
/// Thousands are often separated by narrow spaces: `"1 234 оценки"` reads as 1234.
fn first_integer(text: &str) -> Option<u64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits: String = compact
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ===== Genres =====

fn extract_genres(document: &Html) -> Vec<String> {
    let Some(sel) = selector(GENRE_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&sel)
        .map(|el| joined_text(el, ""))
        .filter(|name| !name.is_empty())
        .collect()
}

// ===== Characteristics =====

fn apply_characteristics(document: &Html, record: &mut BookRecord) {
    let Some(wrapper) = select_first(document.root_element(), CHARACTERISTICS_SELECTOR) else {
        return;
    };
    let (Some(item_sel), Some(span_sel), Some(anchor_sel)) = (
        selector(CHARACTERISTIC_ITEM_SELECTOR),
        selector("span"),
        selector("a"),
    ) else {
        return;
    };

    for item in wrapper.select(&item_sel) {
        let Some(label) = select_first(item, CHARACTERISTIC_LABEL_SELECTOR) else {
            continue;
        };
        let Some(value) = item
            .select(&span_sel)
            .last()
            .map(|span| joined_text(span, ""))
            .and_then(non_empty)
        else {
            continue;
        };

        let label = joined_text(label, "");
        let Some(field) = classify_label(&label) else {
            tracing::trace!("Ignoring characteristic '{}' on {}", label, record.url);
            continue;
        };

        match field {
            Characteristic::AgeLimit => record.age_limit = Some(value),
            Characteristic::ReleaseDate => record.release_date = Some(value),
            Characteristic::WrittenDate => record.written_date = Some(value),
            Characteristic::Pages => record.pages = Some(value),
            Characteristic::Isbn => record.isbn = Some(value),
            Characteristic::CopyrightHolder => record.copyright_holder = Some(value),
            Characteristic::Formats => {
                record.formats = item
                    .select(&anchor_sel)
                    .map(|a| joined_text(a, ""))
                    .filter(|f| !f.is_empty())
                    .collect();
            }
        }
    }
}

fn classify_label(label: &str) -> Option<Characteristic> {
    CHARACTERISTIC_LABELS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, field)| *field)
}

// ===== Description =====

/// Resolves the description through its fallback chain
///
/// The official description block wins; self-published books carry a short
/// or a long paragraph block instead.
fn extract_description(document: &Html) -> Option<String> {
    let root = document.root_element();

    let text = select_first(root, DESCRIPTION_SELECTOR)
        .map(|el| joined_text(el, " "))
        .and_then(non_empty)
        .or_else(|| paragraph_text(root, SHORT_DESCRIPTION_SELECTOR))
        .or_else(|| paragraph_text(root, LONG_DESCRIPTION_SELECTOR))?;

    non_empty(strip_residue(&text).to_string())
}

fn paragraph_text(root: ElementRef<'_>, block_css: &str) -> Option<String> {
    let block = select_first(root, block_css)?;
    let p_sel = selector("p")?;

    let text = block
        .select(&p_sel)
        .map(|p| joined_text(p, " "))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(text)
}

/// Removes a trailing "Далее"/"Свернуть" toggle label
fn strip_residue(text: &str) -> &str {
    let trimmed = text.trim_end();
    DESCRIPTION_RESIDUE
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed)
        .trim()
}
