use url::Url;

/// Reduces a parsed URL to its canonical book link form
///
/// The canonical form is `scheme://host[:port]/path`: query string and fragment
/// are discarded, the host is lowercased by the URL parser and the path is kept
/// exactly as parsed. The mapping is total, every parsed URL has exactly one
/// canonical form, which makes it the deduplication key for discovered links.
///
/// # Examples
///
/// ```
/// use litres_harvest::url::canonicalize_url;
/// use url::Url;
///
/// let url = Url::parse("https://WWW.LitRes.ru/book/a/b-123/?utm_source=x#reviews").unwrap();
/// assert_eq!(canonicalize_url(&url), "https://www.litres.ru/book/a/b-123/");
/// ```
pub fn canonicalize_url(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    // Credentials never identify a book
    let _ = canonical.set_username("");
    let _ = canonical.set_password(None);
    canonical.to_string()
}
