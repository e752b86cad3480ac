/// Checks if a host belongs to the target site
///
/// A host matches when it equals the site host or is any subdomain of it:
/// `"litres.ru"` matches `"litres.ru"`, `"www.litres.ru"` and `"m.www.litres.ru"`,
/// but not `"notlitres.ru"` or `"litres.ru.example.com"`. Both arguments are
/// compared case-insensitively.
///
/// # Examples
///
/// ```
/// use litres_harvest::url::host_matches;
///
/// assert!(host_matches("litres.ru", "www.litres.ru"));
/// assert!(host_matches("litres.ru", "LITRES.RU"));
/// assert!(!host_matches("litres.ru", "mylitres.ru"));
/// ```
pub fn host_matches(site_host: &str, candidate: &str) -> bool {
    let site = site_host.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    if site.is_empty() {
        return false;
    }

    candidate == site || candidate.ends_with(&format!(".{}", site))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(host_matches("litres.ru", "litres.ru"));
        assert!(host_matches("127.0.0.1", "127.0.0.1"));
    }

    #[test]
    fn test_subdomains_match() {
        assert!(host_matches("litres.ru", "www.litres.ru"));
        assert!(host_matches("litres.ru", "m.www.litres.ru"));
    }

    #[test]
    fn test_partial_names_do_not_match() {
        assert!(!host_matches("litres.ru", "mylitres.ru"));
        assert!(!host_matches("litres.ru", "litres.ru.evil.com"));
        assert!(!host_matches("litres.ru", "litres.com"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(host_matches("LitRes.ru", "WWW.LITRES.RU"));
    }

    #[test]
    fn test_empty_strings() {
        assert!(!host_matches("", "litres.ru"));
        assert!(!host_matches("litres.ru", ""));
        assert!(!host_matches("", ""));
    }
}
