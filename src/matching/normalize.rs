use unicode_normalization::UnicodeNormalization;

/// Profile URL prefixes stripped by [`clean_handle`], lowercase
const PROFILE_PREFIXES: [&str; 8] = [
    "https://www.twitter.com/",
    "https://twitter.com/",
    "https://www.x.com/",
    "https://x.com/",
    "http://www.twitter.com/",
    "http://twitter.com/",
    "http://www.x.com/",
    "http://x.com/",
];

/// Reduce a string to lowercase ASCII alphanumerics.
///
/// The input is lowercased and put through NFKD compatibility decomposition,
/// so accented letters split into a base letter plus combining marks; the
/// marks and everything else outside `[a-z0-9]` are then dropped.
///
/// # Examples
///
/// ```
/// use handle_resolver::matching::normalize::normalize;
///
/// assert_eq!(normalize("Juan Pérez"), "juanperez");
/// assert_eq!(normalize("@Crypto_Dan!"), "cryptodan");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    s.to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Recover a bare social handle from however it was stored.
///
/// Accepts `@user`, `user`, and `http(s)://(www.)?x.com/user` or
/// `...twitter.com/user` profile URLs (with trailing path segments).
///
/// ```
/// use handle_resolver::matching::normalize::clean_handle;
///
/// assert_eq!(clean_handle(" @alice_eth "), "alice_eth");
/// assert_eq!(clean_handle("https://twitter.com/alice_eth/status/1"), "alice_eth");
/// assert_eq!(clean_handle("https://www.x.com/@alice_eth"), "alice_eth");
/// ```
#[must_use]
pub fn clean_handle(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let mut handle = strip_profile_prefix(trimmed);
    if let Some((head, _)) = handle.split_once('/') {
        handle = head;
    }
    handle.trim_start_matches('@').to_string()
}

fn strip_profile_prefix(handle: &str) -> &str {
    for prefix in PROFILE_PREFIXES {
        let len = prefix.len();
        if handle.len() >= len
            && handle.is_char_boundary(len)
            && handle[..len].eq_ignore_ascii_case(prefix)
        {
            return &handle[len..];
        }
    }
    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_symbols() {
        assert_eq!(normalize("Juan Pérez"), "juanperez");
        assert_eq!(normalize("ÅNGSTRÖM"), "angstrom");
        assert_eq!(normalize("0xAlice_123"), "0xalice123");
        assert_eq!(normalize("🚀 moon.boy 🚀"), "moonboy");
        assert_eq!(normalize("ﬁnance"), "finance");
        assert_eq!(normalize("李小龍"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["Juan Pérez", "@x.com/Foo", "ØRSTED", "", "123 abc", "Zoë_Ω"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_clean_handle_variants() {
        assert_eq!(clean_handle("alice"), "alice");
        assert_eq!(clean_handle("@alice"), "alice");
        assert_eq!(clean_handle("  @alice  "), "alice");
        assert_eq!(clean_handle("http://x.com/alice"), "alice");
        assert_eq!(clean_handle("HTTPS://Twitter.com/Alice?ref=1"), "Alice?ref=1");
        assert_eq!(clean_handle("https://www.twitter.com/alice/"), "alice");
        assert_eq!(clean_handle("x.com/alice"), "x.com");
        assert_eq!(clean_handle(""), "");
        assert_eq!(clean_handle("@"), "");
    }
}
