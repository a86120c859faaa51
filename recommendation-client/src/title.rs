use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // One or more "(1999)" groups at the very end, each optionally preceded by whitespace.
    static ref YEAR_SUFFIX: Regex = Regex::new(r"(?:\s*\([0-9]{4}\))+$").unwrap();
}

/// Canonical form of a title used to match recommendations across sources.
///
/// Strips the trailing release year and lowercases the rest, so
/// `"Inception (2010)"` and `"inception"` compare equal.
pub fn normalize(title: &str) -> String {
    YEAR_SUFFIX.replace(title, "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_suffix_is_removed() {
        assert_eq!(normalize("Inception (2010)"), normalize("inception"));
        assert_eq!(normalize("Scream (1996)"), "scream");
        assert_eq!(normalize("Alien(1979)"), "alien");
        assert_eq!(normalize("Heat \t(1995)"), "heat");
    }

    #[test]
    fn test_only_trailing_four_digit_years() {
        assert_eq!(normalize("1984 (1984)"), "1984");
        assert_eq!(normalize("Blade Runner 2049"), "blade runner 2049");
        assert_eq!(normalize("(500) Days of Summer (2009)"), "(500) days of summer");
        assert_eq!(normalize("Movie (12345)"), "movie (12345)");
        assert_eq!(normalize("Movie (2010) "), "movie (2010) ");
        assert_eq!(normalize("Movie (2010) Redux"), "movie (2010) redux");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let titles = [
            "Inception (2010)",
            "Double Year (1999) (2001)",
            "  Spaced Out  (2003)",
            "ÉCOLE (2004)",
            "",
            "(2020)",
            "Plain",
            "Movie (٢٠١٠)",
        ];
        for title in titles {
            let once = normalize(title);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", title);
        }
        assert_eq!(normalize("Double Year (1999) (2001)"), "double year");
        assert_eq!(normalize("(2020)"), "");
    }
}
