use url::{ParseError, Url};

/// Parse a base URL and make sure it can be joined with relative paths.
///
/// `Url::join` drops the last path segment unless the base ends with a slash,
/// so `http://host/api` + `recommend` would become `http://host/recommend`.
pub fn parse_base(base: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(base.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Join `path` onto `base`, ignoring any leading slash on `path`.
pub fn join(base: &Url, path: &str) -> Result<Url, ParseError> {
    base.join(path.trim_start_matches('/'))
}
