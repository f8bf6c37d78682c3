use crate::config::SessionSettings;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Something that can hand out the current `Cookie` header
pub trait CookieSource: Send + Sync {
    fn cookie_header(&self) -> Option<String>;
}

/// Cookie header fixed at construction (config file, CLI flag)
#[derive(Debug, Clone, Default)]
pub struct StaticCookies {
    header: Option<String>,
}

impl StaticCookies {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: Some(header.into()) }
    }

    pub fn from_optional(header: Option<String>) -> Self {
        Self { header }
    }
}

impl CookieSource for StaticCookies {
    fn cookie_header(&self) -> Option<String> {
        self.header.clone()
    }
}

/// No cookies at all; mutating requests go out without a CSRF header
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCookies;

impl CookieSource for NoCookies {
    fn cookie_header(&self) -> Option<String> {
        None
    }
}

/// Compiled matcher for one cookie name
///
/// Matches `name=value` either at the start or after a `;`, with optional
/// whitespace around the name and `=`. Empty values count as absent.
#[derive(Debug, Clone)]
pub struct CookiePattern {
    name: String,
    re: Regex,
}

impl CookiePattern {
    pub fn new(name: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!(r"(?:^|;)\s*{}\s*=\s*([^;]+)", regex::escape(name)))?;
        Ok(Self { name: name.to_string(), re })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find this cookie's value in a `Cookie` header string
    pub fn extract(&self, header: &str) -> Option<String> {
        self.re
            .captures(header)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Per-request header configuration
///
/// Built fresh for every mutating request so that a cookie rotated between
/// requests is picked up.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    headers: HeaderMap,
}

impl RequestConfig {
    pub fn build(cookies: &dyn CookieSource, csrf_cookie: &CookiePattern, session: &SessionSettings) -> Self {
        let mut headers = HeaderMap::new();

        let token = cookies
            .cookie_header()
            .and_then(|header| csrf_cookie.extract(&header));

        match token {
            Some(token) => {
                match (
                    HeaderName::from_bytes(session.csrf_header.as_bytes()),
                    HeaderValue::from_str(&token),
                ) {
                    (Ok(name), Ok(value)) => {
                        headers.insert(name, value);
                    }
                    _ => {
                        tracing::warn!(
                            "CSRF token or header name is not a valid header, sending request without {}",
                            session.csrf_header
                        );
                    }
                }
            }
            None => {
                tracing::debug!("No {} cookie present, omitting CSRF header", csrf_cookie.name());
            }
        }

        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn has_csrf(&self, session: &SessionSettings) -> bool {
        self.headers.contains_key(session.csrf_header.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cookie_positions() {
        let csrf = CookiePattern::new("csrftoken").unwrap();
        assert_eq!(csrf.extract("csrftoken=abc").as_deref(), Some("abc"));
        assert_eq!(
            csrf.extract("sessionid=xyz; csrftoken=abc; theme=dark").as_deref(),
            Some("abc")
        );
        assert_eq!(csrf.extract("a=1;csrftoken = def").as_deref(), Some("def"));
    }

    #[test]
    fn test_extract_cookie_requires_exact_name() {
        let csrf = CookiePattern::new("csrftoken").unwrap();
        assert_eq!(csrf.extract("xcsrftoken=abc"), None);
        assert_eq!(csrf.extract("sessionid=xyz"), None);
        assert_eq!(csrf.extract(""), None);
    }

    #[test]
    fn test_cookie_name_is_escaped() {
        let pattern = CookiePattern::new("a.b(c").unwrap();
        assert_eq!(pattern.name(), "a.b(c");
        assert_eq!(pattern.extract("a.b(c=1").as_deref(), Some("1"));
        assert_eq!(pattern.extract("axb(c=1"), None);
    }

    #[test]
    fn test_pattern_reused_across_requests() {
        let session = SessionSettings::default();
        let csrf = CookiePattern::new(&session.csrf_cookie_name).unwrap();

        let first = RequestConfig::build(&StaticCookies::new("csrftoken=one"), &csrf, &session);
        let second = RequestConfig::build(&StaticCookies::new("csrftoken=two"), &csrf, &session);

        assert_eq!(first.headers().get("x-csrftoken").unwrap(), "one");
        assert_eq!(second.headers().get("x-csrftoken").unwrap(), "two");
    }

    #[test]
    fn test_request_config_with_token() {
        let session = SessionSettings::default();
        let csrf = CookiePattern::new(&session.csrf_cookie_name).unwrap();
        let config = RequestConfig::build(&StaticCookies::new("csrftoken=tok123"), &csrf, &session);

        assert!(config.has_csrf(&session));
        assert_eq!(config.headers().get("x-csrftoken").unwrap(), "tok123");
    }

    #[test]
    fn test_request_config_without_cookie() {
        let session = SessionSettings::default();
        let csrf = CookiePattern::new(&session.csrf_cookie_name).unwrap();
        let config = RequestConfig::build(&NoCookies, &csrf, &session);

        assert!(!config.has_csrf(&session));
        assert!(config.headers().is_empty());
    }

    #[test]
    fn test_invalid_header_value_is_dropped() {
        let session = SessionSettings::default();
        let csrf = CookiePattern::new(&session.csrf_cookie_name).unwrap();
        let config = RequestConfig::build(&StaticCookies::new("csrftoken=bad\u{7f}value"), &csrf, &session);

        assert!(!config.has_csrf(&session));
    }
}
