use std::{collections::HashMap, fmt, str::FromStr};

use url::Url;

use crate::{
    cookies::{CookieParser, CookieSet},
    headers::Headers,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    HEAD,
    OPTIONS,
    CONNECT,
    DELETE,
    TRACE,
    PATCH,
}

lazy_static! {
    pub static ref VALID_METHODS: HashMap<&'static str, Method> = HashMap::from([
        ("GET", Method::GET),
        ("HEAD", Method::HEAD),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("OPTIONS", Method::OPTIONS),
        ("CONNECT", Method::CONNECT),
        ("DELETE", Method::DELETE),
        ("TRACE", Method::TRACE),
        ("PATCH", Method::PATCH),
    ]);
    pub static ref METHODS_AS_STR: HashMap<Method, &'static str> =
        VALID_METHODS.iter().map(|(k, v)| (*v, *k)).collect();
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", METHODS_AS_STR.get(self).unwrap_or(&"UNKNOWN"))
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub version: String,
    pub headers: Headers,
    pub url: Option<Url>,
    pub body: Vec<u8>,
    cookies: CookieSet,
}

impl Default for Request {
    fn default() -> Self {
        Request::new(Method::GET, "/")
    }
}

impl Request {
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        let mut request = Request {
            method,
            version: "HTTP/1.1".into(),
            headers: Headers::new(),
            url: None,
            body: vec![],
            cookies: CookieSet::new(),
        };

        request.set_path(path);
        request
    }

    pub fn set_path(&mut self, path: impl AsRef<str>) {
        if let Ok(mut url) = Url::from_str("http://UNSET") {
            url.set_path(path.as_ref());
            self.url = Some(url);
        }
    }

    pub fn path(&self) -> String {
        self.url
            .as_ref()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|| "/".into())
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    /// Raw values of every `Cookie` header line, in arrival order.
    pub fn cookie_lines(&self) -> Option<&Vec<String>> {
        self.headers.get("cookie")
    }

    /// Rebuilds the cookie set from this request's `Cookie` headers.
    pub fn load_cookies(&mut self, parser: &CookieParser) {
        self.cookies = parser.parse_opt(self.headers.get("cookie"));
        debug!(
            "parsed {} cookie(s) from {} header line(s)",
            self.cookies.len(),
            self.cookie_lines().map(|l| l.len()).unwrap_or(0)
        );
    }

    /// Cookies parsed when the request was read off the wire.
    pub fn cookies(&self) -> &CookieSet {
        &self.cookies
    }

    pub fn serialize(&self) -> String {
        let mut r = format!("{} {} {}\r\n", self.method, self.path(), self.version);

        r.push_str(&self.headers.serialize());
        if !self.body.is_empty() {
            r.push_str(format!("Content-Length: {}\r\n", self.body.len()).as_str());
        }
        r.push_str("\r\n");
        r.push_str(String::from_utf8_lossy(&self.body).as_ref());

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ComplianceMode;

    #[test]
    fn load_cookies() {
        let mut request = Request::default();
        assert!(request.cookies().is_empty());

        request.headers.add("Cookie", "COOKIE1=ABC");
        request.headers.add("Cookie", "COOKIE2=123");
        request.load_cookies(&CookieParser::new(ComplianceMode::Rfc6265));

        assert_eq!(
            request.cookies().pairs(),
            vec![("COOKIE1", "ABC"), ("COOKIE2", "123")]
        );

        // Same result every time it's read.
        assert_eq!(request.cookies(), request.cookies());
    }

    #[test]
    fn serialize() {
        let mut request = Request::new(Method::GET, "/echo");
        request.headers.add("Cookie", "a=1");
        assert_eq!(request.serialize(), "GET /echo HTTP/1.1\r\ncookie: a=1\r\n\r\n");
    }
}
