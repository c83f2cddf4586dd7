//! Builds the ordered set of cookies for a request from every `Cookie` header
//! line it carried.
use std::{collections::HashSet, slice};

use serde::Serialize;

use crate::{
    compliance::ComplianceMode,
    cookie::Cookie,
    tokenizer::{self, Separators, Token},
};

/// The cookies of one request, in first-seen order with unique names.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CookieSet {
    cookies: Vec<Cookie>,
}

impl CookieSet {
    pub fn new() -> Self {
        CookieSet { cookies: vec![] }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|c| c.value())
    }

    pub fn iter(&self) -> slice::Iter<'_, Cookie> {
        self.cookies.iter()
    }

    pub fn as_slice(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.cookies.iter().map(|c| c.pair()).collect()
    }
}

impl<'a> IntoIterator for &'a CookieSet {
    type Item = &'a Cookie;
    type IntoIter = slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}

impl IntoIterator for CookieSet {
    type Item = Cookie;
    type IntoIter = std::vec::IntoIter<Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.into_iter()
    }
}

/// Accumulates cookies across header lines.
struct Builder {
    mode: ComplianceMode,
    cookies: Vec<Cookie>,
    seen: HashSet<String>,
    version: Option<u32>,

    // Whether the last real pair was kept. Attributes that follow a dropped
    // duplicate must not land on the earlier cookie.
    last_kept: bool,
}

impl Builder {
    fn new(mode: ComplianceMode) -> Self {
        Builder {
            mode,
            cookies: vec![],
            seen: HashSet::new(),
            version: None,
            last_kept: false,
        }
    }

    fn push(&mut self, token: Token) {
        if token.is_attribute() {
            self.push_attribute(token);
            return;
        }

        if self.seen.contains(&token.key) {
            debug!("ignoring duplicate cookie {}", token.key);
            self.last_kept = false;
            return;
        }

        self.seen.insert(token.key.clone());
        self.cookies
            .push(Cookie::new(token.key, token.value).with_version(self.version));
        self.last_kept = true;
    }

    fn push_attribute(&mut self, token: Token) {
        if self.mode == ComplianceMode::Rfc6265 {
            debug!("stripping legacy attribute {} in RFC6265 mode", token.key);
        }

        let name = token.key[1..].to_ascii_lowercase();
        if name == "version" {
            self.version = token.value.parse::<u32>().ok();
            return;
        }

        let last = match self.cookies.last_mut() {
            Some(last) if self.last_kept => last,
            _ => {
                debug!("attribute {} has no cookie to describe", token.key);
                return;
            }
        };

        let attributes = last.attributes_mut();
        match name.as_str() {
            "path" => attributes.path = Some(token.value),
            "domain" => attributes.domain = Some(token.value),
            "port" => attributes.port = Some(token.value),
            _ => debug!("discarding unknown cookie attribute {}", token.key),
        }
    }

    fn build(self) -> CookieSet {
        CookieSet {
            cookies: self.cookies,
        }
    }
}

/// Parses Cookie header lines under a fixed compliance mode.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CookieParser {
    mode: ComplianceMode,
}

impl CookieParser {
    pub fn new(mode: ComplianceMode) -> Self {
        CookieParser { mode }
    }

    pub fn mode(&self) -> ComplianceMode {
        self.mode
    }

    /// Parse every header line, in the order they arrived. Lines are treated
    /// as if their pairs had been joined into one header. Duplicate names keep
    /// the first value seen.
    pub fn parse<I, S>(&self, lines: I) -> CookieSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<S> = lines.into_iter().collect();
        let separators = Separators::detect(&lines, self.mode);
        let mut builder = Builder::new(self.mode);

        for line in &lines {
            for token in tokenizer::tokenize_with(line.as_ref(), separators) {
                builder.push(token);
            }
        }

        builder.build()
    }

    /// Like `parse`, but an absent header set yields no cookies.
    pub fn parse_opt<I, S>(&self, lines: Option<I>) -> CookieSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match lines {
            Some(lines) => self.parse(lines),
            None => CookieSet::new(),
        }
    }
}

pub fn parse_cookies<I, S>(lines: I, mode: ComplianceMode) -> CookieSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CookieParser::new(mode).parse(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_applies_to_following_cookies() {
        let cookies = parse_cookies(
            [r#"$Version="1"; a=1; $Path="/app"; $Domain=".example.com"; b=2"#],
            ComplianceMode::Legacy,
        );

        assert_eq!(cookies.pairs(), vec![("a", "1"), ("b", "2")]);

        let a = cookies.get("a").unwrap();
        assert_eq!(a.version(), Some(1));
        assert_eq!(a.path(), Some("/app"));
        assert_eq!(a.domain(), Some(".example.com"));

        let b = cookies.get("b").unwrap();
        assert_eq!(b.version(), Some(1));
        assert_eq!(b.path(), None);
    }

    #[test]
    fn attribute_before_any_cookie() {
        let cookies = parse_cookies([r#"$Path="/"; a=1"#], ComplianceMode::Legacy);
        assert_eq!(cookies.pairs(), vec![("a", "1")]);
        assert_eq!(cookies.get("a").unwrap().path(), None);
    }

    #[test]
    fn attribute_after_duplicate() {
        let cookies = parse_cookies(
            [r#"a=1; $Path="/one"; a=2; $Path="/two""#],
            ComplianceMode::Legacy,
        );
        assert_eq!(cookies.pairs(), vec![("a", "1")]);
        assert_eq!(cookies.get("a").unwrap().path(), Some("/one"));
    }

    #[test]
    fn attribute_names_ignore_case() {
        let cookies = parse_cookies(["$VERSION=1; a=1; $path=/x"], ComplianceMode::Legacy);
        let a = cookies.get("a").unwrap();
        assert_eq!(a.version(), Some(1));
        assert_eq!(a.path(), Some("/x"));
    }

    #[test]
    fn unknown_attribute() {
        let cookies = parse_cookies(["a=1; $Secure=1; b=2"], ComplianceMode::Rfc6265);
        assert_eq!(cookies.pairs(), vec![("a", "1"), ("b", "2")]);
        assert!(cookies.get("a").unwrap().attributes().is_empty());
    }

    #[test]
    fn names_are_case_sensitive() {
        let cookies = parse_cookies(["a=1; A=2"], ComplianceMode::Rfc6265);
        assert_eq!(cookies.pairs(), vec![("a", "1"), ("A", "2")]);
    }

    #[test]
    fn parse_opt() {
        let parser = CookieParser::new(ComplianceMode::Rfc6265);
        assert!(parser.parse_opt(None::<Vec<String>>).is_empty());
        assert_eq!(parser.parse_opt(Some(vec!["a=1"])).len(), 1);
    }

    #[test]
    fn serialize() {
        let cookies = parse_cookies(["a=1; b=2"], ComplianceMode::Rfc6265);
        assert_eq!(
            serde_json::to_string(&cookies).unwrap(),
            r#"[{"name":"a","value":"1"},{"name":"b","value":"2"}]"#
        );
    }
}
