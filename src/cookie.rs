use serde::Serialize;

/// Legacy metadata that a client sent alongside a cookie. None of these change
/// the cookie's name or value.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        *self == Attributes::default()
    }
}

/// A single cookie received in a request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Cookie {
    name: String,
    value: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
            attributes: Attributes::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn version(&self) -> Option<u32> {
        self.attributes.version
    }

    pub fn path(&self) -> Option<&str> {
        self.attributes.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.attributes.domain.as_deref()
    }

    pub fn port(&self) -> Option<&str> {
        self.attributes.port.as_deref()
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn with_version(mut self, version: Option<u32>) -> Self {
        self.attributes.version = version;
        self
    }

    /// The `(name, value)` pair, for comparisons in tests and handlers.
    pub fn pair(&self) -> (&str, &str) {
        (&self.name, &self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let cookie = Cookie::new("ID", "mo").with_version(Some(1));
        assert_eq!(cookie.name(), "ID");
        assert_eq!(cookie.value(), "mo");
        assert_eq!(cookie.pair(), ("ID", "mo"));
        assert_eq!(cookie.version(), Some(1));
        assert_eq!(cookie.path(), None);
        assert!(!cookie.attributes().is_empty());
    }

    #[test]
    fn serialize() {
        let cookie = Cookie::new("ID", "mo");
        assert_eq!(
            serde_json::to_string(&cookie).unwrap(),
            r#"{"name":"ID","value":"mo"}"#
        );

        let mut cookie = Cookie::new("ID", "mo");
        cookie.attributes_mut().path = Some("/".into());
        assert_eq!(
            serde_json::to_string(&cookie).unwrap(),
            r#"{"name":"ID","value":"mo","attributes":{"path":"/"}}"#
        );
    }
}
