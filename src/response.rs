use crate::{headers::Headers, status};

#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status: status::Status,
    pub headers: Headers,
    pub body: String,
}

impl Response {
    pub fn new(status: impl Into<status::Status>) -> Response {
        Response {
            version: "HTTP/1.1".to_string(),
            status: status.into(),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.set_body(body);
        self
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.set(key, value);
        self
    }

    /// Serializes the response. The server handles one request per
    /// connection, so every response closes it.
    pub fn serialize(&mut self) -> String {
        let status_line = format!("{} {} {}", self.version, self.status.code, self.status.text);
        let length = self.body.len();
        self.set_header("Content-Length", length.to_string());
        self.set_header("Connection", "close");

        format!("{status_line}\r\n{}\r\n{}", self.headers.serialize(), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize() {
        let mut response = Response::new(status::OK).with_body("[]");
        let buf = response.serialize();

        assert!(buf.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(buf.contains("content-length: 2\r\n"));
        assert!(buf.contains("connection: close\r\n"));
        assert!(buf.ends_with("\r\n\r\n[]"));
    }
}
