use std::{error, fmt};

use async_trait::async_trait;

use crate::{request::Request, response::Response, status};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    Failed(String),
    Status(status::Status),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Failed(err) => write!(f, "handler failed: {}", err),
            Error::Status(s) => write!(f, "handler returned {} {}", s.code, s.text),
        }
    }
}

impl error::Error for Error {}

impl Error {
    /// The response sent to the client when a handler fails.
    pub fn to_response(&self) -> Response {
        match self {
            Error::Failed(err) => Response::new(status::SERVER_ERROR).with_body(err.clone()),
            Error::Status(s) => Response::new(s.clone()).with_body(s.text.clone()),
        }
    }
}

/// Application code that receives fully parsed requests, cookies included.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, r: &Request) -> Result<Response, Error>;
}

/// Answers every request with its cookies as a JSON array.
#[derive(Debug, Clone, Default)]
pub struct CookieEcho;

#[async_trait]
impl Handler for CookieEcho {
    async fn handle(&self, r: &Request) -> Result<Response, Error> {
        let body =
            serde_json::to_string(r.cookies()).map_err(|e| Error::Failed(e.to_string()))?;

        info!("{} {}: {} cookie(s)", r.method, r.path(), r.cookies().len());

        let mut response = Response::new(status::OK).with_body(body);
        response.set_header("Content-Type", "application/json");
        Ok(response)
    }
}
