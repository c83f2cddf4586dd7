#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

pub mod compliance;
pub mod config;
pub mod cookie;
pub mod cookies;
pub mod handler;
pub mod headers;
pub mod logger;
pub mod parser;
pub mod request;
pub mod response;
pub mod server;
pub mod status;
pub mod tokenizer;

pub use compliance::ComplianceMode;
pub use cookie::Cookie;
pub use cookies::{parse_cookies, CookieParser, CookieSet};
