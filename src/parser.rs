use std::{collections::HashMap, error, fmt, str};

use url::Url;

use crate::{
    cookies::CookieParser,
    request::{Request, VALID_METHODS},
};

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum State {
    StartRequest,
    InMethod,
    InHeaders,
    InBody,
    ParseComplete,
}

lazy_static! {
    // map of target state -> prior state(s)
    static ref STATE_MACHINE: HashMap<State, Vec<State>> = HashMap::from([
        (State::InMethod, vec![State::StartRequest]),
        (State::InHeaders, vec![State::InMethod]),
        (State::InBody, vec![State::InHeaders]),
        (State::ParseComplete, vec![State::InBody, State::InHeaders]),
    ]);
}

/// Largest request line plus headers we'll buffer before giving up.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    InvalidStateTransition(State, State),
    BadMethodLine(String),
    BadHeaderLine(String),
    InvalidMethod(String),
    InvalidPath(String),
    InvalidUTF8,
    HeadTooLarge(usize),
    UnexpectedEOF,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::InvalidStateTransition(from, to) => {
                write!(f, "invalid state transition: {:?} -> {:?}", from, to)
            }
            ParseError::BadMethodLine(line) => write!(f, "bad request line: {}", line),
            ParseError::BadHeaderLine(line) => write!(f, "bad header line: {}", line),
            ParseError::InvalidMethod(method) => write!(f, "invalid method: {}", method),
            ParseError::InvalidPath(path) => write!(f, "invalid path: {}", path),
            ParseError::InvalidUTF8 => write!(f, "request head is not valid UTF-8"),
            ParseError::HeadTooLarge(max) => {
                write!(f, "request head larger than {} bytes", max)
            }
            ParseError::UnexpectedEOF => write!(f, "unexpected end of request"),
        }
    }
}

impl error::Error for ParseError {}

/// Incremental HTTP/1.1 request parser. Feed it bytes with `parse_buf` until
/// `is_complete` returns true.
#[derive(Debug)]
pub struct Parser {
    base_url: String,
    cookie_parser: CookieParser,
    state: State,
    buf: Vec<u8>,
    request: Request,
    expected_content_length: usize,
    head_size: usize,
}

impl Parser {
    pub fn new(base_url: impl Into<String>, cookie_parser: CookieParser) -> Parser {
        Parser {
            base_url: base_url.into(),
            cookie_parser,
            state: State::StartRequest,
            buf: Vec::with_capacity(16384),
            request: Request::default(),
            expected_content_length: 0,
            head_size: 0,
        }
    }

    fn update_state(&mut self, target_state: State) -> Result<(), ParseError> {
        let allowed = STATE_MACHINE
            .get(&target_state)
            .map(|prior| prior.contains(&self.state))
            .unwrap_or(false);

        if !allowed {
            return Err(ParseError::InvalidStateTransition(
                self.state.clone(),
                target_state,
            ));
        }

        self.state = target_state;
        Ok(())
    }

    fn take_line(&mut self) -> Result<String, ParseError> {
        let line = str::from_utf8(&self.buf)
            .or(Err(ParseError::InvalidUTF8))?
            .trim_end_matches('\r')
            .to_string();
        self.buf.clear();
        Ok(line)
    }

    fn commit_method(&mut self) -> Result<(), ParseError> {
        let method_line = self.take_line()?;
        let parts = method_line.split_ascii_whitespace().collect::<Vec<&str>>();

        if parts.len() != 3 {
            return Err(ParseError::BadMethodLine(method_line.clone()));
        }

        let method = VALID_METHODS
            .get(&parts[0])
            .ok_or(ParseError::InvalidMethod(parts[0].into()))?;

        let base_url = Url::parse(&self.base_url)
            .or(Err(ParseError::InvalidPath(self.base_url.clone())))?;
        let url = base_url
            .join(parts[1])
            .or(Err(ParseError::InvalidPath(parts[1].into())))?;

        self.request.method = *method;
        self.request.version = parts[2].into();
        self.request.url = Some(url);

        self.update_state(State::InHeaders)
    }

    fn commit_header(&mut self) -> Result<(), ParseError> {
        let header_line = self.take_line()?;

        if !header_line.is_empty() {
            if !self.request.headers.add_line(&header_line) {
                return Err(ParseError::BadHeaderLine(header_line));
            }
            return Ok(());
        }

        self.expected_content_length = self
            .request
            .headers
            .get_first("content-length")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(0);

        if self.expected_content_length > 0 {
            self.update_state(State::InBody)
        } else {
            self.complete()
        }
    }

    fn complete(&mut self) -> Result<(), ParseError> {
        self.request.load_cookies(&self.cookie_parser);
        self.update_state(State::ParseComplete)
    }

    fn consume_head(&mut self, c: u8) -> Result<(), ParseError> {
        self.head_size += 1;
        if self.head_size > MAX_HEAD_SIZE {
            return Err(ParseError::HeadTooLarge(MAX_HEAD_SIZE));
        }

        if c != b'\n' {
            self.buf.push(c);
        }
        Ok(())
    }

    pub fn parse_buf(&mut self, buf: &[u8]) -> Result<(), ParseError> {
        for c in buf {
            match self.state {
                State::StartRequest => {
                    if !c.is_ascii_whitespace() {
                        self.consume_head(*c)?;
                        self.update_state(State::InMethod)?;
                    }
                }
                State::InMethod => {
                    self.consume_head(*c)?;
                    if *c == b'\n' {
                        self.commit_method()?;
                    }
                }
                State::InHeaders => {
                    self.consume_head(*c)?;
                    if *c == b'\n' {
                        self.commit_header()?;
                    }
                }
                State::InBody => {
                    self.request.body.push(*c);
                    if self.request.body.len() == self.expected_content_length {
                        self.complete()?;
                    }
                }
                // Anything after the request (e.g. pipelined data) is ignored.
                State::ParseComplete => break,
            }
        }

        Ok(())
    }

    /// Called when the peer stops sending. A request with headers but no
    /// terminating blank line is still accepted.
    pub fn parse_eof(&mut self) -> Result<(), ParseError> {
        match self.state {
            State::ParseComplete => Ok(()),
            State::InHeaders => {
                if !self.buf.is_empty() {
                    self.commit_header()?;
                }
                if self.state == State::InHeaders {
                    self.complete()?;
                }
                Ok(())
            }
            State::InBody => self.complete(),
            _ => Err(ParseError::UnexpectedEOF),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::ParseComplete
    }

    pub fn get_request(&self) -> Request {
        self.request.clone()
    }

    pub fn into_request(self) -> Request {
        self.request
    }
}
