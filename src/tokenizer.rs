//! Splits a single Cookie header value into `key=value` tokens. Tokens that
//! can't be parsed are dropped, so one bad pair never hides its neighbours.
use crate::compliance::ComplianceMode;

pub const VERSION_ATTRIBUTE: &str = "$Version";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub key: String,
    pub value: String,
}

impl Token {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Token {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Legacy attributes ($Version, $Path, ...) describe cookies, they aren't
    /// cookies themselves.
    pub fn is_attribute(&self) -> bool {
        self.key.starts_with('$')
    }
}

/// Which characters end a pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Separators {
    Semicolon,
    SemicolonOrComma,
}

impl Separators {
    /// Separators for a request whose Cookie lines are `lines`. `,` splits
    /// pairs in legacy mode, or in any mode once some line carries a
    /// `$Version` attribute. The choice covers every line of the request, so
    /// N lines split exactly like the same lines joined with `;`.
    pub fn detect<S: AsRef<str>>(lines: &[S], mode: ComplianceMode) -> Self {
        if mode.comma_separates() {
            return Separators::SemicolonOrComma;
        }

        if lines.iter().any(|l| has_version_attribute(l.as_ref())) {
            debug!("legacy cookie syntax in {} request", mode);
            return Separators::SemicolonOrComma;
        }

        Separators::Semicolon
    }

    fn chars(&self) -> &'static [char] {
        match self {
            Separators::Semicolon => &[';'],
            Separators::SemicolonOrComma => &[';', ','],
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum State {
    StartKey,
    InKey,
    StartValue,
    InValue,
    InQuoted,
    InQuotedEscape,
    AfterQuote,
    Discard,
}

/// Tokenize one raw header line on its own under `mode`.
pub fn tokenize(line: &str, mode: ComplianceMode) -> Vec<Token> {
    tokenize_with(line, Separators::detect(&[line], mode))
}

/// Tokenize one raw header line with separators already chosen for the
/// whole request.
pub fn tokenize_with(line: &str, separators: Separators) -> Vec<Token> {
    if line.trim().is_empty() {
        return vec![];
    }

    scan(line, separators.chars())
}

/// True if any pair in `line` is a `$Version` attribute.
pub fn has_version_attribute(line: &str) -> bool {
    scan(line, Separators::SemicolonOrComma.chars())
        .iter()
        .any(|t| t.key.eq_ignore_ascii_case(VERSION_ATTRIBUTE))
}

struct Scanner {
    state: State,
    key: String,
    value: String,
    tokens: Vec<Token>,

    // Byte offset just past the opening quote of the current value.
    quote_start: usize,
}

impl Scanner {
    fn new() -> Self {
        Scanner {
            state: State::StartKey,
            key: String::new(),
            value: String::new(),
            tokens: vec![],
            quote_start: 0,
        }
    }

    fn reset(&mut self) {
        self.key.clear();
        self.value.clear();
        self.state = State::StartKey;
    }

    fn drop_token(&mut self, reason: &str) {
        trace!("dropping cookie token {:?}: {}", self.key, reason);
        self.reset();
    }

    fn commit(&mut self) {
        let key = self.key.trim_end();
        let value = match self.state {
            State::AfterQuote => self.value.as_str(),
            _ => self.value.trim_end(),
        };

        self.tokens.push(Token::new(key, value));
        self.reset();
    }

    fn in_quote(&self) -> bool {
        matches!(self.state, State::InQuoted | State::InQuotedEscape)
    }

    fn step(&mut self, pos: usize, ch: char, is_sep: bool) {
        match self.state {
            State::StartKey => {
                if ch == '=' {
                    self.state = State::Discard;
                } else if !is_sep && !ch.is_whitespace() {
                    self.key.push(ch);
                    self.state = State::InKey;
                }
            }
            State::InKey => {
                if is_sep {
                    self.drop_token("missing '='");
                } else if ch == '=' {
                    self.state = State::StartValue;
                } else {
                    self.key.push(ch);
                }
            }
            State::StartValue => {
                if is_sep {
                    self.commit();
                } else if ch == '"' {
                    self.quote_start = pos + ch.len_utf8();
                    self.state = State::InQuoted;
                } else if !ch.is_whitespace() {
                    self.value.push(ch);
                    self.state = State::InValue;
                }
            }
            State::InValue => {
                if is_sep {
                    self.commit();
                } else {
                    self.value.push(ch);
                }
            }
            State::InQuoted => match ch {
                '\\' => self.state = State::InQuotedEscape,
                '"' => self.state = State::AfterQuote,
                _ => self.value.push(ch),
            },
            State::InQuotedEscape => {
                self.value.push(ch);
                self.state = State::InQuoted;
            }
            State::AfterQuote => {
                if is_sep {
                    self.commit();
                } else if !ch.is_whitespace() {
                    self.state = State::Discard;
                }
            }
            State::Discard => {
                if is_sep {
                    self.drop_token("trailing garbage");
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Token> {
        match self.state {
            State::StartValue | State::InValue | State::AfterQuote => self.commit(),
            State::InKey => self.drop_token("missing '='"),
            State::InQuoted | State::InQuotedEscape => self.drop_token("unterminated quote"),
            State::StartKey | State::Discard => {}
        }

        self.tokens
    }
}

fn scan(line: &str, separators: &[char]) -> Vec<Token> {
    let mut tokens = vec![];
    let mut rest = line;

    loop {
        let mut s = Scanner::new();
        for (pos, ch) in rest.char_indices() {
            s.step(pos, ch, separators.contains(&ch));
        }

        if !s.in_quote() {
            tokens.extend(s.finish());
            return tokens;
        }

        // A quote that never closes only spoils its own pair. Resume after
        // the first separator that follows the opening quote.
        let quote_start = s.quote_start;
        tokens.extend(s.finish());

        match rest[quote_start..].find(separators) {
            Some(offset) => {
                let sep = quote_start + offset;
                let sep_len = rest[sep..].chars().next().map_or(1, |c| c.len_utf8());
                rest = &rest[sep + sep_len..];
            }
            None => return tokens,
        }
    }
}
