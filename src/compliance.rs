use std::{error, fmt, str::FromStr};

/// Selects which Cookie header grammar the parser accepts.
///
/// `Legacy` follows the RFC2965 style where pairs may be split by `,` as well
/// as `;`, and `$Version`/`$Path`/`$Domain` attributes are interleaved with the
/// cookies. `Rfc6265` only splits on `;`, but still strips legacy attributes
/// when a client sends them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[non_exhaustive]
pub enum ComplianceMode {
    Legacy,
    #[default]
    Rfc6265,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ComplianceError {
    Unknown(String),
}

impl fmt::Display for ComplianceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComplianceError::Unknown(mode) => {
                write!(f, "unknown cookie compliance mode: {}", mode)
            }
        }
    }
}

impl error::Error for ComplianceError {}

impl ComplianceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceMode::Legacy => "LEGACY",
            ComplianceMode::Rfc6265 => "RFC6265",
        }
    }

    /// True if `,` always separates pairs, regardless of the header contents.
    pub fn comma_separates(&self) -> bool {
        *self == ComplianceMode::Legacy
    }
}

impl FromStr for ComplianceMode {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEGACY" | "RFC2965" => Ok(ComplianceMode::Legacy),
            "RFC6265" => Ok(ComplianceMode::Rfc6265),
            _ => Err(ComplianceError::Unknown(s.into())),
        }
    }
}

impl fmt::Display for ComplianceMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
