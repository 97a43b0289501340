use std::fmt;

/// Raw response of one listing page, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL the body was finally served from.
    pub url: String,
    pub redirected: bool,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// A single page could not be turned into markup. Never fatal for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} ({})", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    BadUrl,
    Status(u16),
    Timeout,
    TooManyRedirects,
    TooLarge { limit: u64, received: u64 },
    NotMarkup { content_type: String },
    Browser,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadUrl => f.write_str("bad page url"),
            Self::Status(code) => write!(f, "server answered {code}"),
            Self::Timeout => f.write_str("timed out"),
            Self::TooManyRedirects => f.write_str("too many redirects"),
            Self::TooLarge { limit, received } => {
                write!(f, "page exceeds {limit} bytes (got at least {received})")
            }
            Self::NotMarkup { content_type } => write!(f, "not a markup page: {content_type}"),
            Self::Browser => f.write_str("browser failure"),
            Self::Network => f.write_str("network failure"),
        }
    }
}

/// How a run ended when it did not error out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No source produced a new matching entry; nothing was sent.
    NothingNew,
    /// Every channel accepted the digest and the store was committed.
    Notified { counts: Vec<(String, usize)> },
    /// At least one channel failed; the store was left untouched.
    DispatchFailed { failures: Vec<ChannelFailure> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub message: String,
}
