//! Error types for the KuCoin client.

/// Errors surfaced by the client.
///
/// Business-level failures carry the exchange's own `code`/`msg` pair so
/// callers can branch on specific error codes (rate limit vs. insufficient
/// balance, etc.) without string matching.
#[derive(Debug, thiserror::Error)]
pub enum KucoinError {
    /// The server-time endpoint could not be reached or returned a
    /// non-success envelope. Signing requires the exchange's own clock, so
    /// this is fatal to the request being prepared.
    #[error("KuCoin clock source unavailable: {reason}")]
    ClockUnavailable { reason: String },

    /// A required credential field is missing or empty.
    #[error("invalid KuCoin credentials: {field} is missing or empty")]
    InvalidCredentials { field: &'static str },

    /// Non-200 HTTP status. `body` is captured best-effort; if the body
    /// could not be read it holds a placeholder rather than failing the
    /// failure path.
    #[error("KuCoin HTTP error ({status}): {body}")]
    HttpError { status: u16, body: String },

    /// Response body was not valid JSON, lacked the envelope `code` field,
    /// or a payload failed to (de)serialize.
    #[error("malformed KuCoin response: {detail}")]
    MalformedResponse { detail: String },

    /// Well-formed envelope with a non-success `code`.
    #[error("KuCoin API error ({code}): {message}")]
    ApiError { code: String, message: String },

    /// A page fetch failed mid-pagination. No partial results are returned.
    #[error("pagination failed at page {page}: {source}")]
    PaginationFailed {
        page: u32,
        #[source]
        source: Box<KucoinError>,
    },

    /// Network-level failure before any HTTP status was observed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, KucoinError>;
