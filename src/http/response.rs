use tokio::io::AsyncWrite;

use crate::http::error::WriteError;
use crate::http::headers::Headers;
use crate::http::writer::ResponseWriter;

/// An HTTP status code.
///
/// Any numeric code can be written; only the ones with an associated
/// constant carry a reason phrase on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode(404).as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase written for this code, if it has one.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), Some("OK"));
    /// assert_eq!(StatusCode(404).reason_phrase(), None);
    /// ```
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self.0 {
            200 => Some("OK"),
            400 => Some("Bad Request"),
            500 => Some("Internal Server Error"),
            _ => None,
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Writes a complete `500 Internal Server Error` response with `message` as
/// a plain-text body.
pub async fn write_error_response<W>(
    writer: &mut ResponseWriter<W>,
    message: &str,
) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let body = message.as_bytes();
    let mut headers = Headers::new();
    headers.set_defaults(body.len(), &[]);

    writer.write_status_line(StatusCode::INTERNAL_SERVER_ERROR).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(body).await?;
    Ok(())
}
