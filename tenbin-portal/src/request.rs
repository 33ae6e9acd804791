//! HTTP/1.x request parsing
//!
//! Only what the portal needs: request line, `Content-Length` and a UTF-8
//! body. Parsing borrows from the receive buffer.

use crate::query;

/// Longest accepted request head
pub const MAX_HEAD_LEN: usize = 2048;

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Head,
    Post,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

/// Request parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Need more bytes
    Incomplete,
    /// Request line or header is not valid HTTP
    Malformed,
    /// Head or body is not UTF-8
    NotUtf8,
    /// Head exceeds [`MAX_HEAD_LEN`]
    HeadTooLarge,
}

/// Parsed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    /// Path without the query string
    pub path: &'a str,
    /// Raw query string (without `?`), possibly empty
    pub query: &'a str,
    /// Raw body, possibly empty
    pub body: &'a str,
}

impl<'a> Request<'a> {
    /// Parse a complete request from `buf`
    pub fn parse(buf: &'a [u8]) -> Result<Self, RequestError> {
        let head_end = match buf.windows(4).position(|w| w == b"\r\n\r\n") {
            Some(end) if end <= MAX_HEAD_LEN => end,
            Some(_) => return Err(RequestError::HeadTooLarge),
            None if buf.len() > MAX_HEAD_LEN => return Err(RequestError::HeadTooLarge),
            None => return Err(RequestError::Incomplete),
        };

        let head = core::str::from_utf8(&buf[..head_end]).map_err(|_| RequestError::NotUtf8)?;
        let mut lines = head.split("\r\n");

        let mut parts = lines.next().ok_or(RequestError::Malformed)?.split(' ');
        let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(t), Some(v), None) if !m.is_empty() => (m, t, v),
            _ => return Err(RequestError::Malformed),
        };
        if !version.starts_with("HTTP/1.") || !target.starts_with('/') {
            return Err(RequestError::Malformed);
        }
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        let mut content_length = 0usize;
        for line in lines {
            let (name, value) = line.split_once(':').ok_or(RequestError::Malformed)?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| RequestError::Malformed)?;
            }
        }

        let body_start = head_end + 4;
        let body_end = body_start
            .checked_add(content_length)
            .ok_or(RequestError::Malformed)?;
        if buf.len() < body_end {
            return Err(RequestError::Incomplete);
        }
        let body =
            core::str::from_utf8(&buf[body_start..body_end]).map_err(|_| RequestError::NotUtf8)?;

        Ok(Self {
            method: Method::parse(method),
            path,
            query,
            body,
        })
    }

    /// Raw (still encoded) value of a form parameter
    ///
    /// The query string wins; a urlencoded body is the fallback.
    pub fn param(&self, key: &str) -> Option<&'a str> {
        query::lookup(self.query, key).or_else(|| query::lookup(self.body, key))
    }
}
