//! HTTP response encoding

use core::fmt::{self, Write};

use heapless::String;

/// Maximum `Location` header value
pub const LOCATION_LEN: usize = 48;

/// Maximum dynamic (JSON) body
pub const JSON_BODY_LEN: usize = 1024;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    Found,
    BadRequest,
    MethodNotAllowed,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Found => 302,
            Status::BadRequest => 400,
            Status::MethodNotAllowed => 405,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Found => "Found",
            Status::BadRequest => "Bad Request",
            Status::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Empty,
    Static(&'static str),
    Json(String<JSON_BODY_LEN>),
}

/// Response ready to be written to a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: &'static str,
    body: Body,
    location: Option<String<LOCATION_LEN>>,
    /// HEAD reply: headers describe the body but it is not sent
    omit_body: bool,
}

impl Response {
    pub fn html(status: Status, body: &'static str) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: Body::Static(body),
            location: None,
            omit_body: false,
        }
    }

    pub fn text(status: Status, body: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Body::Static(body),
            location: None,
            omit_body: false,
        }
    }

    pub fn json(body: String<JSON_BODY_LEN>) -> Self {
        Self {
            status: Status::Ok,
            content_type: "application/json",
            body: Body::Json(body),
            location: None,
            omit_body: false,
        }
    }

    /// 302 to `url`
    pub fn redirect(url: &str) -> Self {
        let mut location = String::new();
        let _ = location.push_str(url);
        Self {
            status: Status::Found,
            content_type: "text/plain",
            body: Body::Empty,
            location: Some(location),
            omit_body: false,
        }
    }

    /// Same response with the body withheld, as a HEAD reply
    pub fn head_only(mut self) -> Self {
        self.omit_body = true;
        self
    }

    /// Bytes to send after the head
    pub fn body(&self) -> &[u8] {
        if self.omit_body {
            return &[];
        }
        self.content()
    }

    fn content(&self) -> &[u8] {
        match &self.body {
            Body::Empty => &[],
            Body::Static(s) => s.as_bytes(),
            Body::Json(s) => s.as_bytes(),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.as_str())
    }

    /// Write the status line and headers, including the blank line
    pub fn write_head<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "HTTP/1.1 {} {}\r\n",
            self.status.code(),
            self.status.reason()
        )?;
        write!(out, "Content-Type: {}\r\n", self.content_type)?;
        write!(out, "Content-Length: {}\r\n", self.content().len())?;
        if let Some(location) = self.location() {
            write!(out, "Location: {}\r\n", location)?;
        }
        out.write_str("Cache-Control: no-cache, no-store\r\nConnection: close\r\n\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_head() {
        let response = Response::redirect("http://192.168.4.1/");
        let mut head: String<256> = String::new();
        response.write_head(&mut head).unwrap();
        assert!(head.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(head.contains("Location: http://192.168.4.1/\r\n"));
        assert!(head.contains("Content-Length: 0\r\n"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_head_only_keeps_length() {
        let response = Response::text(Status::Ok, "Microsoft NCSI").head_only();
        assert_eq!(response.body(), b"");
        let mut head: String<256> = String::new();
        response.write_head(&mut head).unwrap();
        assert!(head.contains("Content-Length: 14\r\n"));
    }

    #[test]
    fn test_text_body() {
        let response = Response::text(Status::BadRequest, "Missing parameters");
        assert_eq!(response.status.code(), 400);
        assert_eq!(response.body(), b"Missing parameters");
    }
}
