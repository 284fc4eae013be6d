//! STOMP 1.2 over WebSocket: the frame codec and the chat room subscription.

pub mod subscription;

pub use subscription::ChatSubscription;

use crate::errors::AppError;

pub const ACCEPT_VERSION: &str = "1.2";

/// One STOMP frame. Header order is preserved; on repeated headers the first
/// occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ── Client frames ────────────────────────────────────────────────────────

    pub fn connect(host: &str) -> Self {
        Self::new("CONNECT")
            .header("accept-version", ACCEPT_VERSION)
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new("SUBSCRIBE")
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn send(destination: &str, json_body: String) -> Self {
        Self::new("SEND")
            .header("destination", destination)
            .header("content-type", "application/json")
            .body(json_body)
    }

    pub fn disconnect() -> Self {
        Self::new("DISCONNECT")
    }

    // ── Wire format ──────────────────────────────────────────────────────────

    pub fn encode(&self) -> String {
        // CONNECT and CONNECTED headers are never escaped.
        let escape = !matches!(self.command.as_str(), "CONNECT" | "CONNECTED");
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (key, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(key));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(key);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.get_header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decodes one frame from a text message. Returns `Ok(None)` for a bare
    /// heart-beat (a message made only of line endings).
    pub fn decode(raw: &str) -> Result<Option<Self>, AppError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        if raw.is_empty() || raw == "\0" {
            return Ok(None);
        }

        let (head, rest) = split_head(raw)
            .ok_or_else(|| AppError::stomp_frame("missing blank line after headers"))?;
        let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

        let command = lines
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::stomp_frame("missing command"))?
            .to_string();
        let unescape = !matches!(command.as_str(), "CONNECT" | "CONNECTED");

        let mut headers = Vec::new();
        for line in lines.filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| AppError::stomp_frame(format!("header without colon: {line}")))?;
            if unescape {
                headers.push((unescape_header(key)?, unescape_header(value)?));
            } else {
                headers.push((key.to_string(), value.to_string()));
            }
        }

        let mut frame = Self {
            command,
            headers,
            body: String::new(),
        };
        frame.body = match frame.get_header("content-length") {
            Some(len) => {
                let len: usize = len
                    .trim()
                    .parse()
                    .map_err(|_| AppError::stomp_frame(format!("bad content-length: {len}")))?;
                rest.get(..len)
                    .ok_or_else(|| AppError::stomp_frame("body shorter than content-length"))?
                    .to_string()
            }
            None => match rest.find('\0') {
                Some(end) => rest[..end].to_string(),
                None => rest.to_string(),
            },
        };
        Ok(Some(frame))
    }
}

fn split_head(raw: &str) -> Option<(&str, &str)> {
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let (at, len) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (a, b) => a.or(b)?,
    };
    Some((&raw[..at], &raw[at + len..]))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String, AppError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some('\\') => out.push('\\'),
            other => {
                return Err(AppError::stomp_frame(format!(
                    "undefined header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_subscribe() {
        let wire = StompFrame::subscribe("sub-0", "/topic/chat/room/5").encode();
        assert_eq!(
            wire,
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/chat/room/5\nack:auto\n\n\0"
        );
    }

    #[test]
    fn send_carries_content_length() {
        let wire = StompFrame::send("/app/chat/room/5", "{\"a\":1}".to_string()).encode();
        assert!(wire.contains("content-length:7\n\n{\"a\":1}\0"));
    }

    #[test]
    fn decodes_message_with_crlf_and_nul() {
        let raw = "MESSAGE\r\ndestination:/topic/chat/room/5\r\nmessage-id:1\r\n\r\n{\"msgId\":1}\0\n";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, "MESSAGE");
        assert_eq!(frame.get_header("destination"), Some("/topic/chat/room/5"));
        assert_eq!(frame.body, "{\"msgId\":1}");
    }

    #[test]
    fn content_length_bounds_the_body() {
        let raw = "MESSAGE\ncontent-length:2\n\nab\0cd\0";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.body, "ab");
    }

    #[test]
    fn heartbeat_is_not_a_frame() {
        assert_eq!(StompFrame::decode("\n").unwrap(), None);
        assert_eq!(StompFrame::decode("\r\n\r\n").unwrap(), None);
    }

    #[test]
    fn header_escapes_round_trip_outside_connect() {
        let frame = StompFrame::new("MESSAGE").header("note", "a:b\\c\nd");
        let wire = frame.encode();
        assert!(wire.contains("note:a\\cb\\\\c\\nd\n"));
        assert_eq!(StompFrame::decode(&wire).unwrap().unwrap(), frame);
    }

    #[test]
    fn connected_headers_are_literal() {
        let frame = StompFrame::decode("CONNECTED\nversion:1.2\nserver:x\\y\n\n\0")
            .unwrap()
            .unwrap();
        assert_eq!(frame.get_header("server"), Some("x\\y"));
    }

    #[test]
    fn repeated_header_first_wins() {
        let frame = StompFrame::decode("MESSAGE\nfoo:1\nfoo:2\n\n\0").unwrap().unwrap();
        assert_eq!(frame.get_header("foo"), Some("1"));
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(StompFrame::decode("MESSAGE\nno-colon\n\n\0").is_err());
        assert!(StompFrame::decode("MESSAGE\nbad:\\t\n\n\0").is_err());
        assert!(StompFrame::decode("MESSAGE\nheader:only").is_err());
    }
}
