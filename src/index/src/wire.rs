//! Newline-delimited JSON framing shared by the client transport and the server.
//!
//! A call is one request line followed by zero or more reply lines carrying a
//! `stream_result`, and exactly one final line carrying a `final_result`.

use common::SymqlError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Terminal message of a reply stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FinalResult {
    pub has_more: bool,
}

/// One reply line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReplyMessage<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<FinalResult>,
}

impl<T> ReplyMessage<T> {
    pub fn record(record: T) -> Self {
        Self {
            stream_result: Some(record),
            final_result: None,
        }
    }

    pub fn finished(has_more: bool) -> Self {
        Self {
            stream_result: None,
            final_result: Some(FinalResult { has_more }),
        }
    }
}

/// Encodes `msg` as a single line, including the trailing newline.
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, SymqlError> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one reply line.
pub fn decode_reply<T: DeserializeOwned>(line: &str) -> Result<ReplyMessage<T>, SymqlError> {
    let msg: ReplyMessage<T> = serde_json::from_str(line.trim_end())?;
    if msg.stream_result.is_none() && msg.final_result.is_none() {
        return Err(SymqlError::DecodeError(String::from(
            "Reply line carries neither a record nor a final result",
        )));
    }
    Ok(msg)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::records::Symbol;

    #[test]
    fn test_encode_is_one_line() {
        let sym = Symbol::named("A1", "foo", "ns::");
        let line = encode_line(&ReplyMessage::record(sym)).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert!(!line.contains("final_result"));
    }

    #[test]
    fn test_decode_reply() {
        let msg: ReplyMessage<Symbol> =
            decode_reply("{\"stream_result\":{\"id\":\"A1\"}}\n").unwrap();
        assert_eq!(msg.stream_result.unwrap().id.as_deref(), Some("A1"));
        let msg: ReplyMessage<Symbol> =
            decode_reply("{\"final_result\":{\"has_more\":false}}").unwrap();
        assert_eq!(msg.final_result, Some(FinalResult { has_more: false }));
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        assert!(decode_reply::<Symbol>("{}").is_err());
        match decode_reply::<Symbol>("not json") {
            Err(SymqlError::DecodeError(_)) => (),
            _ => panic!("Expected decode error"),
        }
    }
}
