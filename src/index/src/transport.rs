use crate::records::{Ref, Relation, Symbol};
use crate::request::{
    FuzzyFindRequest, LookupRequest, RefsRequest, RelationsRequest, RemoteRequest,
};
use crate::service::{Reply, ReplyReader, SymbolIndex};
use crate::wire::{decode_reply, encode_line};
use common::SymqlError;
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};

/// Client for a remote index reachable at `host:port`.
///
/// Every call opens its own connection, so concurrently open cursors never
/// share a socket. Nothing is connected until the first call.
pub struct RemoteIndex {
    addr: String,
    calls: AtomicU64,
}

impl RemoteIndex {
    /// Creates a client for the given address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Server address in the form `host:port`.
    pub fn new(addr: &str) -> Result<Self, SymqlError> {
        let port = addr.rsplit(':').next().unwrap_or("");
        if !addr.contains(':') || port.parse::<u16>().is_err() {
            return Err(SymqlError::SetupError(format!(
                "Invalid server address {:?}, expected host:port",
                addr
            )));
        }
        Ok(Self {
            addr: addr.to_string(),
            calls: AtomicU64::new(0),
        })
    }

    /// Address this client talks to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Number of remote calls issued so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn call<T: DeserializeOwned + 'static>(
        &self,
        req: RemoteRequest,
    ) -> Result<Reply<T>, SymqlError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        debug!("Calling {} on {}", req.method(), self.addr);
        let stream = TcpStream::connect(&self.addr).map_err(|e| {
            SymqlError::TransportError(format!("Failed to connect to {}: {}", self.addr, e))
        })?;
        stream.set_nodelay(true)?;
        let mut writer = stream.try_clone()?;
        writer
            .write_all(encode_line(&req)?.as_bytes())
            .map_err(|e| SymqlError::TransportError(e.to_string()))?;
        Ok(Box::new(TcpReplyReader::new(stream)?))
    }
}

impl SymbolIndex for RemoteIndex {
    fn lookup(&self, req: &LookupRequest) -> Result<Reply<Symbol>, SymqlError> {
        self.call(RemoteRequest::Lookup(req.clone()))
    }

    fn fuzzy_find(&self, req: &FuzzyFindRequest) -> Result<Reply<Symbol>, SymqlError> {
        self.call(RemoteRequest::FuzzyFind(req.clone()))
    }

    fn relations(&self, req: &RelationsRequest) -> Result<Reply<Relation>, SymqlError> {
        self.call(RemoteRequest::Relations(req.clone()))
    }

    fn refs(&self, req: &RefsRequest) -> Result<Reply<Ref>, SymqlError> {
        self.call(RemoteRequest::Refs(req.clone()))
    }
}

/// Reads reply lines off one connection. Dropping the reader shuts the
/// connection down, which cancels the call on the server side.
pub struct TcpReplyReader<T> {
    stream: Option<TcpStream>,
    reader: BufReader<TcpStream>,
    line: String,
    done: bool,
    _record: PhantomData<T>,
}

impl<T> TcpReplyReader<T> {
    fn new(stream: TcpStream) -> Result<Self, SymqlError> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            stream: Some(stream),
            reader,
            line: String::new(),
            done: false,
            _record: PhantomData,
        })
    }

    fn shutdown(&mut self) {
        self.done = true;
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl<T: DeserializeOwned> ReplyReader<T> for TcpReplyReader<T> {
    fn read(&mut self) -> Result<Option<T>, SymqlError> {
        if self.done {
            return Ok(None);
        }
        self.line.clear();
        let size = match self.reader.read_line(&mut self.line) {
            Ok(size) => size,
            Err(e) => {
                self.shutdown();
                return Err(SymqlError::TransportError(e.to_string()));
            }
        };
        if size == 0 {
            self.shutdown();
            return Err(SymqlError::TransportError(String::from(
                "Reply stream ended before its final result",
            )));
        }
        let msg = match decode_reply::<T>(&self.line) {
            Ok(msg) => msg,
            Err(e) => {
                self.shutdown();
                return Err(e);
            }
        };
        match msg.stream_result {
            Some(record) => Ok(Some(record)),
            None => {
                self.shutdown();
                Ok(None)
            }
        }
    }

    fn cancel(&mut self) {
        self.shutdown();
    }
}

impl<T> Drop for TcpReplyReader<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::MemoryIndex;
    use crate::records::RefKindMask;
    use crate::server::IndexServer;
    use common::testutil::init;
    use std::io::Read;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;

    fn test_index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_symbol(Symbol::named("A1", "foo", "ns::"));
        index.add_symbol(Symbol::named("B2", "bar", "ns::"));
        index
    }

    /// Serves a single connection with a canned reply and returns the request line.
    fn canned_server(reply: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            stream.write_all(reply.as_bytes()).unwrap();
            request
        });
        (addr, handle)
    }

    #[test]
    fn test_invalid_address() {
        assert!(RemoteIndex::new("localhost").is_err());
        assert!(RemoteIndex::new("localhost:http").is_err());
        assert!(RemoteIndex::new("localhost:50051").is_ok());
    }

    #[test]
    fn test_lookup_round_trip() {
        init();
        let server = IndexServer::bind("127.0.0.1:0", Arc::new(test_index())).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        server.spawn();

        let client = RemoteIndex::new(&addr).unwrap();
        let mut reply = client
            .lookup(&LookupRequest {
                ids: vec![String::from("B2")],
            })
            .unwrap();
        let sym = reply.read().unwrap().unwrap();
        assert_eq!(sym.name.as_deref(), Some("bar"));
        assert!(reply.read().unwrap().is_none());
        assert!(reply.read().unwrap().is_none());
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn test_request_line_on_the_wire() {
        let (addr, handle) = canned_server("{\"final_result\":{\"has_more\":false}}\n");
        let client = RemoteIndex::new(&addr).unwrap();
        let mut reply = client
            .refs(&RefsRequest {
                ids: vec![String::from("A1")],
                filter: RefKindMask::all(),
                limit: None,
            })
            .unwrap();
        assert!(reply.read().unwrap().is_none());
        let request = handle.join().unwrap();
        let req: RemoteRequest = serde_json::from_str(request.trim_end()).unwrap();
        assert_eq!(req.method(), "Refs");
    }

    #[test]
    fn test_early_end_is_a_transport_error() {
        let (addr, handle) = canned_server("{\"stream_result\":{\"id\":\"A1\"}}\n");
        let client = RemoteIndex::new(&addr).unwrap();
        let mut reply = client
            .lookup(&LookupRequest {
                ids: vec![String::from("A1")],
            })
            .unwrap();
        assert!(reply.read().unwrap().is_some());
        handle.join().unwrap();
        match reply.read() {
            Err(SymqlError::TransportError(_)) => (),
            other => panic!("Expected transport error, got {:?}", other.map(|_| ())),
        }
        // The reader stays finished after the error.
        assert!(reply.read().unwrap().is_none());
    }

    #[test]
    fn test_cancel_closes_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            // Reads until the client hangs up.
            let mut rest = Vec::new();
            reader.read_to_end(&mut rest).unwrap();
            rest.len()
        });
        let client = RemoteIndex::new(&addr).unwrap();
        let mut reply = client.fuzzy_find(&FuzzyFindRequest::default()).unwrap();
        reply.cancel();
        assert_eq!(handle.join().unwrap(), 0);
        assert!(reply.read().unwrap().is_none());
    }

    #[test]
    fn test_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        let client = RemoteIndex::new(&addr).unwrap();
        match client.lookup(&LookupRequest::default()) {
            Err(SymqlError::TransportError(_)) => (),
            _ => panic!("Expected transport error"),
        }
    }
}
