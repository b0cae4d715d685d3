use crate::request::RemoteRequest;
use crate::service::{Reply, SymbolIndex};
use crate::wire::{encode_line, ReplyMessage};
use common::SymqlError;
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

/// Serves a [`SymbolIndex`] over the line protocol, one thread per connection.
pub struct IndexServer {
    listener: TcpListener,
    index: Arc<dyn SymbolIndex>,
}

impl IndexServer {
    /// Binds the server without accepting any connection yet.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to listen on, `host:port`. Port 0 picks a free port.
    /// * `index` - Index answering the calls.
    pub fn bind<I: SymbolIndex + 'static>(addr: &str, index: Arc<I>) -> Result<Self, SymqlError> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| SymqlError::SetupError(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self {
            listener,
            index,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SymqlError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the listener fails.
    pub fn serve(self) {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Ok(peer) = stream.peer_addr() {
                        debug!("New connection: {}", peer);
                    }
                    let index = Arc::clone(&self.index);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, index) {
                            debug!("Connection closed with error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error: {}", e);
                }
            }
        }
    }

    /// Serves on a background thread.
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || self.serve())
    }
}

/// Writes every record of `reply` followed by the final message.
///
/// A write failure means the client went away; the call is cancelled.
fn pump<T: Serialize>(stream: &mut TcpStream, mut reply: Reply<T>) -> Result<usize, SymqlError> {
    let mut sent = 0;
    loop {
        let record = match reply.read()? {
            Some(record) => record,
            None => break,
        };
        if let Err(e) = stream.write_all(encode_line(&ReplyMessage::record(record))?.as_bytes()) {
            reply.cancel();
            return Err(e.into());
        }
        sent += 1;
    }
    stream.write_all(encode_line(&ReplyMessage::<T>::finished(false))?.as_bytes())?;
    Ok(sent)
}

/// Reads one request line off `stream` and streams the answer back.
pub fn handle_connection(
    mut stream: TcpStream,
    index: Arc<dyn SymbolIndex>,
) -> Result<(), SymqlError> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(());
    }
    let req: RemoteRequest = serde_json::from_str(line.trim_end())?;
    let method = req.method();
    let sent = match req {
        RemoteRequest::Lookup(r) => pump(&mut stream, index.lookup(&r)?)?,
        RemoteRequest::FuzzyFind(r) => pump(&mut stream, index.fuzzy_find(&r)?)?,
        RemoteRequest::Relations(r) => pump(&mut stream, index.relations(&r)?)?,
        RemoteRequest::Refs(r) => pump(&mut stream, index.refs(&r)?)?,
    };
    debug!("{} answered with {} records", method, sent);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::MemoryIndex;
    use crate::records::Symbol;
    use common::testutil::init;

    fn exchange(addr: SocketAddr, request: &str) -> Vec<String> {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        BufReader::new(stream).lines().map(|l| l.unwrap()).collect()
    }

    #[test]
    fn test_streams_records_then_final() {
        init();
        let mut index = MemoryIndex::new();
        index.add_symbol(Symbol::named("A1", "foo", "ns::"));
        index.add_symbol(Symbol::named("A2", "food", "ns::"));
        let index = Arc::new(index);
        let server = IndexServer::bind("127.0.0.1:0", Arc::clone(&index)).unwrap();
        let addr = server.local_addr().unwrap();
        server.spawn();

        let lines = exchange(
            addr,
            "{\"method\":\"FuzzyFind\",\"request\":{\"query\":\"foo\",\"any_scope\":true,\"limit\":null}}\n",
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("stream_result"));
        assert!(lines[2].contains("final_result"));
        assert_eq!(index.requests().len(), 1);
    }

    #[test]
    fn test_garbage_request_closes_connection() {
        let server = IndexServer::bind("127.0.0.1:0", Arc::new(MemoryIndex::new())).unwrap();
        let addr = server.local_addr().unwrap();
        server.spawn();
        assert!(exchange(addr, "hello\n").is_empty());
    }

    #[test]
    fn test_bind_failure() {
        assert!(IndexServer::bind("not an address", Arc::new(MemoryIndex::new())).is_err());
    }
}
