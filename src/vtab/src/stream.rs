//! Pull-based streams over remote replies.

use crate::record::{Record, SubjectRef};
use common::SymqlError;
use index::request::RemoteRequest;
use index::service::{map_reply, Reply, SymbolIndex};
use std::collections::VecDeque;

/// A lazy, forward-only sequence of records.
pub trait ResultStream<T> {
    /// Moves to the next record, blocking until it arrives.
    ///
    /// Returns false once the stream is exhausted. An error also ends the
    /// stream.
    fn try_advance(&mut self) -> Result<bool, SymqlError>;

    /// The record reached by the last successful `try_advance`.
    fn current(&self) -> Option<&T>;

    /// Cancels any call still in flight. Later advances return false.
    fn close(&mut self);
}

/// Stream over the reply of a single remote call.
pub struct RemoteStream<T> {
    reply: Option<Reply<T>>,
    current: Option<T>,
}

impl<T> RemoteStream<T> {
    pub fn new(reply: Reply<T>) -> Self {
        Self {
            reply: Some(reply),
            current: None,
        }
    }
}

impl<T> ResultStream<T> for RemoteStream<T> {
    fn try_advance(&mut self) -> Result<bool, SymqlError> {
        self.current = None;
        let reply = match self.reply.as_mut() {
            Some(reply) => reply,
            None => return Ok(false),
        };
        match reply.read() {
            Ok(Some(record)) => {
                self.current = Some(record);
                Ok(true)
            }
            Ok(None) => {
                self.reply = None;
                Ok(false)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    fn close(&mut self) {
        self.current = None;
        if let Some(mut reply) = self.reply.take() {
            reply.cancel();
        }
    }
}

impl<T> Drop for RemoteStream<T> {
    fn drop(&mut self) {
        self.close();
    }
}

type Opener<V, T> = Box<dyn FnMut(&V) -> Result<Reply<T>, SymqlError>>;

/// Concatenation of one sub-stream per queued value.
///
/// The sub-call for a value is issued only once the previous sub-stream is
/// exhausted. An empty queue never issues a call.
pub struct MultiQueryStream<V, T> {
    queue: VecDeque<V>,
    open: Opener<V, T>,
    active: Option<RemoteStream<T>>,
    opened: usize,
}

impl<V, T> MultiQueryStream<V, T> {
    /// Creates the stream without issuing any call.
    ///
    /// # Arguments
    ///
    /// * `values` - Values to query, in order.
    /// * `open` - Issues the remote call for one value.
    pub fn new<F>(values: Vec<V>, open: F) -> Self
    where
        F: FnMut(&V) -> Result<Reply<T>, SymqlError> + 'static,
    {
        Self {
            queue: values.into(),
            open: Box::new(open),
            active: None,
            opened: 0,
        }
    }

    /// Number of sub-calls issued so far.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl<V, T> ResultStream<T> for MultiQueryStream<V, T> {
    fn try_advance(&mut self) -> Result<bool, SymqlError> {
        loop {
            if let Some(active) = self.active.as_mut() {
                match active.try_advance() {
                    Ok(true) => return Ok(true),
                    Ok(false) => self.active = None,
                    Err(e) => {
                        self.close();
                        return Err(e);
                    }
                }
            }
            let value = match self.queue.pop_front() {
                Some(value) => value,
                None => return Ok(false),
            };
            self.opened += 1;
            match (self.open)(&value) {
                Ok(reply) => self.active = Some(RemoteStream::new(reply)),
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }
    }

    fn current(&self) -> Option<&T> {
        self.active.as_ref().and_then(|s| s.current())
    }

    fn close(&mut self) {
        self.queue.clear();
        if let Some(mut active) = self.active.take() {
            active.close();
        }
    }
}

/// Issues `req` against `index`, wrapping every record of the reply.
///
/// Refs replies are tagged with the first requested id, so callers that need
/// a subject per reference send one id per request.
pub fn execute(index: &dyn SymbolIndex, req: &RemoteRequest) -> Result<Reply<Record>, SymqlError> {
    debug!("Issuing {:?}", req);
    let reply = match req {
        RemoteRequest::Lookup(r) => map_reply(index.lookup(r)?, Record::Symbol),
        RemoteRequest::FuzzyFind(r) => map_reply(index.fuzzy_find(r)?, Record::Symbol),
        RemoteRequest::Relations(r) => map_reply(index.relations(r)?, Record::Relation),
        RemoteRequest::Refs(r) => {
            let subject = r.ids.first().cloned().unwrap_or_default();
            map_reply(index.refs(r)?, move |reference| {
                Record::Ref(SubjectRef {
                    subject: subject.clone(),
                    reference,
                })
            })
        }
    };
    Ok(reply)
}
