use crate::records::{Ref, Relation, Symbol};
use crate::request::{FuzzyFindRequest, LookupRequest, RefsRequest, RelationsRequest};
use common::SymqlError;
use std::collections::VecDeque;

/// Pull side of one streaming remote call.
pub trait ReplyReader<T> {
    /// Blocks until the next record is available.
    ///
    /// Returns `Ok(None)` once the remote side has sent its terminal message.
    /// A stream that breaks off early is an error, not an end of results.
    fn read(&mut self) -> Result<Option<T>, SymqlError>;

    /// Terminates the remote call. Later reads return `Ok(None)`.
    fn cancel(&mut self);
}

pub type Reply<T> = Box<dyn ReplyReader<T>>;

/// The operations a remote symbol index offers. Each call starts one
/// streaming read.
pub trait SymbolIndex: Send + Sync {
    fn lookup(&self, req: &LookupRequest) -> Result<Reply<Symbol>, SymqlError>;

    fn fuzzy_find(&self, req: &FuzzyFindRequest) -> Result<Reply<Symbol>, SymqlError>;

    fn relations(&self, req: &RelationsRequest) -> Result<Reply<Relation>, SymqlError>;

    fn refs(&self, req: &RefsRequest) -> Result<Reply<Ref>, SymqlError>;
}

/// Reply over records that are already in memory.
pub struct VecReader<T> {
    records: VecDeque<T>,
}

impl<T> VecReader<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: records.into(),
        }
    }
}

impl<T> ReplyReader<T> for VecReader<T> {
    fn read(&mut self) -> Result<Option<T>, SymqlError> {
        Ok(self.records.pop_front())
    }

    fn cancel(&mut self) {
        self.records.clear();
    }
}

struct MapReader<T, U> {
    inner: Reply<T>,
    f: Box<dyn FnMut(T) -> U>,
}

impl<T, U> ReplyReader<U> for MapReader<T, U> {
    fn read(&mut self) -> Result<Option<U>, SymqlError> {
        Ok(self.inner.read()?.map(&mut self.f))
    }

    fn cancel(&mut self) {
        self.inner.cancel();
    }
}

/// Transforms every record of `reply` with `f`.
pub fn map_reply<T, U, F>(reply: Reply<T>, f: F) -> Reply<U>
where
    T: 'static,
    U: 'static,
    F: FnMut(T) -> U + 'static,
{
    Box::new(MapReader {
        inner: reply,
        f: Box::new(f),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vec_reader() {
        let mut reader = VecReader::new(vec![1, 2]);
        assert_eq!(reader.read().unwrap(), Some(1));
        reader.cancel();
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_map_reply() {
        let reply: Reply<u32> = Box::new(VecReader::new(vec![1, 2, 3]));
        let mut mapped = map_reply(reply, |x| format!("#{}", x));
        assert_eq!(mapped.read().unwrap().as_deref(), Some("#1"));
        assert_eq!(mapped.read().unwrap().as_deref(), Some("#2"));
        mapped.cancel();
        assert_eq!(mapped.read().unwrap(), None);
    }
}
