use crate::filter_state::FilterState;
use crate::plan::Plan;
use crate::projector::project;
use crate::record::Record;
use crate::request::RequestBuilder;
use crate::rowid::{edge_rowid, entity_rowid};
use crate::stream::{execute, MultiQueryStream, RemoteStream, ResultStream};
use crate::table::TableKind;
use common::{Field, SymqlError};
use index::service::SymbolIndex;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Opened, no filter call yet.
    Idle,
    /// Folding in filter values and replacing the stream.
    Filtering,
    /// Positioned on a row.
    Streaming,
    Exhausted,
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One scan over a virtual table.
///
/// Filter values accumulate for the whole life of the cursor, and every
/// filter call replaces the stream with one built from everything seen so
/// far. At most one stream is open at a time.
pub struct Cursor {
    kind: TableKind,
    index: Arc<dyn SymbolIndex>,
    filter: FilterState,
    stream: Option<Box<dyn ResultStream<Record>>>,
    state: CursorState,
    /// Row ids handed out for rows without an entity id.
    seq: i64,
}

impl Cursor {
    pub fn new(kind: TableKind, index: Arc<dyn SymbolIndex>) -> Self {
        Self {
            kind,
            index,
            filter: FilterState::new(),
            stream: None,
            state: CursorState::Idle,
            seq: 0,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Values accumulated so far.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Starts or restarts the scan and moves to the first row.
    ///
    /// # Arguments
    ///
    /// * `plan` - Plan compiled for this query.
    /// * `values` - One value per plan argument.
    pub fn filter(&mut self, plan: &Plan, values: &[Field]) -> Result<(), SymqlError> {
        if self.state == CursorState::Closed {
            return Err(SymqlError::ExecutionError(String::from(
                "Filter called on a closed cursor",
            )));
        }
        self.state = CursorState::Filtering;
        self.close_stream();
        if let Err(e) = self.filter.accumulate(plan, values) {
            self.state = CursorState::Exhausted;
            return Err(e);
        }
        match self.open_stream() {
            Ok(stream) => self.stream = Some(stream),
            Err(e) => {
                warn!("Failed to open {} stream: {}", self.kind, e);
                self.state = CursorState::Exhausted;
                return Err(e);
            }
        }
        self.state = CursorState::Streaming;
        self.advance()
    }

    /// Moves to the next row.
    pub fn next(&mut self) -> Result<(), SymqlError> {
        match self.state {
            CursorState::Idle => Err(SymqlError::ExecutionError(String::from(
                "Next called before filter",
            ))),
            CursorState::Streaming => self.advance(),
            _ => Ok(()),
        }
    }

    /// True unless the cursor is positioned on a row.
    pub fn eof(&self) -> bool {
        self.state != CursorState::Streaming
    }

    /// Value of column `col` of the current row.
    pub fn column(&self, col: usize) -> Result<Field, SymqlError> {
        Ok(project(self.current()?, col))
    }

    /// Identity of the current row.
    pub fn rowid(&self) -> Result<i64, SymqlError> {
        match self.current()? {
            Record::Symbol(sym) => entity_rowid(sym.id.as_deref()),
            Record::Relation(rel) => edge_rowid(
                rel.subject_id.as_deref(),
                rel.object.as_ref().and_then(|o| o.id.as_deref()),
            ),
            Record::Ref(_) => Ok(self.seq),
        }
    }

    /// Cancels the stream and drops the accumulated values. Idempotent.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        self.close_stream();
        self.filter = FilterState::new();
        self.state = CursorState::Closed;
        debug!("Closed {} cursor", self.kind);
    }

    fn current(&self) -> Result<&Record, SymqlError> {
        let current = match (&self.stream, self.state) {
            (Some(stream), CursorState::Streaming) => stream.current(),
            _ => None,
        };
        current.ok_or_else(|| {
            SymqlError::ExecutionError(format!("Cursor is not on a row ({})", self.state))
        })
    }

    fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
    }

    fn advance(&mut self) -> Result<(), SymqlError> {
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                self.state = CursorState::Exhausted;
                return Ok(());
            }
        };
        match stream.try_advance() {
            Ok(true) => {
                self.seq += 1;
                Ok(())
            }
            Ok(false) => {
                self.close_stream();
                self.state = CursorState::Exhausted;
                Ok(())
            }
            Err(e) => {
                warn!("{} stream failed: {}", self.kind, e);
                self.close_stream();
                self.state = CursorState::Exhausted;
                Err(e)
            }
        }
    }

    /// Opens a stream reflecting the full accumulated state.
    fn open_stream(&self) -> Result<Box<dyn ResultStream<Record>>, SymqlError> {
        let builder = RequestBuilder::new(self.kind, &self.filter);
        let per_value = match self.kind {
            TableKind::Refs => Some(self.filter.ids().to_vec()),
            TableKind::Symbols if self.filter.ids().is_empty() && self.filter.names().len() > 1 => {
                Some(self.filter.names().to_vec())
            }
            _ => None,
        };
        match per_value {
            Some(values) => {
                debug!("Opening {} multi-query over {:?}", self.kind, values);
                let (kind, filter) = (self.kind, self.filter.clone());
                let index = Arc::clone(&self.index);
                let stream = MultiQueryStream::new(values, move |value: &String| {
                    let req = RequestBuilder::new(kind, &filter).build_for(value);
                    execute(index.as_ref(), &req)
                });
                Ok(Box::new(stream))
            }
            None => {
                let req = builder.build();
                debug!("Opening {} stream", self.kind);
                Ok(Box::new(RemoteStream::new(execute(self.index.as_ref(), &req)?)))
            }
        }
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.close();
    }
}
