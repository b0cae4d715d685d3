use crate::filter_state::FilterState;
use crate::table::TableKind;
use index::request::{
    FuzzyFindRequest, LookupRequest, RefsRequest, RelationsRequest, RemoteRequest,
};

/// Builds one remote request from the accumulated filter state.
///
/// Requests are always built from the full current state, never from the
/// values of a single filter call.
pub struct RequestBuilder<'a> {
    kind: TableKind,
    state: &'a FilterState,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(kind: TableKind, state: &'a FilterState) -> Self {
        Self { kind, state }
    }

    /// Builds the request for the whole state.
    ///
    /// For symbols with a single name, that name is the fuzzy query. For
    /// refs, every accumulated id is requested at once.
    pub fn build(&self) -> RemoteRequest {
        match self.kind {
            TableKind::Symbols => self.symbols(self.state.names().first().map(String::as_str)),
            TableKind::Refs => self.refs(self.state.ids().to_vec()),
            TableKind::Relations(predicate) => RemoteRequest::Relations(RelationsRequest {
                subjects: self.state.ids().to_vec(),
                predicate,
                limit: None,
            }),
        }
    }

    /// Builds the sub-request for one queued value of a multi-query: a name
    /// for symbols, a symbol id for refs.
    ///
    /// # Arguments
    ///
    /// * `value` - The queued value.
    pub fn build_for(&self, value: &str) -> RemoteRequest {
        match self.kind {
            TableKind::Symbols => self.symbols(Some(value)),
            TableKind::Refs => self.refs(vec![value.to_string()]),
            TableKind::Relations(_) => self.build(),
        }
    }

    fn symbols(&self, query: Option<&str>) -> RemoteRequest {
        // Ids win over every fuzzy parameter.
        if !self.state.ids().is_empty() {
            return RemoteRequest::Lookup(LookupRequest {
                ids: self.state.ids().to_vec(),
            });
        }
        RemoteRequest::FuzzyFind(FuzzyFindRequest {
            query: query.map(String::from),
            scopes: self.state.scopes().to_vec(),
            any_scope: self.state.any_scope(),
            proximity_paths: self.state.path_hint().map(String::from).into_iter().collect(),
            limit: None,
        })
    }

    fn refs(&self, ids: Vec<String>) -> RemoteRequest {
        RemoteRequest::Refs(RefsRequest {
            ids,
            filter: self.state.ref_mask(),
            limit: None,
        })
    }
}
