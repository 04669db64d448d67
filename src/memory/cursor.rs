use bson::Document;

use super::eval::{compare_docs, project_fields};
use crate::errors::OdmError;
use crate::session::Cursor;

/// A configuration call received by a [`MemoryCursor`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorCall {
    Limit(Option<i64>),
    Skip(Option<i64>),
    Sort(Document),
    SlaveOkay(bool),
    Snapshot,
    Immortal(bool),
    Hint(Document),
}

/// Cursor over documents already matched by the filter. Ordering, paging and projection are
/// applied when results are requested.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    docs: Vec<Document>,
    fields: Vec<String>,
    limit: Option<i64>,
    skip: Option<i64>,
    sort: Document,
    slave_okay: bool,
    snapshot: bool,
    immortal: bool,
    hints: Vec<Document>,
    calls: Vec<CursorCall>,
}

impl MemoryCursor {
    pub(crate) fn new(docs: Vec<Document>, fields: Vec<String>) -> Self {
        Self { docs, fields, ..Self::default() }
    }

    /// Every configuration call received so far.
    pub fn calls(&self) -> &[CursorCall] {
        &self.calls
    }

    pub const fn is_snapshot(&self) -> bool {
        self.snapshot
    }

    pub const fn is_slave_okay(&self) -> bool {
        self.slave_okay
    }

    pub const fn is_immortal(&self) -> bool {
        self.immortal
    }

    pub fn hints(&self) -> &[Document] {
        &self.hints
    }

    fn window(&self) -> Result<Vec<&Document>, OdmError> {
        let skip = match self.skip {
            None => 0,
            Some(n) => usize::try_from(n).map_err(|_| {
                log::warn!("memory cursor rejected skip {n}");
                OdmError::QueryError(format!("skip must be non-negative, got {n}"))
            })?,
        };
        // A negative limit caps the result size the same way a positive one does.
        let limit = match self.limit {
            None | Some(0) => usize::MAX,
            Some(n) => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
        };
        let mut docs: Vec<&Document> = self.docs.iter().collect();
        if !self.sort.is_empty() {
            docs.sort_by(|a, b| compare_docs(a, b, &self.sort));
        }
        Ok(docs.into_iter().skip(skip).take(limit).collect())
    }
}

impl Cursor for MemoryCursor {
    type Item = Document;

    fn limit(&mut self, limit: Option<i64>) -> Result<(), OdmError> {
        self.limit = limit;
        self.calls.push(CursorCall::Limit(limit));
        Ok(())
    }

    fn skip(&mut self, skip: Option<i64>) -> Result<(), OdmError> {
        self.skip = skip;
        self.calls.push(CursorCall::Skip(skip));
        Ok(())
    }

    fn sort(&mut self, sort: &Document) -> Result<(), OdmError> {
        self.sort = sort.clone();
        self.calls.push(CursorCall::Sort(sort.clone()));
        Ok(())
    }

    fn slave_okay(&mut self, ok: bool) -> Result<(), OdmError> {
        self.slave_okay = ok;
        self.calls.push(CursorCall::SlaveOkay(ok));
        Ok(())
    }

    fn snapshot(&mut self) -> Result<(), OdmError> {
        self.snapshot = true;
        self.calls.push(CursorCall::Snapshot);
        Ok(())
    }

    fn immortal(&mut self, immortal: bool) -> Result<(), OdmError> {
        self.immortal = immortal;
        self.calls.push(CursorCall::Immortal(immortal));
        Ok(())
    }

    fn hint(&mut self, key_pattern: &Document) -> Result<(), OdmError> {
        if key_pattern.is_empty() {
            return Err(OdmError::QueryError("hint key pattern is empty".into()));
        }
        self.hints.push(key_pattern.clone());
        self.calls.push(CursorCall::Hint(key_pattern.clone()));
        Ok(())
    }

    fn get_results(&mut self) -> Result<Vec<Document>, OdmError> {
        let window = self.window()?;
        Ok(window.into_iter().map(|d| project_fields(d, &self.fields)).collect())
    }

    fn count(&mut self, include_limit_skip: bool) -> Result<u64, OdmError> {
        let n = if include_limit_skip { self.window()?.len() } else { self.docs.len() };
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}
