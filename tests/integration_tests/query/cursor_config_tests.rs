use bson::{Document, doc};
use odm_query::memory::CursorCall;
use odm_query::{ClassMetadata, Cursor, OdmError, Query, Session};

use crate::integration_tests::_support::{empty_session, order_session};

#[test]
fn defaults_are_sent_unconditionally_without_snapshot() {
    let s = empty_session();
    let q = Query::for_class(&s, "Order").unwrap();
    let cursor = q.get_cursor().unwrap();
    assert_eq!(
        cursor.calls(),
        [
            CursorCall::Limit(None),
            CursorCall::Skip(None),
            CursorCall::Sort(Document::new()),
            CursorCall::Immortal(false),
            CursorCall::SlaveOkay(false),
        ]
    );
    assert!(!cursor.is_snapshot());
}

#[test]
fn configured_cursor_receives_every_option_in_order() {
    let s = empty_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.limit(20)
        .skip(5)
        .sort("createdAt", "desc")
        .slave_okay(true)
        .snapshot(true)
        .immortal(true)
        .hint(doc! {"status": 1})
        .hint(doc! {"createdAt": -1});
    let cursor = q.get_cursor().unwrap();
    assert_eq!(
        cursor.calls(),
        [
            CursorCall::Limit(Some(20)),
            CursorCall::Skip(Some(5)),
            CursorCall::Sort(doc! {"createdAt": -1}),
            CursorCall::Immortal(true),
            CursorCall::SlaveOkay(true),
            CursorCall::Snapshot,
            CursorCall::Hint(doc! {"status": 1}),
            CursorCall::Hint(doc! {"createdAt": -1}),
        ]
    );
    assert!(cursor.is_slave_okay() && cursor.is_immortal() && cursor.is_snapshot());
}

#[test]
fn cleared_flags_still_reach_cursor() {
    let s = empty_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.slave_okay(true).immortal(true).snapshot(true);
    q.slave_okay(false).immortal(false).snapshot(false);
    let cursor = q.iterate().unwrap();
    assert!(cursor.calls().contains(&CursorCall::SlaveOkay(false)));
    assert!(cursor.calls().contains(&CursorCall::Immortal(false)));
    assert!(!cursor.calls().contains(&CursorCall::Snapshot));
}

#[test]
fn each_cursor_is_compiled_from_current_state() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.limit(2);
    assert_eq!(q.execute().unwrap().len(), 2);
    q.limit(3).where_("status", "closed").unwrap();
    assert_eq!(q.execute().unwrap().len(), 3);
    assert_eq!(q.count(false).unwrap(), 3);
}

#[test]
fn hint_error_from_cursor_is_propagated() {
    let s = empty_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.hint(Document::new());
    assert!(matches!(q.get_cursor(), Err(OdmError::QueryError(_))));
}

#[test]
fn negative_pagination_is_passed_through_to_cursor() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.limit(-2);
    let cursor = q.get_cursor().unwrap();
    assert_eq!(cursor.calls()[0], CursorCall::Limit(Some(-2)));
    assert_eq!(q.execute().unwrap().len(), 2);
    q.skip(-1);
    assert!(matches!(q.execute(), Err(OdmError::QueryError(_))));
}

/// Session whose cursors fail on one configuration dimension.
struct BrokenSession;

#[derive(Debug)]
struct ReplicaUnavailable;

impl std::fmt::Display for ReplicaUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("no secondary available")
    }
}

impl std::error::Error for ReplicaUnavailable {}

struct BrokenCursor {
    configured: Vec<&'static str>,
}

impl Cursor for BrokenCursor {
    type Item = Document;

    fn limit(&mut self, _: Option<i64>) -> Result<(), OdmError> {
        self.configured.push("limit");
        Ok(())
    }
    fn skip(&mut self, _: Option<i64>) -> Result<(), OdmError> {
        self.configured.push("skip");
        Ok(())
    }
    fn sort(&mut self, _: &Document) -> Result<(), OdmError> {
        self.configured.push("sort");
        Ok(())
    }
    fn slave_okay(&mut self, _: bool) -> Result<(), OdmError> {
        Err(OdmError::Collaborator(Box::new(ReplicaUnavailable)))
    }
    fn snapshot(&mut self) -> Result<(), OdmError> {
        unreachable!("snapshot is never requested by these tests")
    }
    fn immortal(&mut self, _: bool) -> Result<(), OdmError> {
        self.configured.push("immortal");
        Ok(())
    }
    fn hint(&mut self, _: &Document) -> Result<(), OdmError> {
        Ok(())
    }
    fn get_results(&mut self) -> Result<Vec<Document>, OdmError> {
        Ok(Vec::new())
    }
    fn count(&mut self, _: bool) -> Result<u64, OdmError> {
        Ok(0)
    }
}

impl Session for BrokenSession {
    type Cursor = BrokenCursor;

    fn class_metadata(&self, class_name: &str) -> Result<ClassMetadata, OdmError> {
        Ok(ClassMetadata::new(class_name))
    }

    fn find(&self, _: &str, _: &Document, _: &[String]) -> Result<BrokenCursor, OdmError> {
        Ok(BrokenCursor { configured: Vec::new() })
    }
}

#[test]
fn collaborator_errors_surface_unchanged() {
    let q = Query::for_class(&BrokenSession, "Order").unwrap();
    let err = q.execute().err().unwrap();
    assert!(matches!(err, OdmError::Collaborator(_)));
    assert_eq!(err.to_string(), "no secondary available");
    assert!(q.get_single_result().is_err());
    assert!(q.count(true).is_err());
}

#[test]
fn broken_cursor_is_configured_up_to_failure() {
    let session = BrokenSession;
    let mut cursor = session.find("Order", &Document::new(), &[]).unwrap();
    let options = Query::for_class(&session, "Order").unwrap().compile_request().unwrap().options;
    assert!(options.apply_to(&mut cursor).is_err());
    assert_eq!(cursor.configured, ["limit", "skip", "sort", "immortal"]);
    assert!(cursor.get_results().unwrap().is_empty());
    assert_eq!(cursor.count(false).unwrap(), 0);
}
