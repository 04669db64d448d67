use bson::doc;
use odm_query::memory::CursorCall;
use odm_query::{Cursor, Query};

use crate::integration_tests::_support::{empty_session, order_session};

#[test]
fn open_orders_scenario_compiles_and_runs() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_("status", "open")
        .unwrap()
        .where_gte("amount", 100)
        .unwrap()
        .sort("createdAt", "desc")
        .limit(20);

    let req = q.compile_request().unwrap();
    assert_eq!(req.class_name, "Order");
    assert_eq!(req.filter, doc! {"status": "open", "amount": {"$gte": 100}});
    assert_eq!(req.options.sort, doc! {"createdAt": -1});
    assert_eq!(req.options.limit, Some(20));
    assert_eq!(req.options.skip, None);
    assert!(req.projection.is_empty());

    let created: Vec<i32> = q.execute().unwrap().iter().map(|d| d.get_i32("createdAt").unwrap()).collect();
    assert_eq!(created, vec![5, 4, 3, 2]);
}

#[test]
fn projection_limits_returned_fields() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.select(["amount"]).where_("status", "closed").unwrap();
    for d in q.execute().unwrap() {
        let mut keys: Vec<&str> = d.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["_id", "amount"]);
    }
}

#[test]
fn count_honours_limit_skip_only_when_asked() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_("status", "open").unwrap().skip(1).limit(2);
    assert_eq!(q.count(false).unwrap(), 5);
    assert_eq!(q.count(true).unwrap(), 2);
}

#[test]
fn single_result_returns_first_or_none() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.sort("amount", "asc").where_gt("amount", 300).unwrap();
    let first = q.get_single_result().unwrap().unwrap();
    assert_eq!(first.get_i32("amount").unwrap(), 350);

    q.where_("status", "archived").unwrap();
    assert!(q.get_single_result().unwrap().is_none());

    let empty = empty_session();
    assert!(Query::for_class(&empty, "Order").unwrap().get_single_result().unwrap().is_none());
}

#[test]
fn identifier_lookup_finds_inserted_document() {
    let s = order_session();
    let id = s.insert("Order", doc! {"status": "draft", "amount": 1}).unwrap();
    let hex = id.as_object_id().unwrap().to_hex();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_("id", hex.as_str()).unwrap();
    let found = q.get_single_result().unwrap().unwrap();
    assert_eq!(found.get_str("status").unwrap(), "draft");
    assert_eq!(q.count(false).unwrap(), 1);
}

#[test]
fn array_and_nested_operators_run_against_store() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_size("tags", 3).unwrap();
    assert_eq!(q.count(false).unwrap(), 2);

    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_all("tags", ["rush", "gift"]).unwrap().where_mod("amount", 100, 0).unwrap();
    let amounts: Vec<i32> = q.execute().unwrap().iter().map(|d| d.get_i32("amount").unwrap()).collect();
    assert_eq!(amounts, vec![100, 300]);

    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_in("customer.tier", [0]).unwrap().where_not_equal("status", "open").unwrap();
    assert_eq!(q.count(false).unwrap(), 1);

    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_type("amount", "int").unwrap().where_exists("missing", false).unwrap().where_range("amount", 100, 200).unwrap();
    assert_eq!(q.count(false).unwrap(), 1);
}

#[test]
fn iterate_returns_unexecuted_cursor() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_not_in("status", ["open"]).unwrap();
    let mut cursor = q.iterate().unwrap();
    assert_eq!(cursor.calls().len(), 5);
    cursor.limit(Some(1)).unwrap();
    assert_eq!(cursor.get_results().unwrap().len(), 1);
    assert_eq!(cursor.calls().last(), Some(&CursorCall::Limit(Some(1))));
}

#[test]
fn builder_is_reusable_after_execution() {
    let s = order_session();
    let mut q = Query::for_class(&s, "Order").unwrap();
    q.where_("status", "open").unwrap();
    let before = q.execute().unwrap().len();
    let again = q.execute().unwrap().len();
    assert_eq!(before, again);
    q.where_lte("amount", 100).unwrap();
    assert_eq!(q.execute().unwrap().len(), 2);
}
