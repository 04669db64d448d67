use bson::{Bson, doc};
use odm_query::memory::eval::{compare_bson, matches};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        cases: 256,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_integer_operators_agree_with_i64(a in any::<i64>(), b in any::<i64>()) {
        let d = doc! {"n": a};
        prop_assert_eq!(matches(&d, &doc! {"n": {"$gt": b}}), a > b);
        prop_assert_eq!(matches(&d, &doc! {"n": {"$lte": b}}), a <= b);
        prop_assert_eq!(matches(&d, &doc! {"n": b}), a == b);
        prop_assert_eq!(compare_bson(&Bson::Int64(a), &Bson::Int64(b)), a.cmp(&b));
    }

    #[test]
    fn prop_int32_and_int64_mix(a in any::<i32>(), b in any::<i64>()) {
        let d = doc! {"n": a};
        prop_assert_eq!(matches(&d, &doc! {"n": {"$lt": b}}), i64::from(a) < b);
        prop_assert_eq!(matches(&d, &doc! {"n": {"$in": [b]}}), i64::from(a) == b);
    }
}
