// Property Tests for SparseDb
// These tests check the key ordering, row containment and merge properties on generated input

use proptest::prelude::*;
use sparsedb::{
    KeyBuilder, KeyCodec, KeyType, MemIndex, OrderedIndex, Row, RowMerger, RowStore, Schema,
    Value, ValueCodec, WriteTimestamp,
};

fn encode(value: Value, key_type: KeyType) -> Vec<u8> {
    KeyCodec::encode_primary_key(&value, key_type).unwrap()
}

fn column_name() -> impl Strategy<Value = String> {
    "[^\\x00]{1,12}"
}

fn column_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Absent),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan()).prop_map(Value::Double),
        ".*".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Binary),
    ]
}

proptest! {
    #[test]
    fn prop_integer_order(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(a.cmp(&b), encode(Value::Int(a), KeyType::Integer).cmp(&encode(Value::Int(b), KeyType::Integer)));
    }

    #[test]
    fn prop_long_and_date_order(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(a.cmp(&b), encode(Value::Long(a), KeyType::Long).cmp(&encode(Value::Long(b), KeyType::Long)));
        prop_assert_eq!(a.cmp(&b), encode(Value::Date(a), KeyType::Date).cmp(&encode(Value::Date(b), KeyType::Date)));
    }

    #[test]
    fn prop_float_order(a in any::<f32>(), b in any::<f32>()) {
        prop_assume!(!a.is_nan() && !b.is_nan());
        let ka = encode(Value::Float(a), KeyType::Float);
        let kb = encode(Value::Float(b), KeyType::Float);
        prop_assert_eq!(a.partial_cmp(&b).unwrap(), ka.cmp(&kb));
    }

    #[test]
    fn prop_double_order(a in any::<f64>(), b in any::<f64>()) {
        prop_assume!(!a.is_nan() && !b.is_nan());
        let ka = encode(Value::Double(a), KeyType::Double);
        let kb = encode(Value::Double(b), KeyType::Double);
        prop_assert_eq!(a.partial_cmp(&b).unwrap(), ka.cmp(&kb));
    }

    #[test]
    fn prop_text_order(a in ".*", b in ".*") {
        let ka = encode(Value::from(a.as_str()), KeyType::UnicodeText);
        let kb = encode(Value::from(b.as_str()), KeyType::UnicodeText);
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn prop_ascii_order(a in "[\\x00-\\x7f]*", b in "[\\x00-\\x7f]*") {
        let ka = encode(Value::from(a.as_str()), KeyType::AsciiText);
        let kb = encode(Value::from(b.as_str()), KeyType::AsciiText);
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn prop_value_round_trip(value in column_value()) {
        let encoded = ValueCodec::encode(&value).unwrap();
        prop_assert_eq!(ValueCodec::decode(&encoded).unwrap(), value);
    }

    /// Every key of a row lies inside its bounds; every key of another row lies outside.
    #[test]
    fn prop_row_containment(
        a in ".*",
        b in ".*",
        column in column_name(),
        ts in any::<i64>(),
    ) {
        let schema = Schema::new("prop", "pk", KeyType::UnicodeText).unwrap();
        let lower = KeyCodec::build_lower_bound(&schema, &Value::from(a.as_str())).unwrap();
        let upper = KeyCodec::build_upper_bound(&schema, &Value::from(a.as_str())).unwrap();

        for (pk, inside) in [(a.as_str(), true), (b.as_str(), a == b)] {
            let mut key = KeyBuilder::new();
            KeyCodec::append_lower_bound(&mut key, &schema, &Value::from(pk)).unwrap();
            KeyCodec::append_column_and_timestamp(&mut key, &column, ts);
            let contained = key.as_slice() >= lower.as_slice() && key.as_slice() < upper.as_slice();
            prop_assert_eq!(contained, inside);
        }
    }

    #[test]
    fn prop_integer_row_containment(a in any::<i32>(), b in any::<i32>(), ts in any::<i64>()) {
        let schema = Schema::new("prop", "pk", KeyType::Integer).unwrap();
        let lower = KeyCodec::build_lower_bound(&schema, &Value::Int(a)).unwrap();
        let upper = KeyCodec::build_upper_bound(&schema, &Value::Int(a)).unwrap();

        let mut key = KeyBuilder::new();
        KeyCodec::append_lower_bound(&mut key, &schema, &Value::Int(b)).unwrap();
        KeyCodec::append_column_and_timestamp(&mut key, "\u{10FFFF}", ts);
        let contained = key.as_slice() >= lower.as_slice() && key.as_slice() < upper.as_slice();
        prop_assert_eq!(contained, a == b);
    }

    /// Writing revisions then reading matches a last-writer-wins model.
    #[test]
    fn prop_read_matches_model(
        writes in proptest::collection::vec((column_name(), column_value(), -50i64..50), 1..40),
        max_ts in proptest::option::of(-60i64..60),
    ) {
        let schema = Schema::new("prop", "pk", KeyType::Long).unwrap();
        let store = RowStore::new(MemIndex::new(), schema).unwrap();

        // Revisions at the same column and timestamp overwrite each other
        let mut model = std::collections::BTreeMap::new();
        for (column, value, ts) in &writes {
            prop_assume!(column != "pk");
            store.write(&Row::new().with("pk", 1i64).with(column.clone(), value.clone()), WriteTimestamp::At(*ts)).unwrap();
            model.insert((column.clone(), *ts), value.clone());
            model.insert(("pk".to_string(), *ts), Value::Long(1));
        }

        let mut expected = RowMerger::new(max_ts);
        for ((column, ts), value) in model {
            expected.accept(&column, ts, value);
        }

        prop_assert_eq!(store.read_at(&Value::Long(1), max_ts).unwrap(), expected.finish());
    }

    #[test]
    fn prop_merge_is_idempotent(
        writes in proptest::collection::vec((column_name(), column_value(), any::<i64>()), 0..20),
    ) {
        let index = MemIndex::new();
        let schema = Schema::new("prop", "pk", KeyType::Integer).unwrap();
        let store = RowStore::new(&index, schema).unwrap();
        for (column, value, ts) in &writes {
            prop_assume!(column != "pk");
            store.write(&Row::new().with("pk", 3).with(column.clone(), value.clone()), WriteTimestamp::At(*ts)).unwrap();
        }

        let lower = KeyCodec::build_lower_bound(store.schema(), &Value::Int(3)).unwrap();
        let upper = KeyCodec::build_upper_bound(store.schema(), &Value::Int(3)).unwrap();
        let first = RowMerger::merge(index.range_scan(&lower, &upper).unwrap(), lower.len(), None).unwrap();
        let second = RowMerger::merge(index.range_scan(&lower, &upper).unwrap(), lower.len(), None).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, store.read(&Value::Int(3)).unwrap());
    }
}
