//! Tests for the conversion engine
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use crate::capabilities::Capabilities;
    use crate::engine::{callback, Callback, Converter, Formattable, FormatterRef, RuleSet, StepItem};
    use crate::error::Error;
    use crate::registry::{BuiltinRegistry, FunctionRegistry};
    use crate::value::{Record, Value};
    use serde_json::json;

    fn converter() -> Converter {
        Converter::builder().capabilities(Capabilities::precise()).build()
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[derive(Default)]
    struct AddFour;

    impl Formattable for AddFour {
        fn format(&self, value: Value) -> Value {
            match value {
                Value::Int(n) => Value::Int(n + 4),
                other => other,
            }
        }
    }

    #[test]
    fn test_mass_convert() {
        let input = record(json!({
            "foo": "jksdalfs8(&$##",
            "something_foo": "jksdalfs8(&$##",
            "something_bar": "   something ",
            "baz_something": 2,
            "same": "I wont change",
            "array": ["faksd1", "sladfjl2", "sadjs3"],
        }));
        let rules = RuleSet::new()
            .rule("*foo*", "onlyNumbers")
            .rule("*bar", "trim|suffix:yay")
            .rule("baz*", "add:2")
            .rule("array", "onlyNumbers");

        let output = converter().apply(&input, &rules).unwrap();

        assert_eq!(
            output.to_json(),
            json!({
                "foo": "8",
                "something_foo": "8",
                "something_bar": "somethingyay",
                "baz_something": "4",
                "same": "I wont change",
                "array": ["1", "2", "3"],
            })
        );
    }

    #[test]
    fn test_nested_arrays_are_converted_leaf_wise() {
        let input = record(json!({"codes": ["123a", ["b456", "c7"]]}));
        let rules = RuleSet::new().rule("codes", "onlyNumbers");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["codes"].to_json(), json!(["123", ["456", "7"]]));
    }

    #[test]
    fn test_bail_if_empty_skips_remaining_steps() {
        let input = record(json!({"date": null, "other": ""}));
        let rules = RuleSet::new()
            .rule("date", "bailIfEmpty|toDate")
            .rule("other", "bailIfEmpty|suffix:x");
        let output = converter().apply(&input, &rules).unwrap();
        assert!(output["date"].is_null());
        assert_eq!(output["other"], Value::from(""));
    }

    #[test]
    fn test_bail_if_empty_acts_per_leaf() {
        let input = record(json!({"tags": ["", "a", null, []]}));
        let rules = RuleSet::new().rule("tags", "bailIfEmpty|suffix:!");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["tags"].to_json(), json!(["", "a!", null, []]));
    }

    #[test]
    fn test_bail_after_array_is_produced() {
        let input = record(json!({"list": "a,,b"}));
        let rules = RuleSet::new().rule("list", "bailIfEmpty|explode|bailIfEmpty|toUpper");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["list"].to_json(), json!(["A", "", "B"]));
    }

    #[test]
    fn test_steps_run_in_declared_order() {
        let input = record(json!({"name": "   something "}));
        let output = converter()
            .apply(&input, &RuleSet::new().rule("name", "trim|suffix:yay"))
            .unwrap();
        assert_eq!(output["name"], Value::from("somethingyay"));

        let output = converter()
            .apply(&input, &RuleSet::new().rule("name", "suffix:yay|trim"))
            .unwrap();
        assert_eq!(output["name"], Value::from("something yay"));
    }

    #[test]
    fn test_callbacks_and_formatters_mix_with_named_steps() {
        let input = record(json!({"amount": "kalsdf23"}));
        let add_two = callback(|value| match value.text().and_then(|t| t.parse::<i64>().ok()) {
            Some(n) => Value::Int(n + 2),
            None => value,
        });
        let rules = RuleSet::new().rule(
            "amount",
            vec![
                StepItem::from("onlyNumbers"),
                StepItem::from("add:2"),
                StepItem::from(add_two),
                StepItem::from(FormatterRef::of_type::<AddFour>()),
            ],
        );

        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["amount"], Value::Int(31));
    }

    #[test]
    fn test_formatter_instance_step() {
        let input = record(json!({"n": 1}));
        let rules = RuleSet::new().rule("n", FormatterRef::instance(AddFour));
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["n"], Value::Int(5));
    }

    #[test]
    fn test_callbacks_receive_each_leaf() {
        let input = record(json!({"values": [1, [2, 3]]}));
        let rules = RuleSet::new().rule(
            "values",
            callback(|value| match value {
                Value::Int(n) => Value::Int(n * 10),
                other => other,
            }),
        );
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["values"].to_json(), json!([10, [20, 30]]));
    }

    #[test]
    fn test_later_rules_override_earlier_ones() {
        let input = record(json!({"a": "x", "b": "y"}));
        let rules = RuleSet::new()
            .rule("*", callback(|_| Value::from("first")))
            .rule("a", callback(|_| Value::from("second")));
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["a"], Value::from("second"));
        assert_eq!(output["b"], Value::from("first"));
    }

    #[test]
    fn test_later_rules_see_earlier_results() {
        let input = record(json!({"name_first": "x"}));
        let rules = RuleSet::new()
            .rule("name*", "suffix:1")
            .rule("name_first", "suffix:2");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["name_first"], Value::from("x12"));
    }

    #[test]
    fn test_duplicate_pattern_replaces_steps_in_place() {
        let rules = RuleSet::new()
            .rule("a", "trim")
            .rule("b", "trim")
            .rule("a", "toUpper");
        assert_eq!(rules.patterns().collect::<Vec<_>>(), vec!["a", "b"]);

        let output = converter()
            .apply(&record(json!({"a": " x "})), &rules)
            .unwrap();
        assert_eq!(output["a"], Value::from(" X "));
    }

    #[test]
    fn test_unknown_step_is_a_configuration_error() {
        let input = record(json!({"a": "x"}));
        let rules = RuleSet::new().rule("a", "frobnicate");
        let err = converter().apply(&input, &rules).unwrap_err();
        assert!(err.is_configuration());
        match err {
            Error::UnknownStep { name, value_kind } => {
                assert_eq!(name, "frobnicate");
                assert_eq!(value_kind, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_step_on_unmatched_rule_is_not_evaluated() {
        let input = record(json!({"a": "x"}));
        let rules = RuleSet::new().rule("zzz", "frobnicate");
        assert!(converter().apply(&input, &rules).is_ok());
    }

    #[test]
    fn test_apply_leaves_input_untouched_on_error() {
        let input = record(json!({"a": " x ", "b": "y"}));
        let rules = RuleSet::new().rule("a", "trim").rule("b", "frobnicate");
        assert!(converter().apply(&input, &rules).is_err());
        assert_eq!(input["a"], Value::from(" x "));
    }

    #[test]
    fn test_apply_in_place_keeps_earlier_rules_on_error() {
        let mut target = record(json!({"a": " x ", "b": "y"}));
        let rules = RuleSet::new().rule("a", "trim").rule("b", "frobnicate");
        assert!(converter().apply_in_place(&mut target, &rules).is_err());
        assert_eq!(target["a"], Value::from("x"));
        assert_eq!(target["b"], Value::from("y"));
    }

    #[test]
    fn test_delegate_fallback_for_rich_values() {
        let input = record(json!({"date": "12/24/2018"}));
        let rules = RuleSet::new().rule("date", "toDate|addDays:1|format:m/d/Y");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(output["date"], Value::from("12/25/2018"));
    }

    #[test]
    fn test_delegate_without_capability_fails() {
        let input = record(json!({"date": "12/24/2018"}));
        let rules = RuleSet::new().rule("date", "toDate|frobnicate");
        match converter().apply(&input, &rules).unwrap_err() {
            Error::UnknownStep { value_kind, .. } => assert_eq!(value_kind, "date"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_named_results_become_null() {
        let input = record(json!({"a": "   ", "b": "x"}));
        let rules = RuleSet::new()
            .rule("a", "trim")
            .rule("b", callback(|_| Value::from("")));
        let output = converter().apply(&input, &rules).unwrap();
        assert!(output["a"].is_null());
        assert_eq!(output["b"], Value::from(""));
    }

    #[test]
    fn test_dotted_keys_are_matched_literally() {
        let input = record(json!({"a.b": " x ", "a": {"b": " nested "}}));
        let rules = RuleSet::new().rule("a.*", "trim");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(
            output.to_json(),
            json!({"a.b": "x", "a": {"b": " nested "}})
        );
    }

    #[test]
    fn test_nested_records_are_converted_leaf_wise() {
        let input = record(json!({
            "address": {"street": "  12 Main  ", "zip": [" 9 "], "geo": {"lat": " 1.5 "}},
            "name": "  kept  ",
        }));
        let rules = RuleSet::new().rule("address", "trim");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(
            output.to_json(),
            json!({
                "address": {"street": "12 Main", "zip": ["9"], "geo": {"lat": "1.5"}},
                "name": "  kept  ",
            })
        );
        assert_eq!(
            output["address"].as_map().unwrap().keys().collect::<Vec<_>>(),
            vec!["street", "zip", "geo"]
        );
    }

    #[test]
    fn test_bail_if_empty_acts_per_record_field() {
        let input = record(json!({"contact": {"phone": "", "fax": "5551234567", "extra": {}}}));
        let rules = RuleSet::new().rule("contact", "bailIfEmpty|onlyNumbers|phone");
        let output = converter().apply(&input, &rules).unwrap();
        assert_eq!(
            output["contact"].to_json(),
            json!({"phone": "", "fax": "(555)123-4567", "extra": {}})
        );
    }

    #[test]
    fn test_oversized_scale_is_a_configuration_error() {
        let input = record(json!({"n": "1.5"}));
        for descriptor in ["decimals:200000000", "add:1,70000"] {
            let err = converter()
                .apply(&input, &RuleSet::new().rule("n", descriptor))
                .unwrap_err();
            assert!(err.is_configuration(), "{descriptor}: {err}");
            assert!(matches!(err, Error::InvalidArgument { .. }));
        }
    }

    #[test]
    fn test_fallible_callback_errors_propagate() {
        let input = record(json!({"a": "x"}));
        let rules = RuleSet::new().rule(
            "a",
            Callback::fallible(|_| Err(anyhow::anyhow!("lookup service unavailable"))),
        );
        let err = converter().apply(&input, &rules).unwrap_err();
        assert!(matches!(err, Error::Callback { .. }));
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("lookup service unavailable"));
    }

    #[test]
    fn test_custom_functions() {
        let converter = Converter::builder()
            .float_arithmetic()
            .function("shout", |value, args| {
                let marks = args.first().map(String::as_str).unwrap_or("!");
                Ok(Value::String(format!("{}{}", value, marks)))
            })
            .build();
        let input = record(json!({"a": "hey"}));
        let output = converter
            .apply(&input, &RuleSet::new().rule("a", "shout:!!"))
            .unwrap();
        assert_eq!(output["a"], Value::from("hey!!"));
    }

    #[test]
    fn test_custom_registry_ignores_builder_functions() {
        let registry = BuiltinRegistry::empty(Capabilities::precise())
            .with_function("mark", |value, _| Ok(Value::String(format!("<{}>", value))));
        let converter = Converter::builder()
            .registry(std::sync::Arc::new(registry))
            .function("shout", |value, _| Ok(value))
            .build();

        let input = record(json!({"a": "x", "b": "y"}));
        let output = converter
            .apply(&input, &RuleSet::new().rule("a", "mark"))
            .unwrap();
        assert_eq!(output["a"], Value::from("<x>"));

        let err = converter
            .apply(&input, &RuleSet::new().rule("b", "shout"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownStep { .. }));
        assert!(!converter.registry().contains("trim"));
    }

    #[test]
    fn test_malformed_descriptor_fails_before_any_key() {
        let input = record(json!({"a": "x"}));
        let rules = RuleSet::new().rule("a", r#"suffix:"open"#);
        assert!(matches!(
            converter().apply(&input, &rules),
            Err(Error::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_rule_set_from_json_keeps_order() {
        let rules: RuleSet =
            serde_json::from_str(r#"{"b": "trim", "a": ["suffix:x|y", "toUpper"]}"#).unwrap();
        assert_eq!(rules.patterns().collect::<Vec<_>>(), vec!["b", "a"]);

        let output = converter()
            .apply(&record(json!({"a": "v", "b": " w "})), &rules)
            .unwrap();
        assert_eq!(output["a"], Value::from("VX|Y"));
        assert_eq!(output["b"], Value::from("w"));
    }

    #[test]
    fn test_converter_call_is_leaf_wise() {
        let result = converter()
            .call("onlyNumbers", Value::from(vec!["a1", "b2"]), &[])
            .unwrap();
        assert_eq!(result, Value::from(vec!["1", "2"]));

        let nested = Value::from(json!({"a": "x1", "b": ["y2"]}));
        let result = converter().call("onlyNumbers", nested, &[]).unwrap();
        assert_eq!(result.to_json(), json!({"a": "1", "b": ["2"]}));
    }
}
