//! Property-based tests for defaults resolution and value conversion.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use begins::convert::{to_bool, to_list, Converter};
use begins::{ConfigFile, Defaults, ResolvedDefault, Value};

/// Strategy for parameter names.
fn param_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

/// Strategy for plain config and environment values.
fn plain_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._-]{0,20}"
}

proptest! {
    /// Whichever sources are present, the strongest one decides.
    #[test]
    fn resolver_precedence(
        name in param_name(),
        explicit in proptest::option::of(plain_value()),
        config in proptest::option::of(plain_value()),
        env in proptest::option::of(plain_value()),
    ) {
        let mut defaults = Defaults::new().with_env_prefix("P_");
        if let Some(config) = &config {
            let text = format!("[main]\n{} = {:?}\n", name, config);
            defaults = defaults.with_config(ConfigFile::parse(&text).unwrap().config);
        }
        let mut vars = HashMap::new();
        if let Some(env) = &env {
            vars.insert(format!("P_{}", name.to_uppercase()), env.clone());
        }
        let defaults = defaults.with_environment(Arc::new(vars)).scoped("main");

        let explicit_value = explicit.clone().map(Value::from);
        let resolved = defaults.resolve(&name, explicit_value.as_ref());
        let expected = env.or(config).or(explicit);

        match expected {
            Some(text) => {
                let expected = Value::from(text);
                prop_assert_eq!(resolved.value(), Some(&expected));
            }
            None => prop_assert_eq!(resolved, ResolvedDefault::Required),
        }
    }

    /// Lists never contain empty items and keep everything else.
    #[test]
    fn to_list_drops_only_empty_items(items in proptest::collection::vec("[a-z0-9]{0,5}", 0..10)) {
        let joined = items.join(",");
        let expected: Vec<String> = items.into_iter().filter(|i| !i.is_empty()).collect();
        prop_assert_eq!(to_list(&joined), expected);
    }

    /// Integers survive conversion from their decimal text.
    #[test]
    fn int_conversion_matches_parse(n in any::<i64>()) {
        prop_assert_eq!(
            Converter::Int.convert(Value::from(n.to_string())),
            Ok(Value::Int(n))
        );
    }

    /// Boolean words are accepted in any letter case.
    #[test]
    fn to_bool_ignores_case(
        word in prop_oneof![Just("yes"), Just("true"), Just("on"), Just("no"), Just("false"), Just("off")],
        upper in any::<bool>(),
    ) {
        let text = if upper { word.to_uppercase() } else { word.to_string() };
        let expected = matches!(word, "yes" | "true" | "on");
        prop_assert_eq!(to_bool(&text), Ok(expected));
    }
}
