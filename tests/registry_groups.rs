//! Tests for the process-wide subcommand groups.
//!
//! Groups are shared by every test in this binary, so each test runs
//! serially and starts from a reset group.

use serial_test::serial;

use begins::registry::{self, StaticPlugins};
use begins::{Error, Function, Program, Signature, Value};

fn constant(name: &str, value: &'static str) -> Function {
    Function::new(name, Signature::empty(), move |_| Ok(Value::from(value)))
}

#[test]
#[serial]
fn register_in_default_group() {
    registry::reset(None);

    let returned = registry::subcommand(constant("sub", "blue")).unwrap();
    assert_eq!(returned.name(), "sub");

    let snapshot = registry::snapshot(None);
    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["sub"]);

    registry::reset(None);
    assert!(registry::snapshot(None).is_empty());
}

#[test]
#[serial]
fn duplicate_in_group_rejected() {
    registry::reset(None);

    registry::subcommand(constant("cmd", "one")).unwrap();
    let err = registry::subcommand(constant("cmd", "two")).unwrap_err();
    assert!(matches!(err, Error::DuplicateRegistration(ref name) if name == "cmd"));

    registry::reset(None);
}

#[test]
#[serial]
fn groups_are_independent() {
    registry::reset(None);
    registry::reset(Some("tools"));

    registry::subcommand_in(Some("tools"), constant("cmd", "tools")).unwrap();
    registry::subcommand(constant("cmd", "default")).unwrap();

    assert_eq!(registry::snapshot(Some("tools")).len(), 1);
    assert_eq!(registry::snapshot(None).len(), 1);
    assert!(registry::snapshot(Some("other")).is_empty());

    registry::reset(None);
    registry::reset(Some("tools"));
}

#[test]
#[serial]
fn program_uses_named_group() {
    registry::reset(Some("colors"));
    registry::subcommand_in(Some("colors"), constant("sub", "blue")).unwrap();

    let program = Program::new(constant("main", "red")).group("colors");
    assert_eq!(program.run_from(["prog", "sub"]).unwrap(), Value::from("blue"));
    assert_eq!(program.run_from(["prog"]).unwrap(), Value::from("red"));

    registry::reset(Some("colors"));
}

#[test]
#[serial]
fn plugins_load_into_group_once() {
    registry::reset(Some("plugged"));
    let provider = StaticPlugins::new().with("demo.plugins", constant("plug", "plugin"));

    assert_eq!(
        registry::load_plugins(Some("plugged"), &provider, "demo.plugins").unwrap(),
        1
    );
    assert_eq!(
        registry::load_plugins(Some("plugged"), &provider, "demo.plugins").unwrap(),
        0
    );

    let program = Program::new(constant("main", "red"))
        .group("plugged")
        .plugins("demo.plugins", provider);
    assert_eq!(program.run_from(["prog", "plug"]).unwrap(), Value::from("plugin"));
    assert_eq!(registry::snapshot(Some("plugged")).len(), 1);

    registry::reset(Some("plugged"));
}
