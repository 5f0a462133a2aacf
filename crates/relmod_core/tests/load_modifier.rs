use relmod_core::{
    load_modifier, LoadContext, LoaderError, LoaderOptions, ModifierEnv, ModifierError,
    ProgressReporter, ResolveError, TransformRuleError, DEFAULT_MODIFIER_NAME,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(vec![]),
        })
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("reporter lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn success(&self, message: &str) {
        self.messages
            .lock()
            .expect("reporter lock")
            .push(message.to_string());
    }
}

fn write_fixture(dir: &TempDir, file_name: &str, document: &Value) {
    std::fs::write(
        dir.path().join(file_name),
        serde_json::to_string_pretty(document).expect("serialize fixture"),
    )
    .expect("write fixture");
}

fn context_with(modifier: Value) -> (LoadContext, Arc<RecordingReporter>) {
    let reporter = RecordingReporter::new();
    let context = LoadContext::new(LoaderOptions::new().with("modifier", modifier))
        .with_reporter(reporter.clone());
    (context, reporter)
}

fn context_in(dir: &TempDir, modifier: Value) -> (LoadContext, Arc<RecordingReporter>) {
    let (context, reporter) = context_with(modifier);
    (context.with_working_directory(dir.path()), reporter)
}

fn append_test_rule() -> Value {
    json!({"rule": "append", "value": "-test"})
}

fn first_invalid(err: LoaderError) -> ModifierError {
    match err {
        LoaderError::Invalid(errors) => errors.first().clone(),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn returns_none_when_modifier_option_is_absent() {
    let reporter = RecordingReporter::new();
    let context =
        LoadContext::new(LoaderOptions::new()).with_reporter(reporter.clone());

    let outcome = load_modifier(&context).expect("absent option is not an error");
    assert!(outcome.is_none());
    assert!(reporter.messages().is_empty());
}

#[test]
fn returns_none_for_false_like_modifier_options() {
    for value in [json!(""), json!(false), json!(0), json!(null)] {
        let (context, reporter) = context_with(value.clone());
        let outcome = load_modifier(&context).expect("false-like option is not an error");
        assert!(outcome.is_none(), "{value} should disable the feature");
        assert!(reporter.messages().is_empty());
    }
}

#[test]
fn rejects_non_string_modifier_options() {
    for (value, expected) in [
        (json!(42), "number"),
        (json!(true), "boolean"),
        (json!(["x"]), "array"),
        (json!({"path": "x"}), "object"),
    ] {
        let (context, reporter) = context_with(value);
        let err = load_modifier(&context).expect_err("non-string option must fail");
        let error = first_invalid(err);
        assert_eq!(error.code(), "EMODIFIERPATH");
        assert_eq!(error, ModifierError::InvalidPathType { actual: expected });
        assert!(reporter.messages().is_empty());
    }
}

#[test]
fn loads_plain_table_modifier() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "normal.json",
        &json!({"name": "x", "version": append_test_rule()}),
    );
    let (context, reporter) = context_in(&dir, json!("./normal.json"));

    let descriptor = load_modifier(&context)
        .expect("normal modifier should load")
        .expect("descriptor should be present");

    assert_eq!(descriptor.name, "x");
    assert!(descriptor.last_release.is_none());
    assert_eq!(
        descriptor.version.apply(&ModifierEnv::default(), "version"),
        "version-test"
    );
    assert_eq!(
        reporter.messages(),
        vec!["Loaded modifier \"x\" from \"./normal.json\"".to_string()]
    );
}

#[test]
fn unwraps_default_wrapped_modifier() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "esnext.json",
        &json!({
            "__esModule": true,
            "default": {"name": "esnext", "version": append_test_rule()},
        }),
    );
    let (context, _reporter) = context_in(&dir, json!("./esnext.json"));

    let descriptor = load_modifier(&context)
        .expect("wrapped modifier should load")
        .expect("descriptor should be present");

    assert_eq!(descriptor.name, "esnext");
    assert!(!descriptor.extra.contains_key("__esModule"));
    assert_eq!(
        descriptor.version.apply(&ModifierEnv::default(), "version"),
        "version-test"
    );
}

#[test]
fn keeps_wrapper_when_default_is_false_like() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "wrapper.json",
        &json!({"default": false, "name": "wrapper", "version": append_test_rule()}),
    );
    let (context, _reporter) = context_in(&dir, json!("./wrapper.json"));

    let descriptor = load_modifier(&context)
        .expect("wrapper should load as its own table")
        .expect("descriptor should be present");
    assert_eq!(descriptor.name, "wrapper");
}

#[test]
fn synthesizes_descriptor_for_bare_transform_module() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir, "functional.json", &append_test_rule());
    let (context, _reporter) = context_in(&dir, json!("./functional.json"));

    let descriptor = load_modifier(&context)
        .expect("bare transform should load")
        .expect("descriptor should be present");

    assert_eq!(descriptor.name, DEFAULT_MODIFIER_NAME);
    assert!(descriptor.last_release.is_none());
    assert!(descriptor.extra.is_empty());
    assert_eq!(
        descriptor.version.apply(&ModifierEnv::default(), "version"),
        "version-test"
    );
}

#[test]
fn rejects_scalar_module_values() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir, "string.json", &json!("1.0.0"));
    write_fixture(&dir, "number.json", &json!(7));
    write_fixture(&dir, "array.json", &json!([1, 2, 3]));

    for (file, expected) in [
        ("./string.json", "string"),
        ("./number.json", "integer"),
        ("./array.json", "array"),
    ] {
        let (context, reporter) = context_in(&dir, json!(file));
        let err = load_modifier(&context).expect_err("invalid shape must fail");
        let error = first_invalid(err);
        assert_eq!(error.code(), "EMODIFIERTYPE");
        assert_eq!(error, ModifierError::InvalidShape { actual: expected });
        assert!(reporter.messages().is_empty());
    }
}

#[test]
fn rejects_module_without_name() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir, "noname.json", &json!({"version": append_test_rule()}));
    let (context, _reporter) = context_in(&dir, json!("./noname.json"));

    let error = first_invalid(load_modifier(&context).expect_err("missing name must fail"));
    assert_eq!(error.code(), "EMODIFIERNONAME");
    assert_eq!(error, ModifierError::MissingName { actual: "missing" });
}

#[test]
fn rejects_empty_and_non_text_names() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "empty-name.json",
        &json!({"name": "", "version": append_test_rule()}),
    );
    write_fixture(
        &dir,
        "invalid-name.json",
        &json!({"name": 7, "version": append_test_rule()}),
    );

    let (context, _reporter) = context_in(&dir, json!("./empty-name.json"));
    let error = first_invalid(load_modifier(&context).expect_err("empty name must fail"));
    assert_eq!(error, ModifierError::MissingName { actual: "string" });

    let (context, _reporter) = context_in(&dir, json!("./invalid-name.json"));
    let error = first_invalid(load_modifier(&context).expect_err("non-text name must fail"));
    assert_eq!(error, ModifierError::MissingName { actual: "integer" });
}

#[test]
fn rejects_non_transform_version_field() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "plain-version.json",
        &json!({"name": "x", "version": "1.2.3"}),
    );
    let (context, _reporter) = context_in(&dir, json!("./plain-version.json"));

    let error = first_invalid(load_modifier(&context).expect_err("plain version must fail"));
    assert_eq!(error.code(), "EMODIFIERNOREQUIRED");
    assert_eq!(
        error,
        ModifierError::MissingRequiredField {
            field: "version",
            actual: "string"
        }
    );
}

#[test]
fn resolves_builtin_identity_without_working_directory() {
    let (context, reporter) = context_with(json!("identity"));

    let descriptor = load_modifier(&context)
        .expect("builtin should resolve without a working directory")
        .expect("descriptor should be present");

    assert_eq!(descriptor.name, "identity");
    assert_eq!(
        descriptor.version.apply(&ModifierEnv::default(), "1.2.3"),
        "1.2.3"
    );
    assert_eq!(
        reporter.messages(),
        vec!["Loaded modifier \"identity\" from \"identity\"".to_string()]
    );
}

#[test]
fn builtin_tier_wins_over_filesystem() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "identity.json",
        &json!({"name": "impostor", "version": append_test_rule()}),
    );
    let (context, _reporter) = context_in(&dir, json!("identity"));

    let descriptor = load_modifier(&context)
        .expect("builtin tier should resolve first")
        .expect("descriptor should be present");
    assert_eq!(descriptor.name, "identity");
}

#[test]
fn fails_with_not_found_for_missing_module() {
    let dir = TempDir::new().expect("tempdir");
    let (context, reporter) = context_in(&dir, json!("./missing.json"));

    let err = load_modifier(&context).expect_err("missing module must fail");
    match err {
        LoaderError::Resolve(ResolveError::NotFound { spec }) => {
            assert_eq!(spec, "./missing.json");
        }
        other => panic!("expected not-found resolution error, got {other:?}"),
    }
    assert!(reporter.messages().is_empty());
}

#[test]
fn fails_without_resolution_base_for_relative_path() {
    let (context, _reporter) = context_with(json!("./local.json"));

    let err = load_modifier(&context).expect_err("relative path without base must fail");
    assert!(matches!(
        err,
        LoaderError::Resolve(ResolveError::NoResolutionBase { .. })
    ));
}

#[test]
fn probes_json_extension_for_bare_specs() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "normal.json",
        &json!({"name": "x", "version": append_test_rule()}),
    );
    let (context, _reporter) = context_in(&dir, json!("./normal"));

    let descriptor = load_modifier(&context)
        .expect("extension probing should find the module")
        .expect("descriptor should be present");
    assert_eq!(descriptor.name, "x");
}

#[test]
fn surfaces_rule_compile_failure_as_resolution_error() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "sideways.json",
        &json!({"name": "x", "version": {"rule": "sideways"}}),
    );
    let (context, reporter) = context_in(&dir, json!("./sideways.json"));

    let err = load_modifier(&context).expect_err("uncompilable rule must fail");
    match err {
        LoaderError::Resolve(ResolveError::Rule { source, .. }) => {
            assert!(matches!(source, TransformRuleError::UnknownRule(_)));
        }
        other => panic!("expected rule resolution error, got {other:?}"),
    }
    assert!(reporter.messages().is_empty());
}

#[test]
fn passes_through_extra_fields() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "rich.json",
        &json!({
            "name": "rich",
            "version": append_test_rule(),
            "channel": "next",
            "last_release": "1.0.0",
        }),
    );
    let (context, _reporter) = context_in(&dir, json!("./rich.json"));

    let descriptor = load_modifier(&context)
        .expect("rich modifier should load")
        .expect("descriptor should be present");

    assert_eq!(descriptor.last_release.as_deref(), Some("1.0.0"));
    assert_eq!(
        descriptor.extra.get("channel"),
        Some(&relmod_core::RawValue::Text("next".to_string()))
    );
}

#[test]
fn repeated_loads_produce_equal_descriptors() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "normal.json",
        &json!({"name": "x", "version": append_test_rule()}),
    );
    let (context, reporter) = context_in(&dir, json!("./normal.json"));

    let first = load_modifier(&context)
        .expect("first load should succeed")
        .expect("descriptor should be present");
    let second = load_modifier(&context)
        .expect("second load should succeed")
        .expect("descriptor should be present");

    assert_eq!(first.name, second.name);
    assert_eq!(first.last_release, second.last_release);
    assert_eq!(first.extra, second.extra);
    let env = ModifierEnv::default();
    assert_eq!(
        first.version.apply(&env, "2.0.0"),
        second.version.apply(&env, "2.0.0")
    );

    // Caller-supplied context is never mutated.
    assert_eq!(context.options.modifier(), Some(&json!("./normal.json")));
    assert_eq!(reporter.messages().len(), 2);
}

#[test]
fn env_values_flow_into_compiled_transforms() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(
        &dir,
        "channel.json",
        &json!({"name": "channel", "version": {"rule": "append", "value": "-{channel}"}}),
    );
    let (context, _reporter) = context_in(&dir, json!("./channel.json"));

    let descriptor = load_modifier(&context)
        .expect("channel modifier should load")
        .expect("descriptor should be present");

    let mut env = ModifierEnv::new();
    env.set("channel", "beta");
    assert_eq!(descriptor.version.apply(&env, "1.0.0"), "1.0.0-beta");
}
