//! Context behaviour against the tagging instantiator

use bean_core::prelude::*;
use bean_core::{DuplicatePolicy, Fields};
use bean_test_utils::{
    sample_definitions, setup_context_with, setup_test_context, tagged, TaggingInstantiator,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn registered_names_resolve() {
    let (ctx, _) = setup_test_context();
    for name in ["s", "p"] {
        assert!(ctx.has(name));
        assert_eq!(ctx.definition(name).unwrap().name(), name);
    }
    assert_eq!(ctx.len(), 2);
}

#[test]
fn unregistered_name_is_not_found() {
    let (ctx, instantiator) = setup_test_context();

    let err = ctx.definition("ghost").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.missing_name(), Some("ghost"));
    assert!(!ctx.has("ghost"));

    let err = ctx.get_default("ghost").unwrap_err();
    assert!(matches!(err, BeanError::NotFound(ref name) if name == "ghost"));
    assert_eq!(instantiator.calls(), 0);
}

#[test]
fn has_has_no_side_effects() {
    let (ctx, instantiator) = setup_test_context();
    assert!(ctx.has("s"));
    assert!(ctx.has("p"));
    assert!(!ctx.is_instantiated("s"));
    assert_eq!(instantiator.calls(), 0);
}

#[test]
fn singleton_overrides_apply_on_first_build_only() {
    let (ctx, instantiator) = setup_test_context();

    let first = ctx
        .get("s", &Overrides::new().field("y", 9).arg(1, 99))
        .unwrap();
    let second = ctx
        .get("s", &Overrides::new().field("y", 1000).arg(0, 1000))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(instantiator.calls(), 1);

    let built = tagged(&second);
    assert_eq!(built.args, vec![Value::from(10), Value::from(99)]);
    assert_eq!(built.fields["y"], Value::from(9));
    assert_eq!(built.init_method.as_deref(), Some("init"));
}

#[test]
fn prototype_returns_distinct_instances() {
    let (ctx, instantiator) = setup_test_context();

    let a = ctx.get_default("p").unwrap();
    let b = ctx.get_default("p").unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(tagged(&a).serial, tagged(&b).serial);
    assert_eq!(instantiator.calls(), 2);
    assert!(!ctx.is_instantiated("p"));
}

#[test]
fn prototype_merges_args_and_fields() {
    let (ctx, _) = setup_test_context();
    let overrides = Overrides::new()
        .field("y", 9)
        .arg(0, Value::Null)
        .arg(1, 99)
        .arg(2, 30);

    let bean = ctx.get("p", &overrides).unwrap();
    let built = tagged(&bean);

    assert_eq!(built.args, vec![Value::from(10), Value::from(99), Value::from(30)]);
    let mut expected = Fields::new();
    expected.insert("x".to_string(), Value::from(1));
    expected.insert("y".to_string(), Value::from(9));
    assert_eq!(built.fields, expected);
}

#[test]
fn overrides_never_reach_the_canonical_definition() {
    let (ctx, _) = setup_test_context();
    let before = ctx.definition("p").unwrap().clone();

    ctx.get("p", &Overrides::new().field("x", Value::Null).arg(0, 1))
        .unwrap();
    ctx.get("p", &Overrides::new().field("z", 5).arg(5, 5)).unwrap();

    assert_eq!(ctx.definition("p").unwrap(), &before);
    let plain = ctx.get_default("p").unwrap();
    assert_eq!(tagged(&plain).args, vec![Value::from(10), Value::from(20)]);
}

#[test]
fn get_default_matches_get_with_empty_overrides() {
    let (ctx, _) = setup_test_context();

    let via_default = ctx.get_default("p").unwrap();
    let via_get = ctx.get("p", &Overrides::new()).unwrap();
    let (a, b) = (tagged(&via_default), tagged(&via_get));
    assert_eq!((&a.args, &a.fields), (&b.args, &b.fields));

    let s_default = ctx.get_default("s").unwrap();
    let s_get = ctx.get("s", &Overrides::new()).unwrap();
    assert!(Arc::ptr_eq(&s_default, &s_get));
}

#[test]
fn failed_singleton_is_not_cached() {
    let (ctx, instantiator) = setup_context_with(TaggingInstantiator::failing_first(1));

    let err = ctx.get_default("s").unwrap_err();
    assert!(matches!(err, BeanError::Instantiate(InstantiateError::Failed(_))));
    assert!(!ctx.is_instantiated("s"));

    let bean = ctx.get_default("s").unwrap();
    assert_eq!(tagged(&bean).serial, 1);
    assert!(ctx.is_instantiated("s"));
    assert_eq!(instantiator.calls(), 2);
}

#[test]
fn collaborator_error_passes_through_unchanged() {
    let ctx = ApplicationContext::new(
        vec![BeanDefinition::new("db", "Database")],
        Arc::new(FactoryInstantiator::new()),
    );
    let err = ctx.get_default("db").unwrap_err();
    assert_eq!(err.to_string(), "no factory registered for type: Database");
    assert!(matches!(
        err,
        BeanError::Instantiate(InstantiateError::UnknownType(_))
    ));
}

#[test]
fn duplicate_names_last_wins_by_default() {
    let mut defs = sample_definitions();
    defs.push(BeanDefinition::new("s", "Replacement").prototype());
    let ctx = ApplicationContext::new(defs, Arc::new(TaggingInstantiator::new()));

    let def = ctx.definition("s").unwrap();
    assert_eq!(def.type_handle().as_str(), "Replacement");
    assert_eq!(def.scope(), Scope::Prototype);
}

#[test]
fn duplicate_names_rejected_on_request() {
    let mut defs = sample_definitions();
    defs.push(BeanDefinition::new("p", "Again"));

    let err = ApplicationContext::builder(Arc::new(TaggingInstantiator::new()))
        .with_definitions(defs)
        .with_duplicate_policy(DuplicatePolicy::Reject)
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "duplicate bean definition: p");
}

#[test]
fn typed_retrieval() {
    let (ctx, _) = setup_test_context();
    let built = ctx
        .get_default_as::<bean_test_utils::Tagged>("s")
        .unwrap();
    assert_eq!(built.bean, "s");

    let err = ctx.get_default_as::<String>("p").unwrap_err();
    assert!(matches!(err, BeanError::TypeMismatch { .. }));
}

#[test]
fn factory_instantiator_end_to_end() {
    #[derive(Debug)]
    struct Counter {
        start: i64,
        step: i64,
        ready: bool,
    }

    let instantiator = FactoryInstantiator::new().with_type(
        "Counter",
        TypeFactory::builder(|args: &Args<'_>| {
            Ok(Counter {
                start: args.int(0)?,
                step: 1,
                ready: false,
            })
        })
        .init_method("ready", |c: &mut Counter| {
            c.ready = true;
            Ok(())
        })
        .field("step", |c: &mut Counter, v: &Value| {
            c.step = v
                .as_i64()
                .ok_or_else(|| InstantiateError::failed("step must be an int"))?;
            Ok(())
        })
        .build(),
    );

    let ctx = ApplicationContext::new(
        vec![BeanDefinition::new("counter", "Counter")
            .prototype()
            .with_init_method("ready")
            .with_arg(5)
            .with_field("step", 2)],
        Arc::new(instantiator),
    );

    let plain = ctx.get_default_as::<Counter>("counter").unwrap();
    assert_eq!((plain.start, plain.step, plain.ready), (5, 2, true));

    let tuned = ctx
        .get_as::<Counter>("counter", &Overrides::new().arg(0, 100).field("step", 10))
        .unwrap();
    assert_eq!((tuned.start, tuned.step), (100, 10));
}

#[test]
fn object_values_flow_into_constructors() {
    struct Pool(&'static str);
    struct Repo(Arc<Pool>);

    let instantiator = FactoryInstantiator::new().with_type(
        "Repo",
        TypeFactory::builder(|args: &Args<'_>| Ok(Repo(args.object::<Pool>(0)?))).build(),
    );
    let pool = Value::object(Pool("primary"));
    let ctx = ApplicationContext::new(
        vec![BeanDefinition::new("repo", "Repo").with_arg(pool.clone())],
        Arc::new(instantiator),
    );

    let repo = ctx.get_default_as::<Repo>("repo").unwrap();
    assert_eq!(repo.0 .0, "primary");
    assert!(Arc::ptr_eq(&repo.0, &pool.downcast::<Pool>().unwrap()));
}
