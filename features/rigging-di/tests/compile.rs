use std::sync::Arc;

use rigging_di::{
    Apply, As, BagFields, BagValues, CompileError, Container, Embed, GraphError, Key,
    ParameterBag, Provide, ProviderKind, RegistrationError, ResolveError, TypeInfo,
};

trait Handler: Send + Sync {}

struct Mux;
impl Handler for Mux {}

struct Static;
impl Handler for Static {}

struct Server;

fn ctor<T: 'static>() -> Key {
    Key::new(TypeInfo::of::<T>(), None, ProviderKind::Constructor)
}

fn graph_errors(result: Result<Container, CompileError>) -> Vec<GraphError> {
    match result {
        Err(CompileError::Graph(graph)) => graph.errors,
        Err(other) => panic!("expected graph errors, got {other}"),
        Ok(_) => panic!("expected compile to fail"),
    }
}

fn registration_error(result: Result<Container, CompileError>) -> RegistrationError {
    match result {
        Err(CompileError::Registration(error)) => error,
        Err(other) => panic!("expected a registration error, got {other}"),
        Ok(_) => panic!("expected compile to fail"),
    }
}

#[test]
fn duplicate_unnamed_constructor() {
    let result = Container::builder()
        .provide(Provide::new(|| Mux))
        .provide(Provide::new(|| Mux))
        .build();

    let errors = graph_errors(result);
    assert!(matches!(&errors[..], [GraphError::DuplicateProvider(key)] if *key == ctor::<Mux>()));
}

#[test]
fn names_disambiguate_same_type() {
    let container = Container::builder()
        .provide(Provide::new(|| Mux).named("a"))
        .provide(Provide::new(|| Mux).named("b"))
        .provide(Provide::new(|| Mux))
        .build();

    assert!(container.is_ok());
}

#[test]
fn same_constructor_published_twice_under_one_interface() {
    let result = Container::builder()
        .provide(
            Provide::new(|| Mux)
                .as_interface(As::new(|m: Arc<Mux>| m as Arc<dyn Handler>))
                .as_interface(As::new(|m: Arc<Mux>| m as Arc<dyn Handler>)),
        )
        .build();

    let errors = graph_errors(result);
    assert!(matches!(
        &errors[..],
        [GraphError::DuplicateProvider(key)] if key.kind == ProviderKind::Interface
    ));
}

#[test]
fn malformed_constructors() {
    let unit = registration_error(Container::builder().provide(Provide::new(|| ())).build());
    assert!(matches!(unit, RegistrationError::MalformedConstructor { .. }));

    let result = registration_error(
        Container::builder()
            .provide(Provide::new(|| Err::<Server, String>("nope".into())))
            .build(),
    );
    assert!(matches!(result, RegistrationError::MalformedConstructor { .. }));
}

#[test]
fn interface_target_must_be_a_trait_object() {
    let error = registration_error(
        Container::builder()
            .provide(Provide::new(|| Mux).as_interface(As::new(|m: Arc<Mux>| m)))
            .build(),
    );
    assert!(matches!(error, RegistrationError::InvalidInterfaceTarget { .. }));
}

#[test]
fn interface_must_be_implemented_by_the_product() {
    let error = registration_error(
        Container::builder()
            .provide(Provide::new(|| Server).as_interface(As::new(|m: Arc<Mux>| m as Arc<dyn Handler>)))
            .build(),
    );

    match error {
        RegistrationError::InterfaceNotImplemented { provided, interface } => {
            assert!(provided.ends_with("Server"));
            assert!(interface.ends_with("Handler"));
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn unsatisfied_dependency_names_consumer_and_missing() {
    let result = Container::builder()
        .provide(Provide::new(|_: Arc<Mux>| Server))
        .build();

    let errors = graph_errors(result);
    match &errors[..] {
        [GraphError::UnsatisfiedDependency { consumer, missing }] => {
            assert_eq!(*consumer, ctor::<Server>());
            assert_eq!(*missing, TypeInfo::of::<Mux>().to_string());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_optional_dependency_compiles() {
    let container = Container::builder()
        .provide(Provide::new(|mux: Option<Arc<Mux>>| {
            assert!(mux.is_none());
            Server
        }))
        .build()
        .unwrap();

    assert!(container.extract::<Server>().is_ok());
}

#[test]
fn every_graph_issue_is_reported() {
    struct A;
    struct B;

    let result = Container::builder()
        .provide(Provide::new(|_: Arc<B>| A))
        .provide(Provide::new(|_: Arc<A>| B))
        .provide(Provide::new(|_: Arc<Mux>| Server))
        .build();

    let errors = graph_errors(result);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| matches!(e, GraphError::UnsatisfiedDependency { .. })));

    let cycle = errors.iter().find_map(|e| match e {
        GraphError::DependencyCycle { path } => Some(path.clone()),
        _ => None,
    });
    assert_eq!(cycle, Some(vec![ctor::<A>(), ctor::<B>(), ctor::<A>()]));

    let rendered = CompileError::Graph(rigging_di::GraphErrors { errors }).to_string();
    assert!(rendered.starts_with("The dependency graph had one or more errors:\n- "));
}

#[test]
fn self_dependency_is_a_cycle() {
    struct Node;

    let errors = graph_errors(
        Container::builder()
            .provide(Provide::new(|_: Arc<Node>| Node))
            .build(),
    );
    assert!(matches!(
        &errors[..],
        [GraphError::DependencyCycle { path }] if *path == vec![ctor::<Node>(), ctor::<Node>()]
    ));
}

#[test]
fn depending_on_a_shared_interface_is_ambiguous() {
    let result = Container::builder()
        .provide(Provide::new(|| Mux).as_interface(As::new(|m: Arc<Mux>| m as Arc<dyn Handler>)))
        .provide(Provide::new(|| Static).as_interface(As::new(|s: Arc<Static>| s as Arc<dyn Handler>)))
        .provide(Provide::new(|_: Arc<dyn Handler>| Server))
        .build();

    let errors = graph_errors(result);
    match &errors[..] {
        [GraphError::AmbiguousKey { consumer, candidates, .. }] => {
            assert_eq!(*consumer, ctor::<Server>());
            assert_eq!(*candidates, vec![ctor::<Mux>(), ctor::<Static>()]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn modifier_target_must_exist() {
    let errors = graph_errors(
        Container::builder()
            .apply(Apply::new(|_: Arc<Server>| ()))
            .build(),
    );
    assert!(matches!(&errors[..], [GraphError::UnsatisfiedDependency { .. }]));
}

#[test]
fn nested_parameter_bags_are_rejected() {
    struct Inner {
        _mux: Arc<Mux>,
    }
    impl ParameterBag for Inner {
        fn fields(fields: &mut BagFields) {
            fields.field::<Arc<Mux>>("mux");
        }
        fn assemble(values: &BagValues) -> Result<Self, ResolveError> {
            Ok(Inner { _mux: values.get("mux")? })
        }
    }

    struct Outer {
        _inner: Embed<Inner>,
    }
    impl ParameterBag for Outer {
        fn fields(fields: &mut BagFields) {
            fields.field::<Embed<Inner>>("inner");
        }
        fn assemble(values: &BagValues) -> Result<Self, ResolveError> {
            Ok(Outer { _inner: values.get("inner")? })
        }
    }

    let error = registration_error(
        Container::builder()
            .provide(Provide::new(|| Mux))
            .provide(Provide::new(|_: Embed<Outer>| Server))
            .build(),
    );
    assert!(matches!(error, RegistrationError::MalformedParameterBag { field: "inner", .. }));
}
