use fibre_locator::{Abstract, Callable, Concrete, Container, Error, Interface, StructShape};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Test Fixtures ---

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: u32,
}

struct EnglishGreeter;

fn greeter() -> Interface {
  Interface::new("Greeter").with_methods(["greet"])
}

// --- Basic Tests ---

#[test]
fn test_constant_binding_resolves_same_value_without_caching() {
  // Arrange
  let container = Container::new();
  container
    .bind("simple", Concrete::value(SimpleService { id: 101 }))
    .unwrap();

  // Act
  let r1 = container.make_as::<SimpleService>("simple").unwrap();
  let r2 = container.make_as::<SimpleService>("simple").unwrap();

  // Assert
  assert_eq!(*r1, SimpleService { id: 101 });
  assert_eq!(r1, r2);
  assert!(!container.is_cached("simple"));
}

#[test]
fn test_shared_factory_runs_once() {
  // Arrange
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let container = Container::new();
  container
    .bind_shared(
      "tracker",
      Concrete::factory(Callable::new("new_tracker", [], move |_| {
        Ok(SimpleService {
          id: counter.fetch_add(1, Ordering::SeqCst) as u32,
        })
      })),
    )
    .unwrap();

  // Act
  let r1 = container.make("tracker").unwrap();
  let r2 = container.make("tracker").unwrap();
  let r3 = container
    .make_with("tracker", vec![fibre_locator::instance(7u32)])
    .unwrap();

  // Assert
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert!(Arc::ptr_eq(&r1, &r2));
  assert!(Arc::ptr_eq(&r1, &r3));
  assert!(container.is_cached("tracker"));
}

#[test]
fn test_non_shared_factory_runs_every_time() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let container = Container::new();
  container
    .bind(
      "transient",
      Concrete::factory(Callable::new("new_transient", [], move |_| {
        Ok(counter.fetch_add(1, Ordering::SeqCst))
      })),
    )
    .unwrap();

  let first = container.make_as::<usize>("transient").unwrap();
  let second = container.make_as::<usize>("transient").unwrap();

  assert_eq!((*first, *second), (0, 1));
  assert_eq!(calls.load(Ordering::SeqCst), 2);
  assert!(!container.is_cached("transient"));
}

#[test]
fn test_singleton_is_bind_shared() {
  let container = Container::new();
  container
    .singleton(
      "config",
      Concrete::factory(Callable::new("load_config", [], |_| Ok(String::from("cfg")))),
    )
    .unwrap();

  let a = container.make("config").unwrap();
  let b = container.make("config").unwrap();

  assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_interface_binding_requires_all_methods() {
  let container = Container::new();

  let err = container
    .bind(greeter(), Concrete::value(EnglishGreeter))
    .unwrap_err();
  assert_eq!(
    err,
    Error::InterfaceMismatch {
      interface: "Greeter".to_string(),
      concrete: std::any::type_name::<EnglishGreeter>().to_string(),
      missing: vec!["greet".to_string()],
    }
  );
  assert!(!container.has(greeter()));

  container
    .bind(greeter(), Concrete::value(EnglishGreeter).provides(["greet", "wave"]))
    .unwrap();
  assert!(container.has(greeter()));
}

#[test]
fn test_interface_binding_without_concrete_fails() {
  let container = Container::new();
  let err = container.bind(greeter(), None).unwrap_err();
  assert!(matches!(err, Error::InterfaceMismatch { .. }));
}

#[test]
fn test_interface_accepts_factory_declaring_methods() {
  let container = Container::new();
  let factory = Callable::new("new_greeter", [], |_| Ok(EnglishGreeter)).provides(["greet"]);

  container.bind(greeter(), Concrete::factory(factory)).unwrap();

  assert!(container.make_as::<EnglishGreeter>(greeter()).is_ok());
}

#[test]
fn test_struct_abstract_rejects_concrete() {
  let container = Container::new();
  let shape = StructShape::unit::<u8>("Counter");

  let err = container
    .bind(shape, Concrete::value(1u8))
    .unwrap_err();

  assert_eq!(
    err,
    Error::AbstractStructConcreteNotNil {
      shape: "Counter".to_string()
    }
  );
}

#[test]
fn test_struct_abstract_binds_to_itself() {
  #[derive(Default)]
  struct Clock {
    ticks: u64,
  }

  let container = Container::new();
  let shape = StructShape::unit::<Clock>("Clock");
  container.bind(shape.clone(), None).unwrap();

  let clock = container.make_as::<Clock>(shape).unwrap();
  assert_eq!(clock.ticks, 0);
}

#[test]
fn test_named_binding_without_concrete_fails() {
  let container = Container::new();
  let err = container.bind("nothing", None).unwrap_err();
  assert!(matches!(err, Error::ConcreteMissing { .. }));
  assert!(!container.has("nothing"));
}

#[test]
fn test_callable_cannot_be_bound() {
  let container = Container::new();
  let callable = Callable::new("make_thing", [], |_| Ok(1u8));

  let err = container
    .bind(callable, Concrete::value(2u8))
    .unwrap_err();

  assert_eq!(
    err,
    Error::UnbindableAbstract {
      name: "fn make_thing".to_string()
    }
  );
}

#[test]
fn test_alias_requires_existing_binding() {
  let container = Container::new();

  let err = container.alias("X", "Y").unwrap_err();
  assert_eq!(
    err,
    Error::AliasAbstractMissing {
      target: "X".to_string(),
      alias: "Y".to_string(),
    }
  );

  container.bind("X", Concrete::value(String::from("value"))).unwrap();
  container.alias("X", "Y").unwrap();

  let via_alias = container.make_as::<String>("Y").unwrap();
  let direct = container.make_as::<String>("X").unwrap();
  assert_eq!(via_alias, direct);
  assert_eq!(*via_alias, "value");
}

#[test]
fn test_has_does_not_construct() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let container = Container::new();

  assert!(!container.has("lazy"));
  assert!(!container.has("lazy_alias"));

  container
    .bind_shared(
      "lazy",
      Concrete::factory(Callable::new("new_lazy", [], move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
      })),
    )
    .unwrap();
  container.alias("lazy", "lazy_alias").unwrap();

  assert!(container.has("lazy"));
  assert!(container.has("lazy_alias"));
  assert_eq!(calls.load(Ordering::SeqCst), 0);
  assert!(!container.is_cached("lazy"));
}

#[test]
fn test_has_is_false_for_callables() {
  let container = Container::new();
  assert!(!container.has(Callable::new("f", [], |_| Ok(()))));
}

#[test]
fn test_make_missing_binding_is_recoverable() {
  let container = Container::new();

  let err = container.make("unregistered").unwrap_err();

  assert!(err.is_binding_missing());
  assert_eq!(err.to_string(), "no binding found for `unregistered`");
}

#[test]
#[should_panic(expected = "Failed to resolve required service: no binding found for `unregistered`")]
fn test_get_panics_on_missing_binding() {
  let container = Container::new();
  container.get("unregistered");
}

#[test]
fn test_make_as_reports_type_mismatch() {
  let container = Container::new();
  container.bind("port", Concrete::value(8080u16)).unwrap();

  let err = container.make_as::<String>("port").unwrap_err();

  assert_eq!(
    err,
    Error::TypeMismatch {
      subject: "port".to_string(),
      expected: std::any::type_name::<String>(),
    }
  );
}

#[test]
fn test_keys_are_separated_by_kind() {
  let container = Container::new();
  container
    .bind(Interface::new("Store"), Concrete::value(1u8))
    .unwrap();

  assert!(container.has(Interface::new("Store")));
  assert!(!container.has("Store"));
  assert!(!container.has(Abstract::from(String::from("Store"))));
}

#[test]
fn test_body_reading_past_its_arguments_fails() {
  let container = Container::new();
  container.bind("left", Concrete::value(1u8)).unwrap();
  container
    .bind(
      "sum",
      Concrete::factory(Callable::new("sum", [Abstract::from("left")], |args| {
        Ok(*args.get::<u8>(0)? + *args.get::<u8>(1)?)
      })),
    )
    .unwrap();

  let err = container.make("sum").unwrap_err();

  assert_eq!(err, Error::ArgumentOutOfRange { index: 1, len: 1 });
}
