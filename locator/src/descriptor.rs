//! Abstract descriptors and concrete producers.
//!
//! Descriptors are built explicitly by the caller: the container never
//! inspects Rust types at runtime, it only reads the names, method sets and
//! parameter lists recorded here.

use crate::core::{AbstractKey, KeyKind};
use crate::error::Error;
use std::any::{type_name, Any};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A value produced or stored by the container.
pub type Instance = Arc<dyn Any + Send + Sync>;

type Body = Arc<dyn Fn(&Args) -> Result<Instance, Error> + Send + Sync>;

/// Wraps a value into an [`Instance`].
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
  Arc::new(value)
}

fn method_set<I, S>(methods: I) -> BTreeSet<String>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  methods.into_iter().map(Into::into).collect()
}

/// Positional arguments handed to a callable body.
pub struct Args {
  values: Vec<Instance>,
}

impl Args {
  pub(crate) fn new(values: Vec<Instance>) -> Self {
    Self { values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Returns the untyped argument at `index`.
  pub fn raw(&self, index: usize) -> Result<&Instance, Error> {
    self.values.get(index).ok_or(Error::ArgumentOutOfRange {
      index,
      len: self.values.len(),
    })
  }

  /// Returns the argument at `index` downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, Error> {
    self
      .raw(index)?
      .clone()
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        subject: format!("argument {}", index),
        expected: type_name::<T>(),
      })
  }
}

/// An interface abstraction: a nominal name and the methods a concrete must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
  name: String,
  methods: BTreeSet<String>,
}

impl Interface {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      methods: BTreeSet::new(),
    }
  }

  pub fn with_methods<I, S>(mut self, methods: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.methods.extend(method_set(methods));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn methods(&self) -> impl Iterator<Item = &str> {
    self.methods.iter().map(String::as_str)
  }

  /// Methods required by the interface but absent from `provided`.
  pub(crate) fn missing_from(&self, provided: &BTreeSet<String>) -> Vec<String> {
    self.methods.difference(provided).cloned().collect()
  }
}

/// A callable producer with declared parameter descriptors.
///
/// When resolved without explicit arguments, each parameter is itself
/// resolved through the container and passed positionally to the body.
#[derive(Clone)]
pub struct Callable {
  name: String,
  params: Vec<Abstract>,
  provides: BTreeSet<String>,
  body: Body,
}

impl Callable {
  pub fn new<T, F>(name: impl Into<String>, params: impl IntoIterator<Item = Abstract>, body: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Args) -> Result<T, Error> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      params: params.into_iter().collect(),
      provides: BTreeSet::new(),
      body: Arc::new(move |args: &Args| body(args).map(instance)),
    }
  }

  /// Declares the methods implemented by whatever this callable produces.
  pub fn provides<I, S>(mut self, methods: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.provides.extend(method_set(methods));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn params(&self) -> &[Abstract] {
    &self.params
  }

  pub fn arity(&self) -> usize {
    self.params.len()
  }

  pub(crate) fn call(&self, args: &Args) -> Result<Instance, Error> {
    (self.body)(args)
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("name", &self.name)
      .field("params", &self.params)
      .field("provides", &self.provides)
      .finish_non_exhaustive()
  }
}

/// A struct abstraction. Bound without a concrete, it builds itself from its
/// field dependencies.
#[derive(Clone, Debug)]
pub struct StructShape {
  constructor: Callable,
}

impl StructShape {
  pub fn new<T, F>(name: impl Into<String>, fields: impl IntoIterator<Item = Abstract>, build: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Args) -> Result<T, Error> + Send + Sync + 'static,
  {
    Self {
      constructor: Callable::new(name, fields, build),
    }
  }

  /// A struct with no field dependencies, built from its `Default`.
  pub fn unit<T: Any + Send + Sync + Default>(name: impl Into<String>) -> Self {
    Self::new(name, Vec::new(), |_| Ok(T::default()))
  }

  pub fn provides<I, S>(mut self, methods: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.constructor = self.constructor.provides(methods);
    self
  }

  pub fn name(&self) -> &str {
    self.constructor.name()
  }

  pub fn fields(&self) -> &[Abstract] {
    self.constructor.params()
  }

  pub(crate) fn constructor(&self) -> &Callable {
    &self.constructor
  }
}

/// The identifier side of a binding.
#[derive(Clone, Debug)]
pub enum Abstract {
  Name(String),
  Interface(Interface),
  Struct(StructShape),
  Callable(Callable),
}

impl Abstract {
  /// Canonical key, or `None` for callables, which are never looked up.
  pub fn key(&self) -> Option<AbstractKey> {
    match self {
      Abstract::Name(name) => Some(AbstractKey::new(KeyKind::Name, name.as_str())),
      Abstract::Interface(interface) => Some(AbstractKey::new(KeyKind::Interface, interface.name())),
      Abstract::Struct(shape) => Some(AbstractKey::new(KeyKind::Struct, shape.name())),
      Abstract::Callable(_) => None,
    }
  }

  pub fn is_callable(&self) -> bool {
    matches!(self, Abstract::Callable(_))
  }

  /// Human readable form used in errors and logs.
  pub fn describe(&self) -> String {
    match self {
      Abstract::Callable(callable) => format!("fn {}", callable.name()),
      other => other
        .key()
        .map(|key| key.to_string())
        .unwrap_or_default(),
    }
  }
}

impl From<&str> for Abstract {
  fn from(name: &str) -> Self {
    Abstract::Name(name.to_owned())
  }
}

impl From<String> for Abstract {
  fn from(name: String) -> Self {
    Abstract::Name(name)
  }
}

impl From<Interface> for Abstract {
  fn from(interface: Interface) -> Self {
    Abstract::Interface(interface)
  }
}

impl From<StructShape> for Abstract {
  fn from(shape: StructShape) -> Self {
    Abstract::Struct(shape)
  }
}

impl From<Callable> for Abstract {
  fn from(callable: Callable) -> Self {
    Abstract::Callable(callable)
  }
}

/// A stored instance together with the methods it implements.
#[derive(Clone)]
pub struct Value {
  instance: Instance,
  type_name: &'static str,
  provides: BTreeSet<String>,
}

impl Value {
  pub(crate) fn instance(&self) -> &Instance {
    &self.instance
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Value")
      .field("type_name", &self.type_name)
      .field("provides", &self.provides)
      .finish_non_exhaustive()
  }
}

/// The producer side of a binding.
#[derive(Clone, Debug)]
pub enum Concrete {
  Value(Value),
  Factory(Callable),
  Struct(StructShape),
}

impl Concrete {
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Concrete::Value(Value {
      instance: instance(value),
      type_name: type_name::<T>(),
      provides: BTreeSet::new(),
    })
  }

  pub fn factory(callable: Callable) -> Self {
    Concrete::Factory(callable)
  }

  /// Declares methods implemented by this concrete, on top of any the
  /// wrapped callable or struct already declares.
  pub fn provides<I, S>(self, methods: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    match self {
      Concrete::Value(mut value) => {
        value.provides.extend(method_set(methods));
        Concrete::Value(value)
      }
      Concrete::Factory(callable) => Concrete::Factory(callable.provides(methods)),
      Concrete::Struct(shape) => Concrete::Struct(shape.provides(methods)),
    }
  }

  pub(crate) fn provided_methods(&self) -> &BTreeSet<String> {
    match self {
      Concrete::Value(value) => &value.provides,
      Concrete::Factory(callable) => &callable.provides,
      Concrete::Struct(shape) => &shape.constructor.provides,
    }
  }

  pub(crate) fn describe(&self) -> String {
    match self {
      Concrete::Value(value) => value.type_name.to_owned(),
      Concrete::Factory(callable) => format!("fn {}", callable.name()),
      Concrete::Struct(shape) => format!("struct {}", shape.name()),
    }
  }
}

impl From<Callable> for Concrete {
  fn from(callable: Callable) -> Self {
    Concrete::Factory(callable)
  }
}

impl From<StructShape> for Concrete {
  fn from(shape: StructShape) -> Self {
    Concrete::Struct(shape)
  }
}
