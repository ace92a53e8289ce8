//! Errors raised while registering or resolving services.

use crate::core::AbstractKey;
use thiserror::Error;

/// Everything that can go wrong inside a [`Container`](crate::Container).
///
/// Only [`Error::BindingMissing`] is an expected runtime condition. The rest
/// point at a misconfigured container or a bug in a factory body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The concrete does not provide every method the interface requires.
  #[error("`{concrete}` does not implement interface `{interface}` (missing: {missing:?})")]
  InterfaceMismatch {
    interface: String,
    concrete: String,
    missing: Vec<String>,
  },

  /// A struct abstract binds to itself and must not be given a concrete.
  #[error("struct `{shape}` is self-bound and cannot take a concrete")]
  AbstractStructConcreteNotNil { shape: String },

  /// A named abstract was bound without anything to produce.
  #[error("no concrete given for `{key}`")]
  ConcreteMissing { key: AbstractKey },

  /// Callables are invoked directly and never live in the binding table.
  #[error("callable `{name}` cannot be used as a binding key")]
  UnbindableAbstract { name: String },

  /// The alias target has no binding yet.
  #[error("cannot alias `{alias}` to `{target}`: no binding exists for `{target}`")]
  AliasAbstractMissing { target: String, alias: String },

  /// Nothing is registered under the requested key.
  #[error("no binding found for `{key}`")]
  BindingMissing { key: AbstractKey },

  /// [`Container::invoke`](crate::Container::invoke) was handed something that is not callable.
  #[error("`{name}` is not invocable")]
  AbstractNotInvocable { name: String },

  /// Explicit parameters did not match the callable's declared parameters.
  #[error("`{callable}` takes {expected} argument(s) but {given} were supplied")]
  ArityMismatch {
    callable: String,
    expected: usize,
    given: usize,
  },

  /// A callable body read past the arguments it was given.
  #[error("argument {index} requested but only {len} were supplied")]
  ArgumentOutOfRange { index: usize, len: usize },

  /// An instance could not be downcast to the requested type.
  #[error("{subject} is not a `{expected}`")]
  TypeMismatch {
    subject: String,
    expected: &'static str,
  },

  /// A key was requested again while it was still being resolved, on this
  /// thread or by a thread this one is waiting on.
  #[error("circular dependency detected: {}", .chain.join(" -> "))]
  CircularDependency { chain: Vec<String> },

  /// Nested resolution went deeper than `ContainerOptions::max_depth`.
  #[error("resolution of `{key}` exceeded the maximum depth of {max_depth}")]
  ResolutionTooDeep { key: AbstractKey, max_depth: usize },

  /// Raised by factory bodies that cannot build their product.
  #[error("failed to construct `{name}`: {message}")]
  Construction { name: String, message: String },
}

impl Error {
  /// Shorthand for factory bodies reporting their own failure.
  pub fn construction(name: impl Into<String>, message: impl Into<String>) -> Self {
    Error::Construction {
      name: name.into(),
      message: message.into(),
    }
  }

  /// True for the one recoverable case: the requested key is simply unregistered.
  pub fn is_binding_missing(&self) -> bool {
    matches!(self, Error::BindingMissing { .. })
  }
}

/// Errors raised while loading [`ContainerOptions`](crate::ContainerOptions).
#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("invalid container options: {0}")]
  Yaml(#[from] serde_yaml::Error),
}
