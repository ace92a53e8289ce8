//! The main `Container` struct and its associated methods.

use crate::core::{AbstractKey, Binding, InitTracker, ResolutionGuard};
use crate::descriptor::{Abstract, Args, Callable, Concrete, Instance};
use crate::error::Error;
use crate::options::ContainerOptions;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::{type_name, Any};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(0);

/// The service locator.
///
/// Holds three tables keyed by [`AbstractKey`]: bindings, shared instances and
/// aliases. All methods take `&self`; the tables are concurrent maps, and no
/// table lock is held while a factory runs. Cycles among shared bindings are
/// reported even when their initialisation is split across threads.
pub struct Container {
  id: u64,
  options: ContainerOptions,
  bindings: DashMap<AbstractKey, Binding>,
  shared: DashMap<AbstractKey, Arc<OnceCell<Instance>>>,
  aliases: DashMap<AbstractKey, AbstractKey>,
  inits: InitTracker,
}

impl Default for Container {
  fn default() -> Self {
    Self::with_options(ContainerOptions::default())
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_options(options: ContainerOptions) -> Self {
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      options,
      bindings: DashMap::new(),
      shared: DashMap::new(),
      aliases: DashMap::new(),
      inits: InitTracker::default(),
    }
  }

  pub fn options(&self) -> &ContainerOptions {
    &self.options
  }

  // --- PRIVATE HELPERS ---

  fn provide(&self, abstract_: Abstract, concrete: Option<Concrete>, shared: bool) -> Result<(), Error> {
    let key = abstract_.key().ok_or_else(|| Error::UnbindableAbstract {
      name: abstract_.describe(),
    })?;

    let concrete = match (abstract_, concrete) {
      (Abstract::Interface(interface), Some(concrete)) => {
        let missing = interface.missing_from(concrete.provided_methods());
        if !missing.is_empty() {
          return Err(Error::InterfaceMismatch {
            interface: interface.name().to_owned(),
            concrete: concrete.describe(),
            missing,
          });
        }
        concrete
      }
      (Abstract::Interface(interface), None) => {
        return Err(Error::InterfaceMismatch {
          interface: interface.name().to_owned(),
          concrete: "nothing".to_owned(),
          missing: interface.methods().map(str::to_owned).collect(),
        })
      }
      (Abstract::Struct(shape), None) => Concrete::Struct(shape),
      (Abstract::Struct(shape), Some(_)) => {
        return Err(Error::AbstractStructConcreteNotNil {
          shape: shape.name().to_owned(),
        })
      }
      (_, Some(concrete)) => concrete,
      (_, None) => return Err(Error::ConcreteMissing { key }),
    };

    tracing::debug!(key = %key, concrete = %concrete.describe(), shared, "binding registered");
    self.bindings.insert(key, Binding { concrete, shared });
    Ok(())
  }

  /// Follows at most one alias hop.
  fn canonical(&self, key: AbstractKey) -> AbstractKey {
    match self.aliases.get(&key) {
      Some(target) => target.value().clone(),
      None => key,
    }
  }

  fn cached(&self, key: &AbstractKey) -> Option<Instance> {
    self
      .shared
      .get(key)
      .and_then(|cell| cell.value().get().cloned())
  }

  fn produce(&self, concrete: &Concrete, parameters: Vec<Instance>) -> Result<Instance, Error> {
    let callable = match concrete {
      Concrete::Value(value) => return Ok(value.instance().clone()),
      Concrete::Factory(callable) => callable,
      Concrete::Struct(shape) => shape.constructor(),
    };

    if parameters.is_empty() {
      return self.inject(callable);
    }
    if parameters.len() != callable.arity() {
      return Err(Error::ArityMismatch {
        callable: callable.name().to_owned(),
        expected: callable.arity(),
        given: parameters.len(),
      });
    }
    callable.call(&Args::new(parameters))
  }

  /// Resolves each declared parameter in order, then calls the body.
  fn inject(&self, callable: &Callable) -> Result<Instance, Error> {
    let mut args = Vec::with_capacity(callable.arity());
    for (index, param) in callable.params().iter().enumerate() {
      tracing::trace!(callable = callable.name(), index, param = %param.describe(), "injecting parameter");
      args.push(self.make(param.clone())?);
    }
    callable.call(&Args::new(args))
  }

  // --- PUBLIC API ---

  // --- Registration ---

  /// Registers a non-shared binding, replacing any previous one for the same key.
  ///
  /// Interface abstracts require a concrete providing all their methods.
  /// Struct abstracts must be given `None` and bind to themselves.
  pub fn bind(&self, abstract_: impl Into<Abstract>, concrete: impl Into<Option<Concrete>>) -> Result<(), Error> {
    self.provide(abstract_.into(), concrete.into(), false)
  }

  /// Registers a binding whose first product is cached and reused.
  pub fn bind_shared(&self, abstract_: impl Into<Abstract>, concrete: impl Into<Option<Concrete>>) -> Result<(), Error> {
    self.provide(abstract_.into(), concrete.into(), true)
  }

  /// Same as [`Container::bind_shared`].
  pub fn singleton(&self, abstract_: impl Into<Abstract>, concrete: impl Into<Option<Concrete>>) -> Result<(), Error> {
    self.bind_shared(abstract_, concrete)
  }

  /// Makes `name` resolve to whatever `abstract_` is bound to.
  pub fn alias(&self, abstract_: impl Into<Abstract>, name: &str) -> Result<(), Error> {
    let abstract_ = abstract_.into();
    let target = abstract_
      .key()
      .map(|key| self.canonical(key))
      .filter(|key| self.bindings.contains_key(key))
      .ok_or_else(|| Error::AliasAbstractMissing {
        target: abstract_.describe(),
        alias: name.to_owned(),
      })?;

    tracing::debug!(alias = name, target = %target, "alias registered");
    self.aliases.insert(AbstractKey::name(name), target);
    Ok(())
  }

  // --- Resolution ---

  /// Resolves an abstract, auto-injecting factory parameters.
  pub fn make(&self, abstract_: impl Into<Abstract>) -> Result<Instance, Error> {
    self.make_with(abstract_, Vec::new())
  }

  /// Resolves an abstract using explicit factory parameters.
  ///
  /// With an empty `parameters` list this is [`Container::make`]. A cached
  /// shared instance is returned as-is and the parameters are ignored.
  pub fn make_with(&self, abstract_: impl Into<Abstract>, parameters: Vec<Instance>) -> Result<Instance, Error> {
    let abstract_ = abstract_.into();
    let key = match abstract_.key() {
      Some(key) => self.canonical(key),
      None => return self.invoke(abstract_),
    };

    if let Some(instance) = self.cached(&key) {
      tracing::trace!(key = %key, "shared instance cache hit");
      return Ok(instance);
    }

    // Clone out so no map guard is held while factories run.
    let binding = self
      .bindings
      .get(&key)
      .map(|binding| binding.value().clone())
      .ok_or_else(|| Error::BindingMissing { key: key.clone() })?;

    // A shared key re-entered on this thread would block on its own cell,
    // so shared bindings are always checked for cycles.
    let _guard = ResolutionGuard::enter(
      self.id,
      &key,
      self.options.detect_cycles || binding.shared,
      self.options.max_depth,
    )?;
    tracing::trace!(key = %key, shared = binding.shared, "resolving binding");

    if !binding.shared {
      return self.produce(&binding.concrete, parameters);
    }

    let cell = self.shared.entry(key.clone()).or_default().value().clone();
    if let Some(instance) = cell.get() {
      return Ok(instance.clone());
    }

    // Another thread may be running this factory; fail instead of blocking
    // if that thread is, transitively, waiting on us.
    let _waiting = self.inits.wait_on(&key)?;
    cell
      .get_or_try_init(|| {
        let _owner = self.inits.own(&key);
        self.produce(&binding.concrete, parameters)
      })
      .cloned()
  }

  /// Resolves an abstract and downcasts the instance to `T`.
  pub fn make_as<T: Any + Send + Sync>(&self, abstract_: impl Into<Abstract>) -> Result<Arc<T>, Error> {
    let abstract_ = abstract_.into();
    self
      .make(abstract_.clone())?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        subject: abstract_.describe(),
        expected: type_name::<T>(),
      })
  }

  /// Resolves an abstract, panicking if it cannot be resolved.
  ///
  /// # Panics
  ///
  /// Panics on any resolution error. Use [`Container::make`] where a missing
  /// binding is an expected state.
  pub fn get(&self, abstract_: impl Into<Abstract>) -> Instance {
    self
      .make(abstract_)
      .unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
  }

  /// Whether a binding is reachable, directly or through one alias. Never constructs.
  pub fn has(&self, abstract_: impl Into<Abstract>) -> bool {
    abstract_
      .into()
      .key()
      .map(|key| self.bindings.contains_key(&self.canonical(key)))
      .unwrap_or(false)
  }

  /// Whether a shared instance has been produced for this abstract.
  pub fn is_cached(&self, abstract_: impl Into<Abstract>) -> bool {
    abstract_
      .into()
      .key()
      .map(|key| self.cached(&self.canonical(key)).is_some())
      .unwrap_or(false)
  }

  /// Calls an unregistered callable, resolving each of its parameters.
  ///
  /// The result is never cached.
  pub fn invoke(&self, abstract_: impl Into<Abstract>) -> Result<Instance, Error> {
    match abstract_.into() {
      Abstract::Callable(callable) => {
        tracing::trace!(callable = callable.name(), "invoking callable");
        self.inject(&callable)
      }
      other => Err(Error::AbstractNotInvocable {
        name: other.describe(),
      }),
    }
  }
}
