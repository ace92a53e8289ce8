//! Core, non-public data structures for the container.

use crate::descriptor::Concrete;
use crate::error::Error;
use dashmap::DashMap;
use std::cell::RefCell;
use std::fmt;
use std::thread::{self, ThreadId};

thread_local! {
  // Keys currently being resolved on this thread, tagged with the id of the
  // container doing the resolving. Re-entering a key means a cycle.
  static RESOLVING_STACK: RefCell<Vec<(u64, AbstractKey)>> = const { RefCell::new(Vec::new()) };
}

/// The kind of descriptor a key was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
  Name,
  Interface,
  Struct,
}

/// Canonical identity of an abstract; the join key across all container tables.
///
/// Names compare by string, interfaces and structs by their nominal name
/// within their own kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbstractKey {
  kind: KeyKind,
  ident: String,
}

impl AbstractKey {
  pub(crate) fn new(kind: KeyKind, ident: impl Into<String>) -> Self {
    Self {
      kind,
      ident: ident.into(),
    }
  }

  pub fn name(ident: impl Into<String>) -> Self {
    Self::new(KeyKind::Name, ident)
  }

  pub fn kind(&self) -> KeyKind {
    self.kind
  }

  pub fn ident(&self) -> &str {
    &self.ident
  }
}

impl fmt::Display for AbstractKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      KeyKind::Name => f.write_str(&self.ident),
      KeyKind::Interface => write!(f, "interface {}", self.ident),
      KeyKind::Struct => write!(f, "struct {}", self.ident),
    }
  }
}

/// A registered producer for one key.
#[derive(Clone)]
pub(crate) struct Binding {
  pub(crate) concrete: Concrete,
  pub(crate) shared: bool,
}

/// An RAII guard tracking the keys under resolution on the current thread.
///
/// Entering a key that the same container is already resolving fails with
/// [`Error::CircularDependency`] (when enabled), and entering deeper than the
/// configured limit fails with [`Error::ResolutionTooDeep`]. Dropping the
/// guard pops its key.
pub(crate) struct ResolutionGuard {
  container: u64,
}

impl ResolutionGuard {
  pub(crate) fn enter(
    container: u64,
    key: &AbstractKey,
    detect_cycles: bool,
    max_depth: Option<usize>,
  ) -> Result<Self, Error> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();

      if detect_cycles {
        if let Some(start) = stack
          .iter()
          .position(|(id, resolving)| *id == container && resolving == key)
        {
          let chain: Vec<String> = stack[start..]
            .iter()
            .filter(|(id, _)| *id == container)
            .map(|(_, resolving)| resolving.to_string())
            .chain(std::iter::once(key.to_string()))
            .collect();
          tracing::debug!(key = %key, chain = ?chain, "circular dependency detected");
          return Err(Error::CircularDependency { chain });
        }
      }

      if let Some(max_depth) = max_depth {
        let depth = stack.iter().filter(|(id, _)| *id == container).count();
        if depth >= max_depth {
          tracing::debug!(key = %key, max_depth, "resolution depth limit reached");
          return Err(Error::ResolutionTooDeep {
            key: key.clone(),
            max_depth,
          });
        }
      }

      stack.push((container, key.clone()));
      Ok(Self { container })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      // Guards drop in LIFO order, so our entry is the last one for this container.
      if let Some(pos) = stack.iter().rposition(|(id, _)| *id == self.container) {
        stack.remove(pos);
      }
    });
  }
}

/// Tracks shared keys under initialisation across threads.
///
/// `owners` maps a key to the thread running its factory, `waiting` maps a
/// thread to the key whose cell it is blocked on. Following the two maps from
/// a key we are about to wait on and arriving back at the current thread
/// means the wait would never end.
#[derive(Default)]
pub(crate) struct InitTracker {
  owners: DashMap<AbstractKey, ThreadId>,
  waiting: DashMap<ThreadId, AbstractKey>,
}

impl InitTracker {
  /// Records that the current thread is about to wait on `key`.
  ///
  /// The entry is written before the wait-for chain is walked, so of two
  /// threads closing a cycle at the same moment at least one sees the other.
  pub(crate) fn wait_on(&self, key: &AbstractKey) -> Result<WaitGuard<'_>, Error> {
    let me = thread::current().id();
    self.waiting.insert(me, key.clone());

    let mut chain = vec![key.to_string()];
    let mut next = key.clone();
    for _ in 0..=self.waiting.len() {
      let owner = match self.owners.get(&next) {
        Some(owner) => *owner.value(),
        None => break,
      };
      if owner == me {
        self.waiting.remove(&me);
        chain.push(key.to_string());
        tracing::debug!(key = %key, chain = ?chain, "circular dependency detected across threads");
        return Err(Error::CircularDependency { chain });
      }
      next = match self.waiting.get(&owner) {
        Some(waited) => waited.value().clone(),
        None => break,
      };
      chain.push(next.to_string());
    }

    Ok(WaitGuard {
      tracker: self,
      thread: me,
      key: key.clone(),
    })
  }

  /// Marks the current thread as the one running `key`'s factory.
  pub(crate) fn own(&self, key: &AbstractKey) -> OwnerGuard<'_> {
    let me = thread::current().id();
    // Running the factory, not waiting on it.
    self.waiting.remove_if(&me, |_, waited| waited == key);
    self.owners.insert(key.clone(), me);
    OwnerGuard {
      tracker: self,
      key: key.clone(),
    }
  }
}

pub(crate) struct WaitGuard<'a> {
  tracker: &'a InitTracker,
  thread: ThreadId,
  key: AbstractKey,
}

impl Drop for WaitGuard<'_> {
  fn drop(&mut self) {
    let key = &self.key;
    self
      .tracker
      .waiting
      .remove_if(&self.thread, |_, waited| waited == key);
  }
}

pub(crate) struct OwnerGuard<'a> {
  tracker: &'a InitTracker,
  key: AbstractKey,
}

impl Drop for OwnerGuard<'_> {
  fn drop(&mut self) {
    self.tracker.owners.remove(&self.key);
  }
}
