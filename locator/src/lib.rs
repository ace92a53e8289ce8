//! # Fibre Locator
//!
//! A runtime service locator with constructor auto-injection.
//!
//! Services are registered against explicit abstract descriptors and resolved
//! on demand. A binding can be shared, in which case its first product is
//! cached and handed out for every later resolution of the same key.
//!
//! ## Core Concepts
//!
//! - **Abstract**: what callers ask for. A plain name, an [`Interface`] (a name
//!   plus the methods a concrete must provide), a [`StructShape`] (a struct that
//!   builds itself from its field dependencies) or a [`Callable`].
//! - **Concrete**: what the container produces. A stored value, a factory
//!   [`Callable`] or a [`StructShape`].
//! - **Auto-injection**: a callable's declared parameters are themselves
//!   abstracts, resolved through the container before the callable runs.
//! - **Alias**: a second name for an existing binding.
//!
//! There is no global container. Create a [`Container`] and share it the way
//! your application shares any other state.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_locator::{Abstract, Callable, Concrete, Container, Interface, StructShape};
//!
//! struct EnglishGreeter;
//!
//! struct Greeting {
//!   message: String,
//! }
//!
//! let container = Container::new();
//! let greeter = Interface::new("Greeter").with_methods(["greet"]);
//!
//! container
//!   .bind(greeter.clone(), Concrete::value(EnglishGreeter).provides(["greet"]))
//!   .unwrap();
//! container
//!   .bind("greeting.message", Concrete::value(String::from("Hello, World!")))
//!   .unwrap();
//!
//! // Greeting builds itself from the message binding.
//! let greeting = StructShape::new(
//!   "Greeting",
//!   [Abstract::from("greeting.message")],
//!   |args| {
//!     Ok(Greeting {
//!       message: (*args.get::<String>(0)?).clone(),
//!     })
//!   },
//! );
//! container.singleton(greeting.clone(), None).unwrap();
//!
//! let resolved = container.make_as::<Greeting>(greeting).unwrap();
//! assert_eq!(resolved.message, "Hello, World!");
//!
//! // Unregistered callables are invoked with their parameters injected.
//! let shout = Callable::new("shout", [Abstract::from("greeting.message")], |args| {
//!   Ok(args.get::<String>(0)?.to_uppercase())
//! });
//! let shouted = container.invoke(shout).unwrap();
//! assert_eq!(shouted.downcast_ref::<String>().unwrap(), "HELLO, WORLD!");
//! assert!(container.has(greeter));
//! ```

mod container;
mod core;
mod descriptor;
mod error;
mod macros;
mod options;

pub use crate::core::{AbstractKey, KeyKind};
pub use container::Container;
pub use descriptor::{instance, Abstract, Args, Callable, Concrete, Instance, Interface, StructShape, Value};
pub use error::{Error, OptionsError};
pub use options::ContainerOptions;
