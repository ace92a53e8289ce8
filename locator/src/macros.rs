//! Public macros for ergonomic service resolution.

/// Resolves a service from a container, panicking if it cannot be resolved.
///
/// Use it where a missing service is a programming error. For the fallible
/// version, call [`Container::make`](crate::Container::make) or
/// [`Container::make_as`](crate::Container::make_as) directly.
///
/// # Panics
///
/// Panics if the abstract has no binding, if any injected dependency fails,
/// or, in the typed form, if the instance is not of the requested type.
///
/// # Examples
///
/// ```
/// use fibre_locator::{resolve, Concrete, Container};
///
/// let container = Container::new();
/// container.bind("port", Concrete::value(8080u16)).unwrap();
///
/// // Untyped: returns the `Instance` handle.
/// let port = resolve!(container, "port");
/// assert_eq!(port.downcast_ref::<u16>(), Some(&8080));
///
/// // Typed: downcasts to `Arc<u16>`.
/// let port = resolve!(container, "port" => u16);
/// assert_eq!(*port, 8080);
/// ```
#[macro_export]
macro_rules! resolve {
    // Arm for the typed form: resolve!(container, abstract => Type)
    ($container:expr, $abstract:expr => $type:ty) => {
        $container
            .make_as::<$type>($abstract)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required service as {}: {}",
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };

    // Arm for the untyped form: resolve!(container, abstract)
    ($container:expr, $abstract:expr) => {
        $container.get($abstract)
    };
}
