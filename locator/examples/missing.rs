use fibre_locator::{resolve, Container};
use std::panic::{self, AssertUnwindSafe};

fn main() {
  let container = Container::new();

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(AssertUnwindSafe(|| {
    // This line will panic!
    let _service = resolve!(&container, "unregistered");
  }));

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `make()` method ---
  println!("\nNow, attempting to resolve using the fallible `make()` method...");

  match container.make("unregistered") {
    Ok(_) => panic!("Should not have found the service!"),
    Err(err) if err.is_binding_missing() => println!("Correctly received an error: {}", err),
    Err(err) => panic!("Unexpected error: {}", err),
  }
}
