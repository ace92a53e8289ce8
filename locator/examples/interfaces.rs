use fibre_locator::{Abstract, Concrete, Container, Interface, StructShape};
use std::sync::Arc;

// 1. The Rust side of the abstraction.
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 2. A service that depends on the abstraction.
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter("fibre_locator=trace")
    .init();

  let container = Container::new();
  let logger = Interface::new("Logger").with_methods(["log"]);

  // --- Registration ---

  // A concrete missing `log` is refused.
  let err = container
    .bind(logger.clone(), Concrete::value(ConsoleLogger))
    .unwrap_err();
  println!("Rejected: {}", err);

  // Stored as `Arc<dyn Logger>` so dependants can downcast to the trait object.
  let console: Arc<dyn Logger> = Arc::new(ConsoleLogger);
  container
    .bind(logger.clone(), Concrete::value(console).provides(["log"]))
    .unwrap();

  // ReportService builds itself; its `logger` field is injected.
  let report = StructShape::new("ReportService", [Abstract::from(logger)], |args| {
    Ok(ReportService {
      logger: (*args.get::<Arc<dyn Logger>>(0)?).clone(),
    })
  });
  container.singleton(report.clone(), None).unwrap();

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = container.make_as::<ReportService>(report).unwrap();

  println!("Using the service...");
  report_service.generate_report();
}
