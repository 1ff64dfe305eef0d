//! Wiring trait objects: a pre-built implementation, an alias to a concrete
//! type, and a trait-typed recipe slot.
//!
//! Run with: cargo run --example trait_wiring

use std::sync::Arc;

use wirebox::{bind_alias, injectable, Registry};

trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

struct EmailNotifier {
    from: String,
}
impl Notifier for EmailNotifier {
    fn notify(&self, message: &str) {
        println!("email from {}: {message}", self.from);
    }
}

#[derive(Default)]
struct ConsoleNotifier;
injectable!(ConsoleNotifier {});
impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("console: {message}");
    }
}

#[derive(Default)]
struct AlertService {
    notifier: Option<Arc<dyn Notifier>>,
}
injectable!(AlertService {
    notifier: implemented dyn Notifier,
});

impl AlertService {
    fn alert(&self, message: &str) {
        match &self.notifier {
            Some(notifier) => notifier.notify(message),
            None => println!("dropped (no notifier wired): {message}"),
        }
    }
}

fn main() {
    // An isolated registry per wiring style.
    let by_instance = Registry::new();
    by_instance.bind_impl::<dyn Notifier>(Arc::new(EmailNotifier {
        from: "ops@example.com".into(),
    }));
    by_instance
        .resolve::<AlertService>()
        .unwrap()
        .alert("disk almost full");

    let by_alias = Registry::new();
    bind_alias!(by_alias, dyn Notifier => ConsoleNotifier);
    by_alias
        .resolve::<AlertService>()
        .unwrap()
        .alert("deploy finished");

    // With nothing bound for the trait, the slot stays empty.
    let unwired = Registry::new();
    unwired
        .resolve::<AlertService>()
        .unwrap()
        .alert("this one has nowhere to go");
}
