//! The process-wide default registry and its free-function surface.
//!
//! These tests mutate shared process state, so they run serially.

use std::sync::Arc;

use serial_test::serial;
use wirebox::{injectable, DiError, Registry, TypeKey};

#[derive(Default, Clone, Debug, PartialEq)]
struct Settings {
    region: String,
}
injectable!(Settings {});

trait Mailer: Send + Sync {
    fn from(&self) -> &'static str;
}

#[derive(Default)]
struct SmtpMailer;
injectable!(SmtpMailer {});
impl Mailer for SmtpMailer {
    fn from(&self) -> &'static str {
        "noreply@example.com"
    }
}

#[test]
#[serial]
fn test_free_functions_operate_on_the_default_registry() {
    wirebox::reset();
    wirebox::bind_instance(Settings { region: "eu-1".into() });

    assert!(wirebox::has_rule(TypeKey::of::<Settings>()));
    assert_eq!(wirebox::resolve::<Settings>().unwrap().region, "eu-1");

    wirebox::reset();
    assert!(!wirebox::has_rule(TypeKey::of::<Settings>()));
}

#[test]
#[serial]
fn test_trait_wiring_through_the_default_registry() {
    wirebox::reset();
    wirebox::bind_alias!(dyn Mailer => SmtpMailer);

    let mailer = wirebox::resolve_impl::<dyn Mailer>().unwrap();
    assert_eq!(mailer.from(), "noreply@example.com");

    // The alias installed an auto rule for its target as well.
    assert!(wirebox::has_rule(TypeKey::of::<SmtpMailer>()));
    wirebox::reset();
}

#[test]
#[serial]
fn test_invoke_through_the_default_registry() {
    wirebox::reset();
    wirebox::bind_instance(Settings { region: "us-2".into() });

    let region = wirebox::call(|settings: Arc<Settings>| -> Result<String, DiError> {
        Ok(settings.region.clone())
    })
    .unwrap();
    assert_eq!(region, "us-2");
    wirebox::reset();
}

#[test]
#[serial]
fn test_panicking_wrappers_resolve_or_die() {
    wirebox::reset();
    wirebox::bind_instance(Settings { region: "ap-1".into() });

    // Happy path.
    assert_eq!(wirebox::instance::<Settings>().region, "ap-1");
    wirebox::invoke(|settings: Arc<Settings>| -> Result<(), DiError> {
        assert_eq!(settings.region, "ap-1");
        Ok(())
    });

    // An unbound trait object key has no implicit fallback.
    let outcome = std::panic::catch_unwind(|| wirebox::implementation::<dyn Mailer>());
    assert!(outcome.is_err());
    wirebox::reset();
}

#[test]
#[serial]
fn test_snapshots_survive_a_registry_swap() {
    wirebox::reset();
    let snapshot = wirebox::default_registry();
    snapshot.bind_instance(Settings { region: "old".into() });

    wirebox::set_default_registry(Arc::new(Registry::new()));

    // The old handle still resolves; the new default is empty.
    assert_eq!(snapshot.resolve::<Settings>().unwrap().region, "old");
    assert!(!wirebox::has_rule(TypeKey::of::<Settings>()));
    wirebox::reset();
}

#[test]
#[serial]
fn test_prebuilt_registry_can_be_installed() {
    let staged = Arc::new(Registry::new());
    staged.bind_instance(Settings { region: "staged".into() });

    wirebox::set_default_registry(staged);
    assert_eq!(wirebox::resolve::<Settings>().unwrap().region, "staged");
    wirebox::reset();
}
