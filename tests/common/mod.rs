//! Integration test common infrastructure.
//!
//! Provides a scripted decision engine, credential fixtures (token
//! forging, canned stores), and gateway wiring helpers shared by the
//! per-protocol flow suites.

pub mod engine;
pub mod fixtures;

#[allow(unused_imports)]
pub use engine::{StaticEngine, UnavailableEngine};
#[allow(unused_imports)]
pub use fixtures::{forge_token, CountingKeyStore, MapResolver, TEST_SECRET};

/// Install the test subscriber once per binary so traced flows show up
/// under `--nocapture` with `RUST_LOG` set.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
