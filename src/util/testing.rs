//! Test support: one global tracing subscriber for all tests of a binary.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::Element;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // RUST_LOG wins; otherwise our own crate at debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xlabel=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {} ({:?})", e, env::var("RUST_LOG"));
    }
}

/// The four-node tree `root -> [A, B]`, `A -> [C]`.
pub fn sample_element() -> Element {
    Element::new("root")
        .with_child(Element::new("A").with_child(Element::new("C")))
        .with_child(Element::new("B"))
}

/// A chain of `depth + 1` nested elements named `level`.
pub fn chain_element(depth: usize) -> Element {
    let mut element = Element::new("level");
    for _ in 0..depth {
        element = Element::new("level").with_child(element);
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_depth_when_building_chain_then_has_depth_plus_one_elements() {
        assert_eq!(chain_element(3).size(), 4);
        assert_eq!(sample_element().size(), 4);
    }
}
