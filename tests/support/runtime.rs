//! Shared Tokio runtime helper for integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use pr_reviewer::ReviewError;
use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::MockServer;

use super::step_error;

/// Shared runtime wrapper that can be stored in an `rstest-bdd` Slot.
#[derive(Clone)]
pub struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    pub fn new(runtime: Runtime) -> Self {
        Self(Rc::new(RefCell::new(runtime)))
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }
}

/// Ensures a Tokio runtime and Wiremock server are initialised.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] if the Tokio runtime cannot be created or if
/// the slots behave unexpectedly.
pub fn ensure_runtime_and_server(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
) -> Result<SharedRuntime, ReviewError> {
    if runtime.with_ref(|_| ()).is_none() {
        let created = Runtime::new()
            .map_err(|error| step_error(format!("failed to create Tokio runtime: {error}")))?;
        runtime.set(SharedRuntime::new(created));
    }

    let shared_runtime = runtime
        .get()
        .ok_or_else(|| step_error("runtime not initialised after set"))?;

    if server.with_ref(|_| ()).is_none() {
        server.set(shared_runtime.block_on(MockServer::start()));
    }

    Ok(shared_runtime)
}
