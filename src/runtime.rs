use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

/// How long shutdown waits for blocking work the run left behind, such as an abandoned render.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

pub fn build() -> io::Result<Runtime> {
    Builder::new_multi_thread().enable_all().build()
}

/// Drives `future` to completion, then shuts `runtime` down without waiting on stragglers.
pub fn run_to_completion<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    output
}
