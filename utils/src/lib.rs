pub mod workload;

pub use workload::{random_string, Splice, Workload};

/// Installs a logger for tests, honouring `RUST_LOG`. Calling it more than
/// once is harmless.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
