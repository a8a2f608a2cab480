//! Optional `env_logger` bootstrap for binaries, examples, and tests.
//!
//! The library itself only ever calls into the `log` facade and never
//! installs a logger — that decision belongs to whatever embeds this
//! crate. This module exists purely as the shared convenience the
//! teacher's own binaries use (`env_logger::Builder::from_default_env()`
//! in `main.rs`), so demos and integration tests don't each reinvent it.

/// Installs `env_logger` with the default env filter, falling back to
/// `info` when `RUST_LOG` isn't set. Safe to call more than once — later
/// calls are no-ops, matching `env_logger::try_init`'s contract.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
