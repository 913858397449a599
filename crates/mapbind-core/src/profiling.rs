//! Profiling utilities based on the `puffin` crate.
//!
//! With the `profiling` feature disabled the scope macros expand to nothing,
//! so call sites never need their own `cfg` guards.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

#[cfg(feature = "profiling")]
pub use puffin::{profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __mapbind_profile_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "profiling"))]
pub use crate::__mapbind_profile_noop as profile_function;
#[cfg(not(feature = "profiling"))]
pub use crate::__mapbind_profile_noop as profile_scope;

/// Address the puffin HTTP server binds to.
pub const PROFILING_ADDR: &str = "0.0.0.0:8585";

#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable puffin scopes and start the HTTP server for `puffin_viewer`.
///
/// # Example
/// ```no_run
/// mapbind_core::profiling::init_profiling();
/// ```
#[cfg(feature = "profiling")]
pub fn init_profiling() {
    puffin::set_scopes_on(true);

    match puffin_http::Server::new(PROFILING_ADDR) {
        Ok(server) => {
            tracing::info!("Puffin profiler server started on http://{}", PROFILING_ADDR);
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("Failed to start puffin server: {}", e);
        }
    }
}

#[cfg(not(feature = "profiling"))]
pub fn init_profiling() {
    tracing::debug!("profiling feature disabled, init_profiling is a no-op");
}

/// Mark a frame boundary.
///
/// Hosts that drive lifecycle updates from a render loop call this once per
/// loop iteration so puffin groups scopes by frame.
#[inline]
pub fn new_frame() {
    #[cfg(feature = "profiling")]
    puffin::GlobalProfiler::lock().new_frame();
}
