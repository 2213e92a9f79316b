//! Logging setup shared by binaries built on this crate.

/// Initializes the tracing/logging infrastructure.
///
/// Verbosity comes from the `RUST_LOG` environment variable:
/// - `RUST_LOG=info` - successful operations and validation failures
/// - `RUST_LOG=debug` - adds query descriptors and payloads
/// - `RUST_LOG=jsonapi_handler=debug` - debug output for the handler only
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Server started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
