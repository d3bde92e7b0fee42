//! Tracing subscriber setup for the bridge-runner binary

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Directives added on top of `RUST_LOG`.
const DEFAULT_DIRECTIVES: &[&str] = &[
    "batched_bridge=info",
    "quickjs_runtime::quickjsrealmadapter=warn",
    "quickjs_runtime::typescript=warn",
];

/// Install a fmt subscriber filtered by `RUST_LOG` plus [`DEFAULT_DIRECTIVES`].
///
/// Output goes to stderr; stdout is reserved for bridge results.
pub fn init_tracing() {
    let filter = DEFAULT_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive)
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
