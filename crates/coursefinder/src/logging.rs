use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Diagnostics filter; `RUST_LOG` wins when set
pub fn filter_directives(verbose: bool) -> &'static str {
  if verbose {
    // Verbose mode: debug for coursefinder, info for dependencies
    "coursefinder=debug,ort=warn,info"
  } else {
    // Normal mode: info for coursefinder, warn for everything else
    "coursefinder=info,ort=warn,warn"
  }
}

/// Install the global subscriber; all diagnostics go to stderr so stdout stays clean
pub fn init(verbose: bool) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose)));

  let layer = fmt::layer().with_writer(std::io::stderr).with_target(verbose).compact();

  // try_init leaves an already installed subscriber in place
  let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
}
