//! # dupepix CLI
//!
//! Command-line interface for the duplicate photo scanner.
//!
//! ## Usage
//! ```bash
//! dupepix scan ~/Photos
//! dupepix scan ~/Photos --verbose --output json
//! ```

mod cli;

use dupepix::Result;

fn main() -> Result<()> {
    dupepix::init_tracing();
    cli::run()
}
