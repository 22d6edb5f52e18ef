//! Console adapter: the delivery backend of last resort.

use std::fmt;
use std::io::{self, Write};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::adapter::{Adapter, SendFuture};
use crate::alert::Alert;

/// Writes a full dump of every alert to the log and to standard output.
///
/// Sending never fails. A broken output stream is logged and ignored.
pub struct ConsoleAdapter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleAdapter {
    /// Adapter name.
    pub const NAME: &'static str = "console";

    /// Creates a console adapter writing to standard output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Creates a console adapter writing to the given sink instead of stdout.
    #[must_use]
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    fn render(alert: &Alert) -> String {
        format!("{alert:#?}")
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleAdapter").finish_non_exhaustive()
    }
}

impl Adapter for ConsoleAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn send<'a>(&'a self, alert: &'a Alert) -> SendFuture<'a> {
        Box::pin(async move {
            let message = Self::render(alert);

            {
                let mut out = self.out.lock();
                if let Err(err) = writeln!(out, "{message}").and_then(|()| out.flush()) {
                    warn!(adapter = Self::NAME, error = %err, "failed to write alert to console");
                }
            }

            info!(adapter = Self::NAME, alert = %alert.name(), "{message}");
            Ok(())
        })
    }
}
