//! Browser console logging

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_web::MakeWebConsoleWriter;

/// Route `tracing` output to the browser console
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
