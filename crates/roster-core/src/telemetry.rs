//! Tracing initialisation for Roster binaries.
//!
//! Log lines always go to stderr, in text or JSON, so they never interleave
//! with table output on stdout. Only the first [`init_tracing`] call installs
//! a subscriber; later calls are no-ops.

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// * `json` - emit newline-delimited JSON log lines.
/// * `level` - verbosity used when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    tracing::subscriber::set_global_default(subscriber(json, level, std::io::stderr)).ok();
}

fn subscriber<W>(json: bool, level: Level, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(false).with_writer(writer);

    if json {
        Box::new(registry.with(layer.json()))
    } else {
        Box::new(registry.with(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::DEBUG);
        init_tracing(true, Level::INFO);
        tracing::info!("still logging");
    }

    #[test]
    fn test_json_lines_use_the_configured_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        let sub = subscriber(true, Level::INFO, move || sink.clone());

        tracing::subscriber::with_default(sub, || tracing::warn!(id = 7, "update rejected"));

        let line = captured.text();
        assert!(line.contains(r#""message":"update rejected""#), "{line}");
        assert!(line.contains(r#""id":7"#), "{line}");
    }

    #[test]
    fn test_text_lines_use_the_configured_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        let sub = subscriber(false, Level::INFO, move || sink.clone());

        tracing::subscriber::with_default(sub, || tracing::warn!("delete rejected"));

        assert!(captured.text().contains("delete rejected"));
    }
}
