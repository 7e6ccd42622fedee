//! Log setup: everything to a file, WARN and ERROR also to the status bar.

use std::path::Path;

use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "debug,hyper_util=warn,reqwest=warn,hyper=warn";

/// Forwards WARN and ERROR events as single formatted lines.
pub struct StatusLayer {
    sender: mpsc::UnboundedSender<String>,
}

impl StatusLayer {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl<S> tracing_subscriber::Layer<S> for StatusLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = event.metadata().level();
        if !matches!(*level, tracing::Level::WARN | tracing::Level::ERROR) {
            return;
        }

        let mut message = format!("{} [{}] ", chrono::Local::now().format("%H:%M:%S"), level);
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        // No receiver once the UI is gone
        let _ = self.sender.send(message);
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

/// Install the global subscriber.  `RUST_LOG` overrides the default filter.
pub fn init(log_path: &Path, status_tx: mpsc::UnboundedSender<String>) -> anyhow::Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(StatusLayer::new(status_tx))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_warnings_and_errors_reach_the_status_bar() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(StatusLayer::new(tx));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("loaded");
            tracing::warn!(episode = "ep-1", "no audio");
            tracing::error!("mpv gone");
        });

        let first = rx.try_recv().unwrap();
        assert!(first.contains("[WARN] no audio episode=\"ep-1\""), "{}", first);
        let second = rx.try_recv().unwrap();
        assert!(second.contains("[ERROR] mpv gone"), "{}", second);
        assert!(rx.try_recv().is_err());
    }
}
