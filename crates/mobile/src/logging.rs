use std::sync::Once;

use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Only our own crates; dependency chatter (hyper, tungstenite) stays out of the log.
fn is_ours(module_path: Option<&str>) -> bool {
    module_path.unwrap_or_default().starts_with("orecart")
}

pub(crate) fn setup_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = FilterFn::new(|metadata| is_ours(metadata.module_path()));

        #[cfg(target_os = "android")]
        {
            use tracing_logcat::{LogcatMakeWriter, LogcatTag};

            let tag = LogcatTag::Fixed("OreCart-Rust".to_owned());
            let writer = match LogcatMakeWriter::new(tag) {
                Ok(writer) => writer,
                Err(e) => {
                    eprintln!("failed to initialize logcat writer: {e}");
                    return;
                }
            };
            let layer = tracing_subscriber::fmt::layer()
                .event_format(Format::default().with_level(false).without_time())
                .with_writer(writer)
                .with_ansi(false);
            let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
        }

        #[cfg(not(target_os = "android"))]
        {
            let layer = tracing_subscriber::fmt::layer()
                .event_format(Format::default().without_time())
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_our_crates() {
        assert!(is_ours(Some("orecart_core::subscription::client")));
        assert!(is_ours(Some("orecart_mobile")));
        assert!(!is_ours(Some("tokio_tungstenite::compat")));
        assert!(!is_ours(None));
    }

    #[test]
    fn test_setup_is_idempotent() {
        setup_logging();
        setup_logging();
    }
}
