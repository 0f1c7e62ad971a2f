use std::sync::Arc;
use std::time::Duration;

use crate::dom::{Element, HostDocument};
use crate::error::PipError;

const FEED_LOST_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resolve `selector`, waiting for it to mount if needed.
///
/// Each call owns at most one mutation observer, and that observer is
/// disconnected before this returns on every path.
pub async fn locate(
    document: &dyn HostDocument,
    selector: &str,
    timeout: Duration,
) -> Result<Arc<dyn Element>, PipError> {
    if let Some(element) = document.query_selector(selector) {
        return Ok(element);
    }

    log::debug!(
        "Waiting up to {}ms for `{}` to mount",
        timeout.as_millis(),
        selector
    );

    let mut observer = document.observe_mutations();
    let outcome = tokio::time::timeout(timeout, async {
        loop {
            // Checked before every wait so a mount racing the subscription is not missed.
            if let Some(element) = document.query_selector(selector) {
                return element;
            }
            if observer.next_mutation().await.is_none() {
                break;
            }
        }
        // The notification source went away. Keep checking until the deadline.
        log::debug!("Mutation feed ended while waiting for `{}`, polling instead", selector);
        loop {
            tokio::time::sleep(FEED_LOST_POLL_INTERVAL).await;
            if let Some(element) = document.query_selector(selector) {
                return element;
            }
        }
    })
    .await;
    observer.disconnect();

    match outcome {
        Ok(element) => {
            log::debug!("`{}` mounted", selector);
            Ok(element)
        }
        Err(_) => {
            log::warn!(
                "`{}` not found within {}ms, staying dormant",
                selector,
                timeout.as_millis()
            );
            Err(PipError::LocatorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}
