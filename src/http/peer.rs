use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// How long a reverse lookup may take before the peer stays numeric.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Reverse-resolves `ip` to a host name.
///
/// Returns `None` when the lookup fails, times out, or only yields the
/// numeric address back.
pub async fn resolve_name(ip: IpAddr) -> Option<String> {
    let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip));

    match timeout(LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(Ok(name))) => named(ip, name),
        Ok(Ok(Err(e))) => {
            debug!(error = %e, "Reverse lookup failed");
            None
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Reverse lookup task failed");
            None
        }
        Err(_) => {
            debug!("Reverse lookup timed out");
            None
        }
    }
}

fn named(ip: IpAddr, name: String) -> Option<String> {
    if name.is_empty() || name.parse::<IpAddr>().is_ok_and(|parsed| parsed == ip) {
        None
    } else {
        Some(name)
    }
}
