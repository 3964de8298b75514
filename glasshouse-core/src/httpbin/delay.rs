//! `/delay/{s}` (spec §4.7): the one HTTPBin handler that actually
//! suspends — everything else here is synchronous.

use std::time::Duration;

use crate::router::{HandlerFuture, RequestDescriptor};

const PREFIX: &str = "/delay/";

pub fn delay(req: &RequestDescriptor) -> HandlerFuture {
    let seconds: u64 = req.path.strip_prefix(PREFIX).and_then(|s| s.parse().ok()).unwrap_or(1);
    let seconds = seconds.clamp(1, 10);
    let req = req.clone();
    Box::pin(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        super::echo::get_directive(&req)
    })
}
