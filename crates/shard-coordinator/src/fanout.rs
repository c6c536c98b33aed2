//! Per-node call dispatch

use crate::config::DispatchMode;
use futures::future::join_all;
use std::future::Future;

/// Run `f` over every item and collect the outputs in item order.
///
/// In concurrent mode all futures are polled together, so a slow or
/// unreachable node delays the whole batch by its own latency only.
pub(crate) async fn fan_out<I, F, Fut>(mode: DispatchMode, items: I, f: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future,
{
    match mode {
        DispatchMode::Sequential => {
            let mut outputs = Vec::new();
            for item in items {
                outputs.push(f(item).await);
            }
            outputs
        }
        DispatchMode::Concurrent => join_all(items.into_iter().map(f)).await,
    }
}
