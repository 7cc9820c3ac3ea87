use std::future::Future;

/// Drive a batch of independent fallible futures concurrently and wait for
/// *all* of them, regardless of individual failures. Outcomes come back in
/// input order.
///
/// This is `Promise.allSettled` rather than `try_join_all`: a failed write in
/// a persistence fan-out must never abort its siblings.
pub async fn settle_all<T, E, F>(futures: impl IntoIterator<Item = F>) -> Vec<Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    futures::future::join_all(futures).await
}
