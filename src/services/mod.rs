use futures::{stream, StreamExt};
use std::future::Future;

pub mod aggregator;
pub mod enrichment;
pub mod examples;
pub mod extraction;
pub mod identity;
pub mod prompts;
pub mod providers;
pub mod recommendations;
pub mod resolver;

pub use aggregator::{Aggregator, BlendOutcome};
pub use enrichment::Enricher;
pub use examples::ExampleGenerator;
pub use identity::IdentitySetBuilder;
pub use recommendations::RecommendationFetcher;
pub use resolver::EntityResolver;

/// Runs `work` over every input with at most `limit` units in flight
///
/// Results come back in input order regardless of completion order. Units are
/// independent: each yields its own value and none is cancelled by a sibling.
pub(crate) async fn fan_out<I, T, F, Fut>(inputs: I, limit: usize, work: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(inputs)
        .map(work)
        .buffered(limit.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fan_out_preserves_input_order() {
        let delays = vec![30u64, 5, 15, 0];
        let results = fan_out(delays, 4, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay
        })
        .await;
        assert_eq!(results, vec![30, 5, 15, 0]);
    }

    #[tokio::test]
    async fn test_fan_out_zero_limit_still_runs() {
        let results = fan_out(1..=3, 0, |n| async move { n * 2 }).await;
        assert_eq!(results, vec![2, 4, 6]);
    }
}
