use std::sync::Arc;

use crate::{
    config::PipelineSettings,
    services::{
        providers::{TasteGraph, TextGenerator},
        Aggregator, Enricher, ExampleGenerator,
    },
};

/// Shared application state
///
/// Holds only immutable pipeline components; every request works on its own data.
#[derive(Clone)]
pub struct AppState {
    pub examples: Arc<ExampleGenerator>,
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    /// Wires the pipeline components around the two upstream providers
    pub fn new(
        graph: Arc<dyn TasteGraph>,
        generator: Arc<dyn TextGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            examples: Arc::new(ExampleGenerator::new(
                generator.clone(),
                settings.max_concurrency,
            )),
            aggregator: Arc::new(Aggregator::new(graph, generator, settings)),
        }
    }

    pub fn enricher(&self) -> &Enricher {
        self.aggregator.enricher()
    }
}
