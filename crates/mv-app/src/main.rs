use std::sync::Arc;

use log::{info, warn};
use mv_app::{
    AppConfig, HttpGenerator, HttpProvenanceSink, Orchestrator, ProvenanceSink, ProvenanceStore,
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    info!("Generator endpoint: {}", config.generator_url);

    let generator = Arc::new(HttpGenerator::new(
        config.generator_url.clone(),
        config.generator_timeout,
    )?);

    let primary: Option<Arc<dyn ProvenanceSink>> = match &config.provenance_url {
        Some(url) => {
            let sink = HttpProvenanceSink::new(url.clone(), config.provenance_api_key.clone())?;
            Some(Arc::new(sink) as Arc<dyn ProvenanceSink>)
        }
        None => {
            warn!("PROVENANCE_URL not set, provenance is kept in the local log only");
            None
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(
        generator,
        Arc::new(ProvenanceStore::new(primary)),
    ));

    server::serve(config.port, orchestrator).await
}
