use anyhow::Result;
use docview_engine::load_tree;
use docview_runtime::{AppConfig, DocServer, shutdown_signal};
use std::sync::Arc;
use tracing::info;

pub fn handle(config: &AppConfig) -> Result<()> {
    let root = config.root_path()?;
    let tree = load_tree(&root, &config.filter())?;
    info!(
        root = %root.display(),
        documents = tree.document_count(),
        "document tree loaded"
    );

    let server = Arc::new(DocServer::from_config(Arc::new(tree), config)?);
    let addr = config.bind_addr();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let listener = DocServer::bind(&addr).await?;
        eprintln!(
            "Serving {} on {} (connect with: ssh -p {} {})",
            root.display(),
            addr,
            config.server.port,
            config.server.host
        );
        server.serve(listener, shutdown_signal()).await
    })?;

    Ok(())
}
