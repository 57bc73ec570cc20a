use elasticsearch_cleanup::{args::Opt, cleanup};
use structopt::StructOpt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    if opt.debug || opt.verbose > 0 {
        env_logger::Builder::from_default_env()
            .filter_level(opt.log_level())
            .init();
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .init();
    }
    log::info!("Elasticsearch cleanup started!");

    let config = opt.into_config()?;
    log::debug!("{:?}", config);

    let outcome = cleanup::run(&config).await?;
    log::info!(
        "done, {} indices rolled over, {} skipped",
        outcome.rolled_over,
        outcome.skipped.len()
    );

    Ok(())
}
