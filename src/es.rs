use crate::config::MaintenanceConfig;
use anyhow::Context;
use async_trait::async_trait;
use elasticsearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        transport::{SingleNodeConnectionPool, TransportBuilder},
        StatusCode,
    },
    indices::{IndicesDeleteParts, IndicesRolloverParts, IndicesStatsParts},
    Elasticsearch, Error,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Store size of a single index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub index: String,
    /// Elasticsearch reports sizes as signed 64 bit integers
    pub size_in_bytes: i64,
}

/// The four cluster calls a maintenance pass is made of.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Store size of every index in the cluster, in one request.
    async fn index_stats(&self) -> anyhow::Result<Vec<IndexStats>>;

    /// Roll the data stream (or alias) over to a new backing index.
    async fn rollover(&self, alias: &str) -> anyhow::Result<()>;

    /// Delete an index. Deleting an index that does not exist succeeds.
    async fn delete_index(&self, index: &str) -> anyhow::Result<()>;

    /// Retry allocation of shards that failed to allocate.
    async fn reroute(&self) -> anyhow::Result<()>;
}

/// Response of `GET /_all/_stats/store`
///
/// ```json
/// {
///   "_shards" : { "total" : 2, "successful" : 1, "failed" : 0 },
///   "_all" : { ... },
///   "indices" : {
///     ".ds-logs-app-2023.01.01-000001" : {
///       "uuid" : "Yx3cLq2KQJqF3l1xqg3Q1w",
///       "primaries" : { "store" : { "size_in_bytes" : 1000000000 } },
///       "total" : { "store" : { "size_in_bytes" : 2000000000 } }
///     }
///   }
/// }
/// ```
#[derive(Deserialize, Debug)]
struct IndicesStats {
    #[serde(default)]
    indices: BTreeMap<String, IndexEntry>,
}

#[derive(Deserialize, Debug)]
struct IndexEntry {
    #[serde(default)]
    total: Total,
}

#[derive(Deserialize, Debug, Default)]
struct Total {
    #[serde(default)]
    store: Store,
}

#[derive(Deserialize, Debug, Default)]
struct Store {
    size_in_bytes: i64,
}

impl IndicesStats {
    fn into_index_stats(self) -> Vec<IndexStats> {
        self.indices
            .into_iter()
            .map(|(index, entry)| IndexStats {
                index,
                size_in_bytes: entry.total.store.size_in_bytes,
            })
            .collect()
    }
}

/// Response of `POST /<alias>/_rollover`, only the fields we log.
#[derive(Deserialize, Debug)]
struct Rollover {
    old_index: String,
    new_index: String,
    rolled_over: bool,
}

/// Create a Elasticsearch client
///
/// Requests authenticate with basic auth and share the pass deadline as
/// their timeout. Certificate validation is turned off when `disable_ssl` is
/// set.
pub fn create_client(
    config: &MaintenanceConfig,
) -> Result<Elasticsearch, Error> {
    let conn_pool = SingleNodeConnectionPool::new(config.url.clone());
    let mut builder = TransportBuilder::new(conn_pool)
        .auth(Credentials::Basic(
            config.username.clone(),
            config.password.clone(),
        ))
        .timeout(config.timeout);
    if config.disable_ssl {
        builder = builder.cert_validation(CertificateValidation::None);
    }

    let transport = builder.build()?;
    Ok(Elasticsearch::new(transport))
}

#[async_trait]
impl ClusterClient for Elasticsearch {
    async fn index_stats(&self) -> anyhow::Result<Vec<IndexStats>> {
        let response = self
            .indices()
            .stats(IndicesStatsParts::IndexMetric(&["_all"], &["store"]))
            .send()
            .await?
            .error_for_status_code()?;

        log::debug!("calling indices stats response : {:?}", response);
        let stats = response
            .json::<IndicesStats>()
            .await
            .context("while decoding indices stats")?;
        let stats = stats.into_index_stats();
        log::info!("{} indices found", stats.len());
        Ok(stats)
    }

    async fn rollover(&self, alias: &str) -> anyhow::Result<()> {
        let response = self
            .indices()
            .rollover(IndicesRolloverParts::Alias(alias))
            .send()
            .await?
            .error_for_status_code()
            .with_context(|| format!("while rolling over {} index", alias))?;

        let rollover = response.json::<Rollover>().await?;
        if !rollover.rolled_over {
            anyhow::bail!("{} was not rolled over: {:?}", alias, rollover);
        }
        log::info!(
            "rolled over {}: {} -> {}",
            alias,
            rollover.old_index,
            rollover.new_index
        );
        Ok(())
    }

    /// A 404 means the index is already gone, i.e removed by an earlier
    /// attempt whose response was lost, and counts as success. Any other
    /// non 2xx status is an error.
    async fn delete_index(&self, index: &str) -> anyhow::Result<()> {
        let response = self
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await?;
        if response.status_code() == StatusCode::NOT_FOUND {
            // a previous attempt may already have removed it
            log::info!("delete index: {}, already gone", index);
            return Ok(());
        }
        let response = response
            .error_for_status_code()
            .with_context(|| format!("while deleting {} index", index))?;
        let body = response.text().await?;
        log::info!("delete index: {}, response: {:?}", index, body);
        Ok(())
    }

    async fn reroute(&self) -> anyhow::Result<()> {
        let response = self
            .cluster()
            .reroute()
            .retry_failed(true)
            .send()
            .await?
            .error_for_status_code()?;
        log::debug!("cluster reroute response: {:?}", response);
        log::info!("requested reroute of unassigned shards");
        Ok(())
    }
}
