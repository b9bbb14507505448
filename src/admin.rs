use serde::Serialize;
use tracing::info;

use crate::{
    cache::{CacheManager, PurgeFilter},
    error::{AppError, AppResult},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdminStatus {
    pub status: &'static str,
    pub command: String,
    pub collection: String,
    pub deleted: u64,
}

/// Dispatches an administrative command. `deleteAll` purges `param`, or the
/// default collection when `param` is empty.
pub async fn run_admin_command(
    cache: &CacheManager,
    default_collection: &str,
    name: &str,
    param: &str,
) -> AppResult<AdminStatus> {
    match name {
        "deleteAll" => {
            let collection = match param.trim() {
                "" => default_collection,
                named => named,
            };
            let deleted = cache.purge(collection, PurgeFilter::All).await?;
            info!(collection = %collection, deleted = deleted, "purged collection");
            Ok(AdminStatus {
                status: "success",
                command: name.to_string(),
                collection: collection.to_string(),
                deleted,
            })
        },
        other => Err(AppError::invalid(format!("unknown command: {other}"))),
    }
}
