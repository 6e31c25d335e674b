//! Inspector: the live set of containers, as entities.

use tracing::{debug, warn};

use crate::client::RuntimeOps;
use crate::docker::inventory::container_from_inspect;
use crate::error::EngineError;
use crate::model::Container;

/// Every container the runtime knows about, stopped ones included.
///
/// Listing and mapping failures abort the whole call: an unreachable runtime
/// must never look like an empty one. A container removed between listing
/// and inspection is skipped.
pub async fn running_containers(runtime: &dyn RuntimeOps) -> Result<Vec<Container>, EngineError> {
    let ids = runtime.list_container_ids().await?;
    debug!(count = ids.len(), "Listed runtime containers");

    let mut containers = Vec::with_capacity(ids.len());
    for id in ids {
        let details = match runtime.inspect_container(&id).await {
            Ok(details) => details,
            Err(EngineError::NotFound(_)) => {
                warn!(container_id = %id, "Container vanished before it could be inspected");
                continue;
            }
            Err(e) => return Err(e),
        };
        containers.push(container_from_inspect(&id, details)?);
    }
    Ok(containers)
}
