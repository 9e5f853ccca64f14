//! JSON-RPC indexer queries.
//!
//! The gRPC API has no "transactions that called this Move function" query,
//! so quest discovery goes through the fullnode's JSON-RPC endpoint:
//! `suix_queryTransactionBlocks` with a `MoveFunction` filter and
//! `showObjectChanges`, paginated until exhausted.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::chain::resolve_jsonrpc_url;
use crate::constants::TX_QUERY_PAGE_LIMIT;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<QueryResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    data: Vec<TransactionBlock>,
    #[serde(rename = "nextCursor")]
    next_cursor: Option<String>,
    #[serde(rename = "hasNextPage")]
    has_next_page: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TransactionBlock {
    #[serde(rename = "objectChanges")]
    object_changes: Option<Vec<ObjectChange>>,
}

#[derive(Debug, Deserialize)]
struct ObjectChange {
    #[serde(rename = "type")]
    change_type: String,
    #[serde(rename = "objectType")]
    object_type: Option<String>,
    #[serde(rename = "objectId")]
    object_id: Option<String>,
}

/// Object ids of `object_type` created by any transaction that called
/// `package::module::function`, newest first. Duplicates (an object created
/// then mutated across pages) are removed, first occurrence wins.
pub async fn query_created_objects(
    package: &str,
    module: &str,
    function: &str,
    object_type: &str,
) -> Result<Vec<String>> {
    let url = resolve_jsonrpc_url(None)?;
    let http = reqwest::Client::new();

    let mut object_ids: Vec<String> = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "suix_queryTransactionBlocks",
            "params": [
                {
                    "filter": {
                        "MoveFunction": {
                            "package": package,
                            "module": module,
                            "function": function,
                        }
                    },
                    "options": { "showObjectChanges": true }
                },
                cursor,
                TX_QUERY_PAGE_LIMIT,
                true  // descending: newest first
            ]
        });

        debug!(
            "Querying transaction blocks for {}::{}::{} (cursor: {:?})",
            package, module, function, cursor
        );

        let response = http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Indexer request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Indexer returned HTTP {}", status));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to decode indexer response: {}", e))?;

        if let Some(err) = body.error {
            return Err(anyhow!(
                "Indexer error {}: {}",
                err.code,
                err.message
            ));
        }

        let result = body
            .result
            .ok_or_else(|| anyhow!("Indexer response missing result"))?;

        for block in &result.data {
            let Some(changes) = &block.object_changes else {
                continue;
            };
            for change in changes {
                if change.change_type != "created" {
                    continue;
                }
                let (Some(obj_type), Some(obj_id)) = (&change.object_type, &change.object_id)
                else {
                    continue;
                };
                if obj_type == object_type && !object_ids.contains(obj_id) {
                    object_ids.push(obj_id.clone());
                }
            }
        }

        match (result.has_next_page.unwrap_or(false), result.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            (true, None) => {
                warn!("Indexer reported more pages but no cursor; stopping");
                break;
            }
            _ => break,
        }
    }

    debug!(
        "Found {} created {} object(s) via {}::{}",
        object_ids.len(),
        object_type,
        module,
        function
    );
    Ok(object_ids)
}
