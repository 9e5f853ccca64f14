//! Raw object fetches over gRPC, decoded to JSON.

use anyhow::{Result, anyhow};
use serde_json::Value;
use sui_rpc::field::{FieldMask, FieldMaskUtil};
use sui_rpc::proto::sui::rpc::v2::{BatchGetObjectsRequest, GetObjectRequest, get_object_result};
use tracing::debug;

use crate::parse::proto_to_json;
use crate::state::SharedSuiState;

const BATCH_SIZE: usize = 50;

fn with_prefix(object_id: &str) -> String {
    if object_id.starts_with("0x") {
        object_id.to_string()
    } else {
        format!("0x{}", object_id)
    }
}

/// Fetch one object's content as JSON. `Ok(None)` when the node does not
/// know the object.
pub async fn fetch_object(object_id: &str) -> Result<Option<Value>> {
    let mut client = SharedSuiState::get_instance().get_sui_client();
    let formatted_id = with_prefix(object_id);
    debug!("Fetching object {}", formatted_id);

    let mut request = GetObjectRequest::default();
    request.object_id = Some(formatted_id.clone());
    request.version = None;
    request.read_mask = Some(FieldMask::from_paths(["object_id", "json"]));

    let response = client.ledger_client().get_object(request).await;
    match response {
        Ok(resp) => {
            let object = resp.into_inner().object;
            if let Some(proto_object) = object {
                if let Some(json_value) = proto_object.json.as_deref() {
                    return Ok(Some(proto_to_json(json_value)));
                }
            }
            Ok(None)
        }
        Err(e) => {
            if e.to_string().contains("not found") || e.to_string().contains("NotFound") {
                debug!("Object {} not found", formatted_id);
                Ok(None)
            } else {
                Err(anyhow!("Failed to fetch object {}: {}", object_id, e))
            }
        }
    }
}

/// Fetch many objects in batches of 50, returning `(object_id, json)` pairs.
/// Objects the node cannot return are skipped.
pub async fn fetch_objects_batch(object_ids: &[String]) -> Result<Vec<(String, Value)>> {
    let mut client = SharedSuiState::get_instance().get_sui_client();
    let mut results = Vec::with_capacity(object_ids.len());

    for chunk in object_ids.chunks(BATCH_SIZE) {
        debug!("Batch fetching {} objects", chunk.len());

        let requests: Vec<GetObjectRequest> = chunk
            .iter()
            .map(|id| {
                let mut request = GetObjectRequest::default();
                request.object_id = Some(with_prefix(id));
                request.read_mask = None; // batch-level mask applies
                request
            })
            .collect();

        let mut batch_request = BatchGetObjectsRequest::default();
        batch_request.requests = requests;
        batch_request.read_mask = Some(FieldMask::from_paths(["object_id", "json"]));

        let batch_response = client
            .ledger_client()
            .batch_get_objects(batch_request)
            .await
            .map_err(|e| anyhow!("Failed to batch fetch objects: {}", e))?;

        for get_result in batch_response.into_inner().objects {
            let Some(get_object_result::Result::Object(object)) = get_result.result else {
                continue;
            };
            let (Some(id), Some(json_value)) = (object.object_id.clone(), object.json.as_deref())
            else {
                continue;
            };
            results.push((id, proto_to_json(json_value)));
        }
    }

    Ok(results)
}
