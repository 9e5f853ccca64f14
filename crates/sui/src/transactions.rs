//! Transaction assembly and execution against the quest contracts.
//!
//! Every user action funnels through [`execute_move_call`]: resolve object
//! inputs (shared vs owned), pick and lock a gas coin, estimate the gas
//! budget with a dry run, sign, execute, check effects, and wait for the
//! digest to be indexed. Transient failures (object version conflicts,
//! service unavailability) are retried with exponential backoff; contract
//! rejections are surfaced verbatim.

use anyhow::{Context, Result, anyhow};
use std::str::FromStr;
use sui_crypto::SuiSigner;
use sui_rpc::field::{FieldMask, FieldMaskUtil};
use sui_rpc::proto::sui::rpc::v2 as proto;
use sui_rpc::proto::sui::rpc::v2::simulate_transaction_request;
use sui_sdk_types as sui;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use crate::chain::get_reference_gas_price;
use crate::coin::fetch_gas_coin;
use crate::constants::{MAX_GAS_BUDGET_MIST, MIN_GAS_BUDGET_MIST, SIMULATION_GAS_BUDGET_MIST};
use crate::error::QuestInterfaceError;
use crate::state::SharedSuiState;

const MAX_RETRIES: u32 = 3;

/// Move `0x1::string::String` serializes as its byte vector.
#[derive(serde::Serialize)]
pub(crate) struct MoveString {
    pub bytes: Vec<u8>,
}

impl MoveString {
    pub fn new(s: &str) -> Self {
        Self {
            bytes: s.as_bytes().to_vec(),
        }
    }
}

/// The shared system clock object, as a ready-to-add transaction input.
/// Only entry points that read the clock take it; adding it unconditionally
/// would lock a shared object the transaction never touches.
pub(crate) fn clock_input() -> sui_transaction_builder::unresolved::Input {
    let clock_id = sui::ObjectId::from_str(
        "0x0000000000000000000000000000000000000000000000000000000000000006",
    )
    .expect("Valid clock object ID");
    sui_transaction_builder::unresolved::Input::shared(clock_id, 1, false)
}

/// Parse an object id string, tolerating a missing 0x prefix.
pub(crate) fn get_object_id(object_str: &str) -> Result<sui::ObjectId> {
    let object_id = if object_str.starts_with("0x") {
        object_str.to_string()
    } else {
        format!("0x{}", object_str)
    };
    Ok(sui::ObjectId::from_str(&object_id)?)
}

/// Serialize a built transaction into the BCS form the proto API carries.
fn transaction_to_proto(tx: &sui::Transaction) -> Result<proto::Transaction> {
    let mut payload = proto::Bcs::default();
    payload.value = Some(
        bcs::to_bytes(tx)
            .context("Failed to serialize transaction")?
            .into(),
    );
    let mut message = proto::Transaction::default();
    message.bcs = Some(payload);
    Ok(message)
}

fn signature_to_proto(sig: &sui::UserSignature) -> proto::UserSignature {
    let mut payload = proto::Bcs::default();
    payload.value = Some(sig.to_bytes().into());
    let mut message = proto::UserSignature::default();
    message.bcs = Some(payload);
    message
}

/// Get an object reference plus its initial shared version, when shared.
async fn get_object_details(
    object_id: sui::ObjectId,
) -> Result<(sui::ObjectReference, Option<u64>)> {
    let mut client = SharedSuiState::get_instance().get_sui_client();
    let mut ledger = client.ledger_client();

    let mut request = proto::GetObjectRequest::default();
    request.object_id = Some(object_id.to_string());
    request.version = None;
    request.read_mask = Some(FieldMask::from_paths([
        "object_id",
        "version",
        "digest",
        "owner",
    ]));

    let response = ledger
        .get_object(request)
        .await
        .context("Failed to get object")?
        .into_inner();

    if let Some(object) = response.object {
        let id = object
            .object_id
            .context("Missing object_id")?
            .parse()
            .context("Failed to parse object_id")?;
        let version = object.version.context("Missing version")?;
        let digest = object
            .digest
            .context("Missing digest")?
            .parse()
            .context("Failed to parse digest")?;

        let obj_ref = sui::ObjectReference::new(id, version, digest);

        // For shared objects owner.address is empty and owner.version holds
        // the initial_shared_version.
        let initial_shared_version = object.owner.and_then(|owner| {
            if owner.address.is_none() || owner.address == Some("".to_string()) {
                owner.version
            } else {
                None
            }
        });
        Ok((obj_ref, initial_shared_version))
    } else {
        Err(QuestInterfaceError::ObjectNotFound(object_id.to_string()).into())
    }
}

/// Check transaction effects for execution errors, cleaning up MoveAbort
/// noise so the user sees the abort code and function instead of a debug
/// dump.
fn check_transaction_effects(
    tx_resp: &proto::ExecuteTransactionResponse,
    operation: &str,
) -> Result<()> {
    let tx_digest = tx_resp
        .transaction
        .as_ref()
        .and_then(|t| t.digest.as_ref())
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if let Some(ref transaction) = tx_resp.transaction {
        if let Some(ref effects) = transaction.effects {
            debug!("{} effects status: {:?}", operation, effects.status);
            if let Some(ref status) = effects.status {
                if let Some(ref error_msg) = status.error {
                    let error_str = format!("{:?}", error_msg);
                    let clean_error = cleanup_move_abort(&error_str);

                    error!(
                        "{} transaction failed: {} (tx: {})",
                        operation, clean_error, tx_digest
                    );

                    return Err(QuestInterfaceError::TransactionError {
                        message: format!("{} transaction failed: {}", operation, clean_error),
                        tx_digest: Some(tx_digest.clone()),
                    }
                    .into());
                }
            }
        }
    }

    let tx_successful = tx_resp
        .transaction
        .as_ref()
        .and_then(|t| t.effects.as_ref())
        .and_then(|e| e.status.as_ref())
        .map(|s| s.error.is_none())
        .unwrap_or(false);

    if !tx_successful {
        error!("{} transaction failed despite being executed", operation);
        return Err(anyhow!(
            "{} transaction failed despite being executed",
            operation
        ));
    }

    Ok(())
}

fn cleanup_move_abort(error_str: &str) -> String {
    if !error_str.contains("MoveAbort") {
        return error_str.to_string();
    }
    let mut parts = vec![];
    if let Some(start) = error_str.find("abort_code: Some(") {
        let code_start = start + "abort_code: Some(".len();
        if let Some(end) = error_str[code_start..].find(')') {
            parts.push(format!("abort_code: {}", &error_str[code_start..code_start + end]));
        }
    }
    if let Some(start) = error_str.find("function_name: Some(\"") {
        let name_start = start + "function_name: Some(\"".len();
        if let Some(end) = error_str[name_start..].find('"') {
            parts.push(format!("function: {}", &error_str[name_start..name_start + end]));
        }
    }
    if parts.is_empty() {
        "Move execution aborted".to_string()
    } else {
        format!("MoveAbort: {}", parts.join(", "))
    }
}

/// Poll GetTransaction until the digest is visible in the ledger, so that a
/// refresh fired right after a mutation sees the new state.
async fn wait_for_transaction(tx_digest: &str, max_wait_ms: Option<u64>) -> Result<()> {
    let timeout = max_wait_ms.unwrap_or(5000);
    let start = std::time::Instant::now();
    let mut client = SharedSuiState::get_instance().get_sui_client();
    let mut ledger = client.ledger_client();

    debug!(
        "Waiting for transaction {} to be available in ledger (max {}ms)",
        tx_digest, timeout
    );

    loop {
        if start.elapsed().as_millis() > timeout as u128 {
            return Err(anyhow!(
                "Timeout waiting for transaction {} after {}ms",
                tx_digest,
                timeout
            ));
        }

        let mut req = proto::GetTransactionRequest::default();
        req.digest = Some(tx_digest.to_string());
        req.read_mask = Some(FieldMask::from_paths(["digest"]));

        match ledger.get_transaction(req).await {
            Ok(_) => {
                debug!(
                    "Transaction {} is now available in ledger (took {}ms)",
                    tx_digest,
                    start.elapsed().as_millis()
                );
                return Ok(());
            }
            Err(e) => {
                debug!("Transaction {} not yet available: {}", tx_digest, e);
            }
        }

        sleep(Duration::from_millis(200)).await;
    }
}

/// Build, simulate, sign and execute one Move call.
///
/// `object_ids` are resolved to transaction inputs in order (shared objects
/// get a mutable shared input, owned objects an owned input) and handed to
/// `build_args`; the closure returns the final positional argument list for
/// the entry point and may add further inputs (the clock, pure values) or
/// coin operations through the builder.
/// `extra_gas_funds` raises the minimum balance the selected gas coin must
/// hold, for transactions that split payment coins off the gas coin.
pub(crate) async fn execute_move_call<F>(
    package_id: sui::Address,
    module_name: &str,
    function_name: &str,
    object_ids: Vec<String>,
    extra_gas_funds: u64,
    build_args: F,
) -> Result<String>
where
    F: Fn(
        &mut sui_transaction_builder::TransactionBuilder,
        Vec<sui_sdk_types::Argument>, // resolved object args, in input order
    ) -> Vec<sui_sdk_types::Argument>,
{
    let shared_state = SharedSuiState::get_instance();
    let (sender, sk) = shared_state.require_wallet().map(|(a, k)| (a, k.clone()))?;

    debug!(
        "Building {}::{} call with {} object inputs",
        module_name,
        function_name,
        object_ids.len()
    );

    let mut object_addresses = Vec::new();
    for object_id_str in &object_ids {
        let object_id = get_object_id(object_id_str)
            .context(format!("Failed to parse object ID for '{}'", object_id_str))?;
        object_addresses.push(object_id);
    }

    let mut gas_budget = SIMULATION_GAS_BUDGET_MIST;
    let mut retry_count = 0;

    loop {
        let mut client = shared_state.get_sui_client();

        let mut tb = sui_transaction_builder::TransactionBuilder::new();
        tb.set_sender(sender);
        tb.set_gas_budget(gas_budget);

        let gas_price = get_reference_gas_price(&mut client).await?;
        tb.set_gas_price(gas_price);

        // Gas coin is locked until this iteration's guard drops.
        let min_gas_balance = MAX_GAS_BUDGET_MIST.saturating_add(extra_gas_funds);
        let (gas_coin, _gas_guard) =
            match fetch_gas_coin(&mut client, sender, min_gas_balance).await? {
                Some((coin, guard)) => (coin, guard),
                None => {
                    error!(
                        "No available coins with balance >= {} MIST for gas and payment",
                        min_gas_balance
                    );
                    return Err(anyhow!(
                        "No available SUI coin with at least {} MIST for gas and payment",
                        min_gas_balance
                    ));
                }
            };

        let gas_input = sui_transaction_builder::unresolved::Input::owned(
            gas_coin.object_id(),
            gas_coin.object_ref.version(),
            *gas_coin.object_ref.digest(),
        );
        tb.add_gas_objects(vec![gas_input]);
        debug!(
            "Gas coin selected: id={} ver={} balance={}",
            gas_coin.object_id(),
            gas_coin.object_ref.version(),
            gas_coin.balance
        );

        // Fetch object versions fresh on every attempt; retries exist
        // precisely because these go stale.
        let mut object_args = Vec::new();
        for (i, &object_id) in object_addresses.iter().enumerate() {
            let (object_ref, initial_shared_version) = get_object_details(object_id)
                .await
                .context(format!("Failed to get object details for {}", object_ids[i]))?;

            let object_input = if let Some(shared_version) = initial_shared_version {
                debug!(
                    "Shared object input {} initial_shared_version={}",
                    object_ids[i], shared_version
                );
                sui_transaction_builder::unresolved::Input::shared(object_id, shared_version, true)
            } else {
                debug!("Owned object input {}", object_ids[i]);
                sui_transaction_builder::unresolved::Input::owned(
                    *object_ref.object_id(),
                    object_ref.version(),
                    *object_ref.digest(),
                )
            };
            object_args.push(tb.input(object_input));
        }

        let args = build_args(&mut tb, object_args.clone());

        let func = sui_transaction_builder::Function::new(
            package_id,
            module_name
                .parse()
                .map_err(|e| anyhow!("Failed to parse module name '{}': {}", module_name, e))?,
            function_name
                .parse()
                .map_err(|e| anyhow!("Failed to parse function name '{}': {}", function_name, e))?,
            vec![],
        );
        tb.move_call(func, args);

        // Dry run once to size the gas budget; later attempts reuse it.
        if retry_count == 0 {
            gas_budget = estimate_gas_budget(&mut client, &tb, function_name)
                .await
                .unwrap_or(MAX_GAS_BUDGET_MIST);
            tb.set_gas_budget(gas_budget);
        }

        let tx = tb.finish()?;
        let sig = sk.sign_transaction(&tx)?;

        debug!(
            "Executing {} with gas budget {} MIST (attempt {}/{})",
            function_name,
            gas_budget,
            retry_count + 1,
            MAX_RETRIES + 1
        );

        let mut exec = client.execution_client();
        let mut req = proto::ExecuteTransactionRequest::default();
        req.transaction = Some(transaction_to_proto(&tx)?);
        req.signatures = vec![signature_to_proto(&sig)];
        req.read_mask = Some(FieldMask::from_paths(["transaction"]));

        let tx_start = std::time::Instant::now();
        let exec_result = exec.execute_transaction(req).await;
        let tx_elapsed_ms = tx_start.elapsed().as_millis();

        let resp = match exec_result {
            Ok(r) => r,
            Err(e) => {
                let clean_error = cleanup_transport_error(&e.to_string());

                let should_retry = retry_count < MAX_RETRIES
                    && (clean_error.contains("version conflict")
                        || clean_error.contains("not available for consumption")
                        || clean_error.contains("temporarily unavailable"));

                if should_retry {
                    retry_count += 1;
                    let delay_ms = 1000 * (2_u64.pow(retry_count - 1));
                    info!(
                        "{} failed transiently on attempt {}/{}; retrying after {}ms: {}",
                        function_name,
                        retry_count,
                        MAX_RETRIES + 1,
                        delay_ms,
                        clean_error
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                    continue;
                }

                error!("{} transaction failed: {}", function_name, clean_error);
                return Err(QuestInterfaceError::TransactionError {
                    message: clean_error,
                    tx_digest: None,
                }
                .into());
            }
        };
        let tx_resp = resp.into_inner();

        check_transaction_effects(&tx_resp, function_name)?;

        let tx_digest = tx_resp
            .transaction
            .as_ref()
            .and_then(|t| t.digest.as_ref())
            .context("Failed to get transaction digest")?
            .to_string();

        if retry_count > 0 {
            info!(
                "{} succeeded after {} retries: {} (took {}ms)",
                function_name, retry_count, tx_digest, tx_elapsed_ms
            );
        } else {
            debug!(
                "{} executed successfully: {} (took {}ms)",
                function_name, tx_digest, tx_elapsed_ms
            );
        }

        if let Err(e) = wait_for_transaction(&tx_digest, None).await {
            warn!(
                "Failed to wait for {} to be available: {}",
                function_name, e
            );
            // The transaction was accepted; indexing lag is the caller's problem.
        }

        return Ok(tx_digest);
    }
}

/// Simulate the transaction to size the gas budget: 2x the measured gas,
/// clamped to the configured bounds.
async fn estimate_gas_budget(
    client: &mut sui_rpc::Client,
    tb: &sui_transaction_builder::TransactionBuilder,
    function_name: &str,
) -> Result<u64> {
    let temp_tx = tb.clone().finish()?;

    let mut execution = client.execution_client();
    let mut simulate_req = proto::SimulateTransactionRequest::default();
    simulate_req.transaction = Some(transaction_to_proto(&temp_tx)?);
    simulate_req.read_mask = Some(FieldMask::from_paths([
        "transaction.effects.status",
        "transaction.effects.gas_used",
    ]));
    simulate_req.checks = Some(simulate_transaction_request::TransactionChecks::Enabled as i32);
    simulate_req.do_gas_selection = Some(false);

    let sim_result = execution
        .simulate_transaction(simulate_req)
        .await
        .map_err(|e| anyhow!("Dry run failed for {}: {}", function_name, e))?
        .into_inner();

    let effects = sim_result
        .transaction
        .as_ref()
        .and_then(|t| t.effects.as_ref())
        .ok_or_else(|| anyhow!("Dry run returned no effects"))?;

    if let Some(status) = &effects.status {
        if let Some(error) = &status.error {
            return Err(anyhow!("Dry run failed for {}: {:?}", function_name, error));
        }
    }

    let gas_summary = effects
        .gas_used
        .as_ref()
        .ok_or_else(|| anyhow!("Dry run returned no gas summary"))?;

    let computation_cost = gas_summary.computation_cost.unwrap_or(0);
    let storage_cost = gas_summary.storage_cost.unwrap_or(0);
    let storage_rebate = gas_summary.storage_rebate.unwrap_or(0);
    let non_refundable = gas_summary.non_refundable_storage_fee.unwrap_or(0);

    let total_gas_used =
        (computation_cost + storage_cost + non_refundable).saturating_sub(storage_rebate);
    let estimated = (total_gas_used as f64 * 2.0) as u64;
    let budget = estimated.clamp(MIN_GAS_BUDGET_MIST, MAX_GAS_BUDGET_MIST);

    debug!(
        "Gas estimation for {}: used {} MIST, budget {} MIST",
        function_name, total_gas_used, budget
    );
    Ok(budget)
}

fn cleanup_transport_error(error_str: &str) -> String {
    if error_str.contains("grpc-status header missing") {
        if error_str.contains("HTTP status code 503") {
            return "Service temporarily unavailable (HTTP 503)".to_string();
        }
        if error_str.contains("HTTP status code 400") {
            return "Transaction rejected by server (HTTP 400): likely invalid transaction parameters or object state".to_string();
        }
    }
    if error_str.contains("is not available for consumption") {
        return "Object version conflict - transaction inputs are outdated".to_string();
    }
    // Strip the binary details array the transport appends.
    if let Some(idx) = error_str.find(", details: [") {
        return error_str[..idx].to_string();
    }
    error_str.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_move_abort() {
        let raw = "MoveAbort { abort_code: Some(7), function_name: Some(\"join_event\") }";
        let cleaned = cleanup_move_abort(raw);
        assert_eq!(cleaned, "MoveAbort: abort_code: 7, function: join_event");

        assert_eq!(cleanup_move_abort("MoveAbort"), "Move execution aborted");
        assert_eq!(cleanup_move_abort("some other error"), "some other error");
    }

    #[test]
    fn test_cleanup_transport_error() {
        assert_eq!(
            cleanup_transport_error("status: grpc-status header missing, HTTP status code 503"),
            "Service temporarily unavailable (HTTP 503)"
        );
        assert_eq!(
            cleanup_transport_error("Object ID 0x1 is not available for consumption"),
            "Object version conflict - transaction inputs are outdated"
        );
        assert_eq!(
            cleanup_transport_error("plain failure, details: [1, 2, 3]"),
            "plain failure"
        );
    }

    #[test]
    fn test_get_object_id_prefix() {
        assert!(get_object_id("0x6").is_ok());
        assert!(get_object_id("6").is_ok());
        assert_eq!(
            get_object_id("6").unwrap(),
            get_object_id("0x6").unwrap()
        );
    }
}
