//! Devnet/testnet faucet requests, for topping up a wallet before buying
//! LIFE or paying gas.

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::env;
use sui_sdk_types as sui;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct FaucetResponse {
    #[allow(dead_code)]
    status: Option<String>,
    error: Option<String>,
    task: Option<String>,
    #[serde(rename = "txDigests")]
    tx_digests: Option<Vec<String>>,
    coins_sent: Option<Vec<CoinsSent>>,
}

#[derive(Debug, Deserialize)]
struct CoinsSent {
    #[allow(dead_code)]
    amount: u64,
    #[allow(dead_code)]
    id: String,
    #[serde(rename = "transferTxDigest")]
    transfer_tx_digest: String,
}

/// Request SUI from the public faucet of `chain` ("devnet" or "testnet").
/// Returns the transfer transaction digest when the faucet reports one.
pub async fn request_tokens_from_faucet(chain: &str, address: &str) -> Result<String> {
    let chain = chain.to_lowercase();
    match chain.as_str() {
        "devnet" | "testnet" => {}
        "mainnet" => return Err(anyhow!("Faucet is not available for mainnet")),
        _ => {
            return Err(anyhow!(
                "Unknown chain: {}. Expected 'devnet' or 'testnet'",
                chain
            ));
        }
    }

    let address = address
        .parse::<sui::Address>()
        .map_err(|e| anyhow!("Invalid address format: {}", e))?;

    let env_var = format!("SUI_FAUCET_{}", chain.to_uppercase());
    let url = env::var(&env_var)
        .unwrap_or_else(|_| format!("https://faucet.{}.sui.io/v2/gas", chain));

    info!(
        "Requesting tokens from {} faucet at {} for address {}",
        chain, url, address
    );

    let json_body = json!({
        "FixedAmountRequest": {
            "recipient": address.to_string()
        }
    });

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(reqwest::header::USER_AGENT, "questboard")
        .json(&json_body)
        .send()
        .await?;

    match resp.status() {
        StatusCode::ACCEPTED | StatusCode::CREATED | StatusCode::OK => {
            let faucet_resp: FaucetResponse = resp.json().await?;
            debug!("Faucet response: {:?}", faucet_resp);

            if let Some(err) = faucet_resp.error {
                return Err(anyhow!("Faucet request was unsuccessful: {}", err));
            }
            let tx_digest = faucet_resp
                .coins_sent
                .and_then(|coins| coins.first().map(|c| c.transfer_tx_digest.clone()))
                .or_else(|| {
                    faucet_resp
                        .tx_digests
                        .and_then(|digests| digests.first().cloned())
                })
                .or(faucet_resp.task)
                .unwrap_or_else(|| "unknown".to_string());

            info!(
                "Faucet request successful for {}. Transaction: {}",
                address, tx_digest
            );
            Ok(tx_digest)
        }
        StatusCode::BAD_REQUEST => {
            let faucet_resp: FaucetResponse = resp.json().await?;
            match faucet_resp.error {
                Some(err) => Err(anyhow!("Faucet request was unsuccessful: {}", err)),
                None => Err(anyhow!("Faucet request failed with bad request")),
            }
        }
        StatusCode::TOO_MANY_REQUESTS => Err(anyhow!(
            "Faucet received too many requests from this IP address. Please try again later."
        )),
        StatusCode::SERVICE_UNAVAILABLE => Err(anyhow!(
            "Faucet service is currently overloaded or unavailable. Please try again later."
        )),
        status_code => Err(anyhow!("Faucet request was unsuccessful: {}", status_code)),
    }
}
