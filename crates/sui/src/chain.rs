use anyhow::{Result, anyhow};
use std::env;
use std::str::FromStr;
use sui_rpc::Client as GrpcClient;
use sui_rpc::proto::sui::rpc::v2 as proto;
use sui_sdk_types as sui;
use tracing::debug;

/// Resolve the gRPC URL for the fullnode:
/// 1. explicit `rpc_url` argument,
/// 2. `SUI_RPC_URL` env var,
/// 3. chain from argument or `SUI_CHAIN` (default testnet), then
///    `SUI_RPC_URL_<CHAIN>` or the public `fullnode.<chain>.sui.io` endpoint.
pub fn resolve_rpc_url(rpc_url: Option<String>, chain_override: Option<String>) -> Result<String> {
    if let Some(url) = rpc_url {
        return Ok(url);
    }
    if let Ok(custom_url) = env::var("SUI_RPC_URL") {
        return Ok(custom_url);
    }

    let chain = chain_override
        .or_else(|| env::var("SUI_CHAIN").ok())
        .unwrap_or_else(|| "testnet".to_string())
        .to_lowercase();

    match chain.as_str() {
        "devnet" | "testnet" | "mainnet" => {}
        _ => {
            return Err(anyhow!(
                "Invalid chain '{}'. Must be one of: devnet, testnet, mainnet",
                chain
            ));
        }
    }

    let chain_specific_var = format!("SUI_RPC_URL_{}", chain.to_uppercase());
    if let Ok(chain_url) = env::var(&chain_specific_var) {
        return Ok(chain_url);
    }

    Ok(format!("https://fullnode.{}.sui.io:443", chain))
}

/// Resolve the JSON-RPC URL used for indexer queries the gRPC API does not
/// cover (transaction blocks filtered by Move function). Defaults to the
/// public fullnode for the active chain.
pub fn resolve_jsonrpc_url(chain_override: Option<String>) -> Result<String> {
    if let Ok(url) = env::var("SUI_JSONRPC_URL") {
        return Ok(url);
    }
    let chain = chain_override
        .or_else(|| env::var("SUI_CHAIN").ok())
        .unwrap_or_else(|| "testnet".to_string())
        .to_lowercase();
    match chain.as_str() {
        "devnet" | "testnet" | "mainnet" => Ok(format!("https://fullnode.{}.sui.io:443", chain)),
        _ => Err(anyhow!(
            "Invalid chain '{}'. Must be one of: devnet, testnet, mainnet",
            chain
        )),
    }
}

/// Derive a Sui address from a 32-byte ed25519 private key.
pub fn derive_address_from_secret_key(secret_key_bytes: &[u8; 32]) -> sui::Address {
    let signing_key = ed25519_dalek::SigningKey::from_bytes(secret_key_bytes);
    let verifying_key = signing_key.verifying_key();
    let mut pk_bytes = [0u8; 32];
    pk_bytes.copy_from_slice(verifying_key.as_bytes());

    let sui_public_key = sui::Ed25519PublicKey::new(pk_bytes);
    sui_public_key.derive_address()
}

/// Load the sender address and private key from `SUI_SECRET_KEY`.
///
/// Accepts a bech32 `suiprivkey...`, base64, or hex encoding; when
/// `SUI_ADDRESS` is also set the derived address must match it.
pub fn load_sender_from_env() -> Result<(sui::Address, sui_crypto::ed25519::Ed25519PrivateKey)> {
    use base64ct::Encoding;

    let raw = env::var("SUI_SECRET_KEY")?;
    let key_part = raw
        .split_once(':')
        .map(|(_, b)| b.to_string())
        .unwrap_or(raw);

    let arr = if key_part.starts_with("suiprivkey") {
        debug!("Decoding SUI_SECRET_KEY as bech32 suiprivkey");
        let (hrp, data, _variant) = bech32::decode(&key_part)?;
        if hrp != "suiprivkey" {
            return Err(anyhow!("invalid bech32 hrp"));
        }
        let bytes: Vec<u8> = bech32::FromBase32::from_base32(&data)?;
        if bytes.len() != 33 {
            return Err(anyhow!("bech32 payload must be 33 bytes (flag || key)"));
        }
        if bytes[0] != 0x00 {
            return Err(anyhow!("unsupported key scheme flag; only ed25519 supported"));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[1..]);
        arr
    } else {
        let mut bytes = match base64ct::Base64::decode_vec(&key_part) {
            Ok(v) => v,
            Err(_) => {
                debug!("SUI_SECRET_KEY not base64; trying hex");
                if let Some(hex_str) = key_part.strip_prefix("0x") {
                    hex::decode(hex_str)?
                } else {
                    hex::decode(&key_part)?
                }
            }
        };
        if !bytes.is_empty() && (bytes[0] == 0x00 || bytes.len() == 33) {
            bytes = bytes[1..].to_vec();
        }
        if bytes.len() < 32 {
            return Err(anyhow!("SUI_SECRET_KEY must contain at least 32 bytes"));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[..32]);
        arr
    };

    let derived_address = derive_address_from_secret_key(&arr);
    if let Ok(env_addr) = env::var("SUI_ADDRESS") {
        let env_addr = sui::Address::from_str(&env_addr)?;
        if env_addr != derived_address {
            return Err(anyhow!(
                "Address mismatch: SUI_ADDRESS does not match the address derived from SUI_SECRET_KEY"
            ));
        }
    }

    let sk = sui_crypto::ed25519::Ed25519PrivateKey::new(arr);
    Ok((derived_address, sk))
}

/// Get reference gas price from the network.
pub async fn get_reference_gas_price(client: &mut GrpcClient) -> Result<u64> {
    let mut ledger = client.ledger_client();
    let _resp = ledger
        .get_service_info(proto::GetServiceInfoRequest::default())
        .await?
        .into_inner();
    // ServiceInfo does not expose gas price yet; default to 1000.
    let price = 1_000u64;
    debug!("Using reference gas price: {}", price);
    Ok(price)
}
