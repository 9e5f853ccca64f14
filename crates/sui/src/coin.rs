use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sui_rpc::Client as GrpcClient;
use sui_rpc::field::{FieldMask, FieldMaskUtil};
use sui_rpc::proto::sui::rpc::v2 as proto;
use sui_sdk_types as sui;
use tracing::debug;

const MAX_RETRIES: u32 = 6;
const RETRY_DELAY_MS: u64 = 500;

/// SUI gas coin type.
pub const SUI_COIN_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";

/// RAII-style guard for an exclusively held coin. Dropping the guard
/// releases the lock.
pub struct CoinLockGuard {
    manager: CoinLockManager,
    coin_id: sui::ObjectId,
}

impl CoinLockGuard {
    pub fn coin_id(&self) -> sui::ObjectId {
        self.coin_id
    }
}

impl Drop for CoinLockGuard {
    fn drop(&mut self) {
        self.manager.release_coin(self.coin_id);
    }
}

/// Prevents concurrent transactions from consuming the same coin object.
#[derive(Clone)]
pub struct CoinLockManager {
    locks: Arc<Mutex<HashMap<sui::ObjectId, Instant>>>,
    lock_timeout: Duration,
}

impl CoinLockManager {
    pub fn new(lock_timeout_seconds: u64) -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout: Duration::from_secs(lock_timeout_seconds),
        }
    }

    /// Attempts to lock a coin for exclusive use.
    pub fn try_lock_coin(&self, coin_id: sui::ObjectId) -> Option<CoinLockGuard> {
        let mut locks = self.locks.lock();

        // Clean up expired locks first
        let now = Instant::now();
        locks.retain(|_, lock_time| now.duration_since(*lock_time) < self.lock_timeout);

        use std::collections::hash_map::Entry;
        match locks.entry(coin_id) {
            Entry::Occupied(_) => None, // already locked
            Entry::Vacant(entry) => {
                entry.insert(now);
                Some(CoinLockGuard {
                    manager: self.clone(),
                    coin_id,
                })
            }
        }
    }

    fn release_coin(&self, coin_id: sui::ObjectId) {
        let mut locks = self.locks.lock();
        locks.remove(&coin_id);
    }
}

static COIN_LOCK_MANAGER: std::sync::OnceLock<CoinLockManager> = std::sync::OnceLock::new();

pub fn get_coin_lock_manager() -> &'static CoinLockManager {
    COIN_LOCK_MANAGER.get_or_init(|| CoinLockManager::new(60))
}

#[derive(Debug, Clone)]
pub struct CoinInfo {
    pub object_ref: sui::ObjectReference,
    pub balance: u64,
}

impl CoinInfo {
    pub fn object_id(&self) -> sui::ObjectId {
        *self.object_ref.object_id()
    }
}

/// Fetches a SUI coin with sufficient balance for gas and locks it.
pub async fn fetch_gas_coin(
    client: &mut GrpcClient,
    sender: sui::Address,
    min_balance: u64,
) -> Result<Option<(CoinInfo, CoinLockGuard)>> {
    let lock_manager = get_coin_lock_manager();

    for attempt in 1..=MAX_RETRIES {
        let coins = list_coins_of_type(client, sender, SUI_COIN_TYPE).await?;
        debug!(
            "Attempt {}/{}: Found {} SUI coins for address {}",
            attempt,
            MAX_RETRIES,
            coins.len(),
            sender
        );

        // Prefer smaller coins first so large coins stay available for rewards.
        let mut suitable: Vec<CoinInfo> = coins
            .into_iter()
            .filter(|c| c.balance >= min_balance)
            .collect();
        suitable.sort_by(|a, b| a.balance.cmp(&b.balance));

        for coin in suitable {
            if let Some(guard) = lock_manager.try_lock_coin(coin.object_id()) {
                debug!(
                    "Locked gas coin {} with balance {} MIST",
                    coin.object_id(),
                    coin.balance
                );
                return Ok(Some((coin, guard)));
            }
        }

        if attempt < MAX_RETRIES {
            let delay = RETRY_DELAY_MS * (attempt as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    debug!(
        "No unlocked coins found with balance >= {} MIST after {} attempts",
        min_balance, MAX_RETRIES
    );
    Ok(None)
}

/// Lists the sender's coins of the given type with their balances.
///
/// Used both for SUI gas selection and for LIFE fee-coin discovery; the
/// balance comes from the coin's BCS contents when present.
pub async fn list_coins_of_type(
    client: &mut GrpcClient,
    owner: sui::Address,
    coin_type: &str,
) -> Result<Vec<CoinInfo>> {
    let mut state = client.state_client();

    let mut request = proto::ListOwnedObjectsRequest::default();
    request.owner = Some(owner.to_string());
    request.page_size = Some(100);
    request.page_token = None;
    request.read_mask = Some(FieldMask::from_paths([
        "object_id",
        "version",
        "digest",
        "object_type",
        "contents",
    ]));
    request.object_type = Some(coin_type.to_string());

    let resp = state.list_owned_objects(request).await?.into_inner();

    let mut coins = Vec::new();
    for obj in resp.objects {
        if let (Some(id_str), Some(version), Some(digest_str)) =
            (&obj.object_id, obj.version, &obj.digest)
        {
            let object_id = sui::ObjectId::from_str(id_str)?;
            let digest = sui::ObjectDigest::from_str(digest_str)?;
            let object_ref = sui::ObjectReference::new(object_id, version, digest);

            let balance = if let Some(contents) = &obj.contents {
                if let Some(value) = &contents.value {
                    extract_coin_balance_from_contents(value)?
                } else {
                    fetch_coin_balance(client, &object_ref).await?
                }
            } else {
                fetch_coin_balance(client, &object_ref).await?
            };

            coins.push(CoinInfo {
                object_ref,
                balance,
            });
        }
    }

    Ok(coins)
}

/// Extracts coin balance from BCS contents.
/// Coin<T> layout: { id: UID (32 bytes), balance: Balance<T> { value: u64 } }.
fn extract_coin_balance_from_contents(contents: &[u8]) -> Result<u64> {
    if contents.len() >= 40 {
        let balance_bytes = &contents[32..40];
        let balance = u64::from_le_bytes(balance_bytes.try_into().unwrap_or([0; 8]));
        Ok(balance)
    } else {
        Ok(0)
    }
}

/// Balance of a specific coin object via GetObject, used when the listing
/// omitted contents.
async fn fetch_coin_balance(
    client: &mut GrpcClient,
    object_ref: &sui::ObjectReference,
) -> Result<u64> {
    let mut ledger = client.ledger_client();

    let mut request = proto::GetObjectRequest::default();
    request.object_id = Some(object_ref.object_id().to_string());
    request.version = Some(object_ref.version());
    request.read_mask = Some(FieldMask::from_paths(["contents"]));

    let resp = ledger.get_object(request).await?.into_inner();

    if let Some(obj) = resp.object {
        if let Some(contents) = obj.contents {
            if let Some(value) = contents.value {
                return extract_coin_balance_from_contents(&value);
            }
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_coin_lock_manager() {
        let manager = CoinLockManager::new(1);
        let coin_id = sui::ObjectId::from_str("0x123").unwrap();

        let guard1 = manager.try_lock_coin(coin_id);
        assert!(guard1.is_some());

        // Double locking fails while the guard is alive.
        let guard2 = manager.try_lock_coin(coin_id);
        assert!(guard2.is_none());

        drop(guard1);
        let guard3 = manager.try_lock_coin(coin_id);
        assert!(guard3.is_some());
    }

    #[test]
    fn test_coin_lock_timeout() {
        let manager = CoinLockManager::new(0);
        let coin_id = sui::ObjectId::from_str("0x123").unwrap();

        {
            let _guard = manager.try_lock_coin(coin_id);
        }

        std::thread::sleep(std::time::Duration::from_millis(10));

        // Expired lock gets cleaned up on the next attempt.
        let guard = manager.try_lock_coin(coin_id);
        assert!(guard.is_some());
    }

    #[test]
    fn test_extract_coin_balance() {
        let mut coin_data = vec![0u8; 40];
        coin_data[32..40].copy_from_slice(&1_000_000_000u64.to_le_bytes());

        let balance = extract_coin_balance_from_contents(&coin_data).unwrap();
        assert_eq!(balance, 1_000_000_000);

        let short_data = vec![0u8; 32];
        let balance = extract_coin_balance_from_contents(&short_data).unwrap();
        assert_eq!(balance, 0);
    }
}
