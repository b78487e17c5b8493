//! Shared behavioural checks for [`TtlStore`] backends.

use std::time::Duration;

use crate::{CacheError, TtlStore};

const TTL: Duration = Duration::from_secs(60);

/// Run the store conformance suite against a fresh store.
///
/// # Errors
///
/// Returns an error if the backend fails a command. Behavioural mismatches panic.
pub async fn run_store_conformance_tests(store: &dyn TtlStore) -> Result<(), CacheError> {
    test_get_missing(store).await?;
    test_set_and_get(store).await?;
    test_set_overwrites(store).await?;
    test_binary_values(store).await?;
    test_expire_missing(store).await?;
    test_get_with_touch(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn TtlStore) -> Result<(), CacheError> {
    let val = store.get("conformance:missing").await?;
    assert!(val.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_set_and_get(store: &dyn TtlStore) -> Result<(), CacheError> {
    store.set("conformance:set-get", b"hello", TTL).await?;
    let val = store.get("conformance:set-get").await?;
    assert_eq!(val.as_deref(), Some(&b"hello"[..]));
    Ok(())
}

async fn test_set_overwrites(store: &dyn TtlStore) -> Result<(), CacheError> {
    store.set("conformance:overwrite", b"v1", TTL).await?;
    store.set("conformance:overwrite", b"v2", TTL).await?;
    let val = store.get("conformance:overwrite").await?;
    assert_eq!(val.as_deref(), Some(&b"v2"[..]), "set should replace the value");
    Ok(())
}

async fn test_binary_values(store: &dyn TtlStore) -> Result<(), CacheError> {
    let bytes = [0u8, 0xff, 0xd8, 0x00, 0x7f];
    store.set("conformance:binary", &bytes, TTL).await?;
    let val = store.get("conformance:binary").await?;
    assert_eq!(val.as_deref(), Some(&bytes[..]), "binary values must round-trip");
    Ok(())
}

async fn test_expire_missing(store: &dyn TtlStore) -> Result<(), CacheError> {
    let applied = store.expire("conformance:expire-missing", TTL).await?;
    assert!(!applied, "expire on missing key should return false");
    Ok(())
}

async fn test_get_with_touch(store: &dyn TtlStore) -> Result<(), CacheError> {
    assert!(store.get_with_touch("conformance:touch", TTL).await?.is_none());
    store.set("conformance:touch", b"t", TTL).await?;
    let val = store.get_with_touch("conformance:touch", TTL).await?;
    assert_eq!(val.as_deref(), Some(&b"t"[..]));
    assert!(store.expire("conformance:touch", TTL).await?);
    Ok(())
}
