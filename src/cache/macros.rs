/// Read-through caching for an async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write, and returns it. A cache that cannot be
/// reached is logged and treated as a miss, so the computation still runs.
///
/// # Arguments
/// * `$cache`: a `Cache` (anything with `get_from_cache` and `set_in_background`)
/// * `$key`: the `CacheKey` to read and write
/// * `$ttl`: time-to-live for the written value, in seconds
/// * `$block`: future producing `AppResult<T>`
///
/// # Example
/// ```rust,ignore
/// let coordinates = cached!(cache, CacheKey::Geocode(location.to_string()), TTL, self.fetch(location));
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, computing value");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
