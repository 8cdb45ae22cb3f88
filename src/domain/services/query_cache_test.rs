use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::anyhow;
use anyhow::Result;

use super::QueryCache;

#[tokio::test]
async fn it_fetches_once_then_serves_from_cache() -> Result<()> {
    let cache = QueryCache::default();
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        let res = cache
            .get_or_fetch("providerKey/fal-ai", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                return Ok(true);
            })
            .await?;
        assert!(res);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    return Ok(());
}

#[tokio::test]
async fn it_does_not_cache_failures() -> Result<()> {
    let cache = QueryCache::default();

    let res = cache
        .get_or_fetch::<bool, _, _>("providerKey/openai", || async {
            return Err(anyhow!("boom"));
        })
        .await;
    assert!(res.is_err());
    assert!(cache.get::<bool>("providerKey/openai").is_none());
    return Ok(());
}

#[test]
fn it_invalidates_by_whole_segments() -> Result<()> {
    let cache = QueryCache::default();
    cache.set("workflowRuns/fal-ai", &vec![1, 2])?;
    cache.set("workflowRuns/fal-ai-extra", &vec![3])?;
    cache.set("workflowRuns", &vec![4])?;
    cache.set("providerKey/fal-ai", &true)?;

    cache.invalidate("workflowRuns/fal-ai");
    assert!(cache.get::<Vec<i32>>("workflowRuns/fal-ai").is_none());
    assert_eq!(cache.get::<Vec<i32>>("workflowRuns/fal-ai-extra"), Some(vec![3]));

    cache.invalidate("workflowRuns");
    assert!(cache.get::<Vec<i32>>("workflowRuns/fal-ai-extra").is_none());
    assert!(cache.get::<Vec<i32>>("workflowRuns").is_none());
    assert_eq!(cache.get::<bool>("providerKey/fal-ai"), Some(true));
    return Ok(());
}

#[test]
fn it_clears_everything() -> Result<()> {
    let cache = QueryCache::default();
    let key = QueryCache::key(&["chatMessages", "openai"]);
    cache.set(&key, &"hi")?;
    cache.set("providerKey/openai", &true)?;
    assert_eq!(cache.get::<String>(&key), Some("hi".to_string()));

    cache.clear();
    assert!(cache.get::<String>(&key).is_none());
    assert!(cache.get::<bool>("providerKey/openai").is_none());
    return Ok(());
}
