//! At-most-once digest computation under concurrent callers.

use std::sync::Arc;
use std::time::Duration;

use viewdigest::digestor::{DigestCache, Digestor};
use viewdigest::finder::{Details, LookupContext, MemoryResolver, Resolver, TemplateFinder};
use viewdigest::test_utils::{CountingFinder, ViewSet};

fn counting_finder(templates: Vec<(&'static str, &'static str)>) -> CountingFinder<LookupContext> {
    let resolver: Arc<dyn Resolver> = Arc::new(MemoryResolver::new(templates));
    let context = LookupContext::with_digest_cache(
        vec![resolver],
        Details::new(["html"], ["erb"]),
        Arc::new(DigestCache::new()),
    );
    CountingFinder::new(context).with_delay(Duration::from_millis(5))
}

#[test]
fn test_same_key_is_computed_once() {
    let finder = counting_finder(ViewSet::articles());
    let digestor = Digestor::new();

    let digests: Vec<String> = std::thread::scope(|scope| {
        let finder = &finder;
        let digestor = &digestor;
        let handles: Vec<_> = (0..16)
            .map(|_| {
                scope.spawn(move || digestor.digest("articles/show", "html", finder, &[]).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(digests.windows(2).all(|pair| pair[0] == pair[1]));
    // One tree build: the root, the comment partial, and the missing author
    assert_eq!(finder.lookups("articles/show"), 1);
    assert_eq!(finder.lookups("comments/comment"), 1);
    assert_eq!(finder.total_lookups(), 3);
}

#[test]
fn test_distinct_keys_are_each_computed_once() {
    let finder = counting_finder(ViewSet::articles());
    let digestor = Digestor::new().with_lock_stripes(4);
    let tokens = ["v1", "v2", "v3", "v4"];

    std::thread::scope(|scope| {
        for _ in 0..4 {
            for token in tokens {
                let finder = &finder;
                let digestor = &digestor;
                scope.spawn(move || {
                    digestor.digest("articles/index", "html", finder, &[token.to_string()]).unwrap()
                });
            }
        }
    });

    // One tree per distinct cache key
    assert_eq!(finder.lookups("articles/index"), tokens.len());
    let cache = finder.digest_cache();
    for token in tokens {
        assert!(cache.contains(&format!("articles/index.html.{token}")));
    }
}

#[test]
fn test_concurrent_digests_match_sequential_digest() {
    let sequential = {
        let finder = counting_finder(ViewSet::cycle());
        Digestor::new().digest("loops/_a", "html", &finder, &[]).unwrap()
    };

    let finder = counting_finder(ViewSet::cycle());
    let digestor = Digestor::new();
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert_eq!(digestor.digest("loops/_a", "html", &finder, &[]).unwrap(), sequential);
            });
        }
    });
}
