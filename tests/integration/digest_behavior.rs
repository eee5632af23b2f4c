//! Digest values over in-memory and on-disk views.

use std::sync::Arc;

use viewdigest::digestor::{DigestCache, Digestor, hexdigest};
use viewdigest::finder::{Details, LookupContext, MemoryResolver, Resolver, Template};
use viewdigest::test_utils::{CountingTracker, ViewFixture, ViewSet, init_test_logging};
use viewdigest::tracker::{RenderTracker, TrackerRegistry};

fn memory_context(resolver: Arc<MemoryResolver>) -> LookupContext {
    LookupContext::with_digest_cache(
        vec![resolver as Arc<dyn Resolver>],
        Details::new(["html"], ["erb"]),
        Arc::new(DigestCache::new()),
    )
}

fn fresh_context(templates: &[(&str, &str)]) -> LookupContext {
    memory_context(Arc::new(MemoryResolver::new(templates.iter().copied())))
}

#[test]
fn test_digest_is_deterministic_across_contexts() {
    init_test_logging(None);
    let templates = ViewSet::articles();
    let digestor = Digestor::new();

    let first = digestor.digest("articles/show", "html", &fresh_context(&templates), &[]).unwrap();
    let second = digestor.digest("articles/show", "html", &fresh_context(&templates), &[]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn test_changing_a_nested_partial_changes_the_digest() {
    let digestor = Digestor::new();
    let mut templates = ViewSet::articles();
    let before = digestor.digest("articles/show", "html", &fresh_context(&templates), &[]).unwrap();

    for entry in &mut templates {
        if entry.0 == "comments/_comment.html.erb" {
            entry.1 = "<p><%= comment.body %> (edited)</p>\n<%= render 'authors/author' %>\n";
        }
    }
    let after = digestor.digest("articles/show", "html", &fresh_context(&templates), &[]).unwrap();
    assert_ne!(before, after);

    // Unrelated pages keep their digest
    let index_before =
        digestor.digest("articles/index", "html", &fresh_context(&ViewSet::articles()), &[]).unwrap();
    let index_after = digestor.digest("articles/index", "html", &fresh_context(&templates), &[]).unwrap();
    assert_eq!(index_before, index_after);
}

#[test]
fn test_missing_dependency_contributes_empty_digest_positionally() {
    let digestor = Digestor::new();
    let ctx = fresh_context(&[
        ("pages/home.html.erb", "H<%= render 'pages/gone' %><%= render 'pages/footer' %>"),
        ("pages/_footer.html.erb", "F"),
    ]);
    let digest = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();

    let source = "H<%= render 'pages/gone' %><%= render 'pages/footer' %>";
    assert_eq!(digest, hexdigest(&format!("{source}--{}", hexdigest("F-"))));
}

#[test]
fn test_injected_dependencies_are_ordered_and_cached_separately() {
    let digestor = Digestor::new();
    let ctx = fresh_context(&[("pages/home.html.erb", "H")]);

    let plain = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();
    let v1 = digestor.digest("pages/home", "html", &ctx, &["v1".to_string()]).unwrap();
    let v2 = digestor.digest("pages/home", "html", &ctx, &["v2".to_string()]).unwrap();
    let both = digestor
        .digest("pages/home", "html", &ctx, &["v1".to_string(), "en".to_string()])
        .unwrap();
    let swapped = digestor
        .digest("pages/home", "html", &ctx, &["en".to_string(), "v1".to_string()])
        .unwrap();

    assert_eq!(plain, hexdigest("H-"));
    assert_eq!(v1, hexdigest("H-v1"));
    assert_eq!(both, hexdigest("H-v1-en"));
    assert_ne!(v1, v2);
    assert_ne!(both, swapped);

    let cache = viewdigest::finder::TemplateFinder::digest_cache(&ctx);
    assert!(cache.contains("pages/home.html"));
    assert!(cache.contains("pages/home.html.v1"));
    assert!(cache.contains("pages/home.html.v1.en"));
}

#[test]
fn test_mutual_recursion_terminates_with_marker() {
    let digestor = Digestor::new();
    let ctx = fresh_context(&ViewSet::cycle());
    let digest = digestor.digest("loops/_a", "html", &ctx, &[]).unwrap();

    let a = "A<%= render 'loops/b' %>";
    let b = "B<%= render 'loops/a' %>";
    let inner_a = hexdigest(&format!("{a}-false"));
    let b_digest = hexdigest(&format!("{b}-{inner_a}"));
    assert_eq!(digest, hexdigest(&format!("{a}-{b_digest}")));
}

#[test]
fn test_shared_partial_is_scanned_once_per_tree() {
    let counter = Arc::new(CountingTracker::new(Arc::new(RenderTracker::new())));
    let trackers = TrackerRegistry::new();
    trackers.register("erb", counter.clone());
    let digestor = Digestor::new().with_trackers(Arc::new(trackers));

    let ctx = fresh_context(&[
        ("pages/home.html.erb", "<%= render 'pages/left' %><%= render 'pages/right' %>"),
        ("pages/_left.html.erb", "<%= render 'shared/card' %>"),
        ("pages/_right.html.erb", "<%= render 'shared/card' %>"),
        ("shared/_card.html.erb", "card"),
    ]);
    digestor.digest("pages/home", "html", &ctx, &[]).unwrap();

    assert_eq!(counter.scans("shared/card"), 1);
    assert_eq!(counter.scans("pages/home"), 1);

    // A cache hit scans nothing
    digestor.digest("pages/home", "html", &ctx, &[]).unwrap();
    assert_eq!(counter.scans("pages/home"), 1);
}

#[test]
fn test_shared_partial_digest_is_reused_across_requests() {
    let resolver = Arc::new(MemoryResolver::new([
        ("pages/_left.html.erb", "L<%= render 'shared/card' %>"),
        ("pages/_right.html.erb", "R<%= render 'shared/card' %>"),
        ("shared/_card.html.erb", "card"),
    ]));
    let ctx = memory_context(resolver.clone());
    let digestor = Digestor::new();

    let left = digestor.digest("pages/_left", "html", &ctx, &[]).unwrap();
    assert_eq!(left, hexdigest(&format!("L<%= render 'shared/card' %>-{}", hexdigest("card-"))));
    let cache = viewdigest::finder::TemplateFinder::digest_cache(&ctx);
    let (hits_before, _) = cache.stats();

    // The memoized card digest wins over the new source until the cache is reset
    resolver.insert("shared/_card.html.erb", "card v2");
    let right = digestor.digest("pages/_right", "html", &ctx, &[]).unwrap();
    assert_eq!(right, hexdigest(&format!("R<%= render 'shared/card' %>-{}", hexdigest("card-"))));

    let (hits_after, _) = cache.stats();
    assert_eq!(hits_after - hits_before, 1);
    assert_eq!(cache.get("shared/card"), Some(hexdigest("card-")));
}

#[test]
fn test_cache_reset_picks_up_source_changes() {
    let fixture = ViewFixture::with_templates([("pages/home.html.erb", "v1")]).unwrap();
    let ctx = fixture.context(Details::new(["html"], ["erb"]));
    let digestor = Digestor::new();

    let before = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();
    fixture.write("pages/home.html.erb", "v2").unwrap();
    assert_eq!(digestor.digest("pages/home", "html", &ctx, &[]).unwrap(), before);

    viewdigest::finder::TemplateFinder::digest_cache(&ctx).clear();
    let after = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();
    assert_eq!(after, hexdigest("v2-"));
}

#[test]
fn test_dependency_map_of_article_page() {
    let ctx = fresh_context(&ViewSet::articles());
    let tree = Digestor::new().tree("articles/show", &ctx, false).unwrap();
    assert_eq!(
        tree.to_dependency_map(tree.root()),
        serde_json::json!({ "articles/show": [{ "comments/comment": ["authors/author"] }] })
    );
}

#[test]
fn test_crate_level_digest_uses_global_trackers() {
    let tracker = |name: &str, _: &Template, _: &[Arc<dyn Resolver>]| -> anyhow::Result<Vec<String>> {
        Ok(if name == "plain/home" { vec!["plain/dep".to_string()] } else { Vec::new() })
    };
    TrackerRegistry::global().register("txt", Arc::new(tracker));

    let resolver = Arc::new(MemoryResolver::new([
        ("plain/home.html.txt", "x"),
        ("plain/_dep.html.txt", "D"),
    ]));
    let ctx = LookupContext::with_digest_cache(
        vec![resolver as Arc<dyn Resolver>],
        Details::new(["html"], ["txt"]),
        Arc::new(DigestCache::new()),
    );

    let digest = viewdigest::digest("plain/home", "html", &ctx, &[]).unwrap();
    assert_eq!(digest, hexdigest(&format!("x-{}", hexdigest("D-"))));
}
