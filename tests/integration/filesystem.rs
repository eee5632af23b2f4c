//! Lookup over view directories on disk.

use std::sync::Arc;

use viewdigest::digestor::{DigestCache, Digestor, hexdigest};
use viewdigest::finder::{Details, FileSystemResolver, LookupContext, Resolver, TemplateFinder};
use viewdigest::test_utils::ViewFixture;

#[test]
fn test_format_specific_template_wins_over_generic() {
    let fixture = ViewFixture::with_templates([
        ("pages/home.erb", "generic"),
        ("pages/home.html.erb", "html"),
        ("pages/home.json.erb", "json"),
    ])
    .unwrap();
    let digestor = Digestor::new();

    let html = fixture.context(Details::new(["html"], ["erb"]));
    assert_eq!(digestor.digest("pages/home", "html", &html, &[]).unwrap(), hexdigest("html-"));

    let json = fixture.context(Details::new(["json"], ["erb"]));
    assert_eq!(digestor.digest("pages/home", "json", &json, &[]).unwrap(), hexdigest("json-"));

    let xml = fixture.context(Details::new(["xml"], ["erb"]));
    assert_eq!(digestor.digest("pages/home", "xml", &xml, &[]).unwrap(), hexdigest("generic-"));
}

#[test]
fn test_unaccepted_handler_is_missing() {
    let fixture = ViewFixture::with_templates([("pages/home.html.haml", "%h1")]).unwrap();
    let ctx = fixture.context(Details::new(["html"], ["erb"]));
    assert_eq!(Digestor::new().digest("pages/home", "html", &ctx, &[]).unwrap(), "");
}

#[test]
fn test_earlier_view_path_shadows_later() {
    let app = ViewFixture::with_templates([("shared/_nav.html.erb", "app nav")]).unwrap();
    let engine = ViewFixture::with_templates([
        ("shared/_nav.html.erb", "engine nav"),
        ("pages/home.html.erb", "<%= render 'shared/nav' %>"),
    ])
    .unwrap();

    let ctx = LookupContext::with_digest_cache(
        vec![app.resolver(), engine.resolver()],
        Details::new(["html"], ["erb"]),
        Arc::new(DigestCache::new()),
    );
    let digest = Digestor::new().digest("pages/home", "html", &ctx, &[]).unwrap();
    let expected = hexdigest(&format!("<%= render 'shared/nav' %>-{}", hexdigest("app nav-")));
    assert_eq!(digest, expected);
}

#[test]
fn test_wildcard_dependency_expands_to_directory() {
    let fixture = ViewFixture::with_templates([
        ("pages/home.html.erb", "<%# Template Dependency: widgets/* %>"),
        ("widgets/_clock.html.erb", "clock"),
        ("widgets/_weather.html.erb", "weather"),
        ("widgets/sidebar.html.erb", "sidebar"),
        ("other/_unrelated.html.erb", "x"),
    ])
    .unwrap();
    let ctx = fixture.context(Details::new(["html"], ["erb"]));
    let tree = Digestor::new().tree("pages/home", &ctx, false).unwrap();
    assert_eq!(
        tree.direct_dependencies(),
        vec!["widgets/_clock", "widgets/_weather", "widgets/sidebar"]
    );
    // Nested dependencies are looked up as partials, so the non-partial is missing
    let missing: Vec<&str> = tree
        .children(tree.root())
        .iter()
        .map(|&child| tree.node(child))
        .filter(|node| node.is_missing())
        .map(|node| node.name.as_str())
        .collect();
    assert_eq!(missing, vec!["widgets/sidebar"]);
}

#[test]
fn test_lookup_memo_does_not_affect_digests() {
    let fixture = ViewFixture::with_templates([("pages/home.html.erb", "one")]).unwrap();
    let ctx = fixture.context(Details::new(["html"], ["erb"]));

    // Warm the lookup memo with the old source
    assert_eq!(ctx.find_all("pages/home", &[], false, &[]).unwrap()[0].source, "one");
    fixture.write("pages/home.html.erb", "two").unwrap();

    let digest = Digestor::new().digest("pages/home", "html", &ctx, &[]).unwrap();
    assert_eq!(digest, hexdigest("two-"));
    assert_eq!(ctx.find_all("pages/home", &[], false, &[]).unwrap()[0].source, "one");

    ctx.clear_lookup_cache();
    assert_eq!(ctx.find_all("pages/home", &[], false, &[]).unwrap()[0].source, "two");
}

#[test]
fn test_deleted_partial_becomes_missing_after_reset() {
    let fixture = ViewFixture::with_templates([
        ("pages/home.html.erb", "<%= render 'pages/banner' %>"),
        ("pages/_banner.html.erb", "banner"),
    ])
    .unwrap();
    let ctx = fixture.context(Details::new(["html"], ["erb"]));
    let digestor = Digestor::new();
    let before = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();

    fixture.remove("pages/_banner.html.erb").unwrap();
    ctx.digest_cache().clear();
    let after = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();

    assert_ne!(before, after);
    assert_eq!(after, hexdigest("<%= render 'pages/banner' %>-"));
}

#[test]
fn test_parent_directory_references_resolve_as_missing() {
    let outside =
        ViewFixture::with_templates([("views/pages/home.html.erb", "<%= render '../secret' %>")])
            .unwrap();
    outside.write("_secret.html.erb", "TOP SECRET").unwrap();

    let resolver: Arc<dyn Resolver> =
        Arc::new(FileSystemResolver::new(outside.root().join("views")));
    let ctx = LookupContext::with_digest_cache(
        vec![resolver],
        Details::new(["html"], ["erb"]),
        Arc::new(DigestCache::new()),
    );
    let digestor = Digestor::new();
    let tree = digestor.tree("pages/home", &ctx, false).unwrap();
    let child = tree.node(tree.children(tree.root())[0]);
    assert!(child.is_missing());

    let digest = digestor.digest("pages/home", "html", &ctx, &[]).unwrap();
    assert_eq!(digest, hexdigest("<%= render '../secret' %>-"));
}

