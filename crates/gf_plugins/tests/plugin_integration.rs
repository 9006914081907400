use gf_domain::{ContentStream, Encoding, Item};
use gf_plugins::error::{BoxError, PluginErrorKind};
use gf_plugins::manifest::{PluginManifest, TransformRegistry};
use gf_plugins::options::PluginOptions;
use gf_plugins::plugin_trait::{Finalize, Transform};
use gf_plugins::{PluginDescriptor, create_plugin};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

fn noop(_item: &mut Item, _encoding: Encoding) -> Result<(), BoxError> {
    Ok(())
}

/// Prepends a banner and counts how many items it saw.
struct Banner {
    text: String,
    seen: usize,
}

impl Transform for Banner {
    fn transform(&mut self, item: &mut Item, encoding: Encoding) -> Result<(), BoxError> {
        let body = item.contents_string(encoding)?;
        item.set_contents_string(&format!("{}\n{}", self.text, body), encoding)?;
        self.seen += 1;
        Ok(())
    }
}

struct Report {
    flushed: Arc<AtomicBool>,
}

impl Finalize for Report {
    fn finalize(&mut self) -> Result<(), BoxError> {
        self.flushed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_lorem_ipsum_gipsum() {
    let mut plugin = create_plugin(
        "gulp-test",
        |item, encoding| {
            let text = item.contents_string(encoding)?;
            item.set_contents_string(&format!("{} gipsum", text), encoding)?;
            Ok(())
        },
        PluginOptions::default(),
    )
    .unwrap();

    let item = plugin
        .offer(Item::new("lorem.txt").with_buffer("Lorem ipsum"), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.contents_string(Encoding::Utf8).unwrap(), "Lorem ipsum gipsum");
}

#[test]
fn test_home_made_short_name_with_empty_buffer() {
    let mut plugin = create_plugin("g", noop, PluginOptions::default().with_home_made(true)).unwrap();
    let item = plugin
        .offer(Item::new("empty.txt").with_buffer(""), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.buffer(), Some(&b""[..]));
}

#[test]
fn test_contents_replaced_by_plugin() {
    let mut plugin = create_plugin(
        "gulp-test",
        |item, _encoding| {
            item.contents = "changed from plugin".into();
            Ok(())
        },
        PluginOptions::default().with_buffer_support(true),
    )
    .unwrap();
    let item = plugin
        .offer(Item::new("a.txt").with_buffer("Lorem ipsum"), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.buffer(), Some("changed from plugin".as_bytes()));
    plugin.finish().unwrap();
}

#[test]
fn test_stream_not_supported_message() {
    let mut plugin = create_plugin("gulp-test", noop, PluginOptions::default()).unwrap();
    let err = plugin
        .offer(
            Item::new("a.txt").with_contents(ContentStream::from_bytes("x")),
            Encoding::Utf8,
        )
        .unwrap_err();
    assert!(err.to_string().contains("stream content not supported"));
}

#[test]
fn test_transform_may_rename_item() {
    let mut plugin = create_plugin(
        "gulp-markup",
        |item, encoding| {
            let text = item.contents_string(encoding)?;
            item.set_contents_string(&format!("<p>{}</p>", text.trim()), encoding)?;
            item.set_extension("html");
            Ok(())
        },
        PluginOptions::default(),
    )
    .unwrap();
    let item = plugin
        .offer(Item::new("docs/readme.md").with_buffer("hello\n"), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.path, std::path::PathBuf::from("docs/readme.html"));
    assert_eq!(item.buffer(), Some(&b"<p>hello</p>"[..]));
}

#[test]
fn test_struct_transform_and_finalizer() {
    let flushed = Arc::new(AtomicBool::new(false));
    let mut plugin = PluginDescriptor::new("gulp-banner")
        .transform_with(Banner {
            text: "/* banner */".to_string(),
            seen: 0,
        })
        .finalizer_with(Report {
            flushed: flushed.clone(),
        })
        .build()
        .unwrap();

    let item = plugin
        .offer(Item::new("app.js").with_buffer("run();"), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.buffer(), Some("/* banner */\nrun();".as_bytes()));

    assert!(!flushed.load(Ordering::SeqCst));
    plugin.finish().unwrap();
    assert!(flushed.load(Ordering::SeqCst));
}

#[test]
fn test_processors_are_independent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let make = |name: &str| {
        let counter = counter.clone();
        create_plugin(
            name,
            move |_item, _encoding| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            PluginOptions::default(),
        )
        .unwrap()
    };

    let mut first = make("gulp-one");
    let mut second = make("gulp-two");
    first.finish().unwrap();

    // Closing one processor leaves the other accepting.
    assert!(second.offer(Item::new("a.txt").with_buffer("x"), Encoding::Utf8).is_ok());
    assert!(first.offer(Item::new("a.txt").with_buffer("x"), Encoding::Utf8).is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_manifest_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plugin.toml");
    std::fs::write(
        &path,
        r#"
plugin_name = "gulp-upper"
plugin_fn = "upper"

[options]
stream_support = true
show_stack = true
"#,
    )
    .unwrap();

    let mut registry = TransformRegistry::new();
    registry.register_transform("upper", |item, encoding| {
        let text = item.contents_string(encoding)?;
        item.set_contents_string(&text.to_uppercase(), encoding)?;
        Ok(())
    });

    let mut plugin = PluginManifest::from_file(&path)
        .unwrap()
        .resolve(&registry)
        .build()
        .unwrap();
    assert!(plugin.options().stream_support);
    assert!(plugin.options().show_stack);

    let item = plugin
        .offer(Item::new("a.txt").with_buffer("shout"), Encoding::Utf8)
        .unwrap();
    assert_eq!(item.buffer(), Some(&b"SHOUT"[..]));
}

#[test]
fn test_manifest_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = PluginManifest::from_file(temp_dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err.kind(), PluginErrorKind::InvalidManifest(_)));
}

#[test]
fn test_show_properties_toggles_path() {
    let quiet = PluginOptions::default().with_show_properties(false);
    let mut plugin = create_plugin("gulp-test", noop, quiet.with_buffer_support(false)).unwrap();
    let err = plugin
        .offer(Item::new("src/a.md").with_buffer("x"), Encoding::Utf8)
        .unwrap_err();
    assert_eq!(err.to_string(), "gulp-test: buffer content not supported");
    assert_eq!(err.item_path(), Some(std::path::Path::new("src/a.md")));
}

fn blank_name() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec![' ', '\t', '\n']), 0..6)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_prefixed_names_build(suffix in "[a-z0-9-]{0,16}") {
        let name = format!("gulp-{}", suffix);
        prop_assert!(create_plugin(&name, noop, PluginOptions::default()).is_ok());
    }

    #[test]
    fn prop_unprefixed_names_need_home_made(name in "[a-fh-z][a-z0-9-]{0,16}") {
        let err = create_plugin(&name, noop, PluginOptions::default()).unwrap_err();
        prop_assert!(
            matches!(err.kind(), PluginErrorKind::MissingPrefix { .. }),
            "unexpected kind: {:?}",
            err.kind()
        );
        let home_made = PluginOptions::default().with_home_made(true);
        prop_assert!(create_plugin(&name, noop, home_made).is_ok());
    }

    #[test]
    fn prop_blank_names_rejected(name in blank_name()) {
        let err = create_plugin(&name, noop, PluginOptions::default()).unwrap_err();
        prop_assert!(matches!(err.kind(), PluginErrorKind::InvalidName));
    }

    #[test]
    fn prop_missing_transform_rejected(suffix in "[a-z]{0,8}", home_made in any::<bool>()) {
        let options = PluginOptions::default().with_home_made(home_made);
        let err = PluginDescriptor::new(format!("gulp-{}", suffix))
            .options(options)
            .build()
            .unwrap_err();
        prop_assert!(matches!(err.kind(), PluginErrorKind::InvalidTransform));
    }

    #[test]
    fn prop_null_items_unchanged(path in "[a-z]{1,8}\\.[a-z]{2,3}", stream in any::<bool>(), buffer in any::<bool>()) {
        let options = PluginOptions::default()
            .with_stream_support(stream)
            .with_buffer_support(buffer);
        let mut plugin = create_plugin(
            "gulp-mutate",
            |item, _encoding| {
                item.set_path("mutated");
                Ok(())
            },
            options,
        )
        .unwrap();
        let item = plugin.offer(Item::new(path.clone()), Encoding::Utf8).unwrap();
        prop_assert!(item.is_null());
        prop_assert_eq!(item.path, std::path::PathBuf::from(path));
    }

    #[test]
    fn prop_buffer_gate_blocks_transform(body in ".{0,32}") {
        let sentinel = Arc::new(AtomicBool::new(false));
        let touched = sentinel.clone();
        let mut plugin = create_plugin(
            "gulp-sentinel",
            move |_item, _encoding| {
                touched.store(true, Ordering::SeqCst);
                Ok(())
            },
            PluginOptions::default().with_buffer_support(false),
        )
        .unwrap();
        let err = plugin
            .offer(Item::new("a.txt").with_buffer(body), Encoding::Utf8)
            .unwrap_err();
        prop_assert!(matches!(err.kind(), PluginErrorKind::UnsupportedContentForm(_)));
        prop_assert!(!sentinel.load(Ordering::SeqCst));
    }
}
