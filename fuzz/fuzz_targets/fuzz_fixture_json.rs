#![no_main]

use formtree_engine::{Config, ConfigOverrides, Engine};
use formtree_harness::tree_from_json;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(root) = tree_from_json(source) else {
        return;
    };
    let engine = Engine::with_config(Config::from_overrides(
        &ConfigOverrides::export_only_target(false),
    ));
    let first = engine.export(&root);
    assert_eq!(first, engine.export(&root));
    let _ = engine.validate(&root);
});
