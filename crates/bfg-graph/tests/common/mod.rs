//! Shared fixtures for the integration and property tests.

#![allow(dead_code)]

use bfg_content::{ContentComparator, ContentRef, MemoryContentStore};
use bfg_graph::{Platform, PlatformGraph};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Fallback chains modelled on a real layout-test platform catalog.
///
/// Shorter chains come first so shrinking favours small graphs.
pub const CATALOG: &[&[&str]] = &[
    &["platform/gtk", "platform/glib", "platform/wk2"],
    &["platform/gtk4", "platform/gtk", "platform/glib", "platform/wk2"],
    &["platform/gtk-wayland", "platform/gtk", "platform/glib", "platform/wk2"],
    &["platform/wpe", "platform/glib", "platform/wk2"],
    &[
        "platform/wincairo-win10-wk2",
        "platform/wincairo-win10",
        "platform/wincairo-wk2",
        "platform/wincairo",
        "platform/wk2",
    ],
    &["platform/mac-sonoma-wk1", "platform/mac-sonoma", "platform/mac-wk1", "platform/mac"],
    &[
        "platform/mac-sonoma-wk2",
        "platform/mac-sonoma",
        "platform/mac-wk2",
        "platform/mac",
        "platform/wk2",
    ],
    &["platform/mac-ventura-wk1", "platform/mac-ventura", "platform/mac-wk1", "platform/mac"],
    &[
        "platform/mac-ventura-wk2",
        "platform/mac-ventura",
        "platform/mac-wk2",
        "platform/mac",
        "platform/wk2",
    ],
    &[
        "platform/mac-monterey-wk1",
        "platform/mac-monterey",
        "platform/mac-ventura-wk1",
        "platform/mac-ventura",
        "platform/mac-wk1",
        "platform/mac",
    ],
    &[
        "platform/mac-monterey-wk2",
        "platform/mac-monterey",
        "platform/mac-ventura-wk2",
        "platform/mac-ventura",
        "platform/mac-wk2",
        "platform/mac",
        "platform/wk2",
    ],
    &[
        "platform/ios-simulator-wk2",
        "platform/ios-simulator",
        "platform/ios-wk2",
        "platform/ios",
        "platform/wk2",
    ],
    &[
        "platform/ipad-simulator-wk2",
        "platform/ipad-simulator",
        "platform/ios-simulator-wk2",
        "platform/ios-simulator",
        "platform/ipad-wk2",
        "platform/ipad",
        "platform/ios-wk2",
        "platform/ios",
        "platform/wk2",
    ],
];

/// Contents handed out to assigned platforms. Two share a size so that
/// comparisons have to digest.
pub const CONTENTS: &[&str] = &["A", "B", "CC", "DDD"];

/// Handle under which a platform's baseline is stored.
pub fn handle(platform: &str) -> ContentRef {
    let dir = if platform.is_empty() { "." } else { platform };
    ContentRef::from(format!("{}/test-expected.txt", dir))
}

/// Every platform named by `chains`, plus the default platform.
pub fn platforms_of(chains: &[&[&str]]) -> Vec<String> {
    let mut all: BTreeSet<String> = BTreeSet::from([String::new()]);
    for chain in chains {
        all.extend(chain.iter().map(|p| p.to_string()));
    }
    all.into_iter().collect()
}

/// Build a graph over `chains`, storing each assigned platform's content
/// under its own handle so equal contents never share a handle.
pub fn build(chains: &[&[&str]], assigned: &[(&str, &str)]) -> PlatformGraph<MemoryContentStore> {
    let mut store = MemoryContentStore::new();
    for (platform, content) in assigned {
        store.insert(handle(platform), *content);
    }
    let mut graph = PlatformGraph::with_chains(
        ContentComparator::new(Arc::new(store)),
        chains.iter().map(|c| c.iter().copied()),
    );
    for (platform, _) in assigned {
        graph
            .set_baseline(&Platform::from(*platform), handle(platform))
            .expect("fixture platform is registered");
    }
    graph
}

/// Content each head resolves to, read back as text.
pub fn resolved_text(graph: &PlatformGraph<MemoryContentStore>) -> Vec<(Platform, Option<String>)> {
    use bfg_content::ContentStore;

    let store = graph.comparator().store();
    graph
        .get_all_baselines(true, false)
        .expect("resolution succeeds")
        .into_iter()
        .map(|(platform, reference)| {
            let text = reference.map(|r| {
                String::from_utf8(store.read_all(&r).expect("content exists")).expect("utf-8")
            });
            (platform, text)
        })
        .collect()
}
