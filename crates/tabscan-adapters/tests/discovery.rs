use std::collections::HashSet;
use std::sync::Arc;

use tabscan_adapters::testing::{FakeDesktop, FakeNode, FakeWindow};
use tabscan_core::{CancelToken, Config, TabEngine};

fn engine(desktop: &Arc<FakeDesktop>) -> TabEngine {
    TabEngine::new(desktop.clone(), Config::default())
}

fn chromium_window(handle: u64, pid: u32, titles: &[&str]) -> FakeWindow {
    let tabs: Vec<FakeNode> = titles.iter().map(|title| FakeNode::tab(title)).collect();
    let strip = FakeNode::container("TabStrip").with_children(tabs);
    let root = FakeNode::pane("browser").with_children(vec![strip]);
    FakeWindow::new(handle, pid, "chrome.exe", "Google Chrome").with_root(root)
}

fn minimized_chromium_window(handle: u64, pid: u32, titles: &[&str]) -> FakeWindow {
    let tabs: Vec<FakeNode> = titles.iter().map(|title| FakeNode::tab(title)).collect();
    let strip = FakeNode::container("TabStrip")
        .blocks_descendant_queries()
        .with_children(tabs);
    let root = FakeNode::pane("browser").with_children(vec![strip]);
    FakeWindow::new(handle, pid, "chrome.exe", "Google Chrome")
        .minimized()
        .with_root(root)
}

#[tokio::test]
async fn discovers_tabs_from_an_allow_listed_window() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(
        1,
        100,
        &["Rust - Google Chrome", "Docs - Google Chrome"],
    ));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 2);
    let titles: HashSet<String> = tabs.iter().map(|tab| tab.title.clone()).collect();
    assert!(titles.contains("Rust - Google Chrome"));
    assert!(titles.contains("Docs - Google Chrome"));
}

#[tokio::test]
async fn windows_of_unknown_processes_are_ignored() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(
        FakeWindow::new(1, 100, "notepad.exe", "notes.txt")
            .with_root(FakeNode::pane("root").with_children(vec![FakeNode::tab("Anything")])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert!(tabs.is_empty());
}

#[tokio::test]
async fn windows_with_empty_titles_are_ignored() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "")
            .with_root(FakeNode::pane("root").with_children(vec![FakeNode::tab("Hidden")])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert!(tabs.is_empty());
}

#[tokio::test]
async fn a_process_exiting_mid_enumeration_is_skipped_silently() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(1, 100, &["Survivor - Google Chrome"]));
    desktop.add_window(
        chromium_window(2, 200, &["Ghost - Google Chrome"]).with_exited_process(),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].title, "Survivor - Google Chrome");
}

#[tokio::test]
async fn one_process_with_several_windows_yields_one_entry_per_window() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(1, 100, &["Main - Google Chrome"]));
    desktop.add_window(chromium_window(2, 100, &["Incognito - Google Chrome"]));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 2);
    let windows: HashSet<u64> = tabs.iter().map(|tab| tab.window.0).collect();
    assert_eq!(windows.len(), 2);
}

#[tokio::test]
async fn n_windows_of_m_tabs_yield_exactly_n_by_m_distinct_tabs() {
    let desktop = Arc::new(FakeDesktop::new());
    for window_index in 0u64..3 {
        let titles: Vec<String> = (0..4)
            .map(|tab_index| format!("Site {window_index}-{tab_index} - Google Chrome"))
            .collect();
        let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
        desktop.add_window(chromium_window(
            window_index + 1,
            100 * (window_index as u32 + 1),
            &titles,
        ));
    }

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 12);
    let distinct: HashSet<(u32, u64, u32)> = tabs
        .iter()
        .map(|tab| (tab.id.pid, tab.window.0, tab.index))
        .collect();
    assert_eq!(distinct.len(), 12);
}

#[tokio::test]
async fn placeholder_tabs_are_filtered_out() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(
        1,
        100,
        &["New Tab", "about:blank", "", "Real Site - Google Chrome"],
    ));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].title, "Real Site - Google Chrome");
    assert_eq!(tabs[0].url_or_title, "Real Site");
}

#[tokio::test]
async fn every_returned_tab_has_a_validated_title() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(
        1,
        100,
        &["New Tab", "A - Google Chrome", "B - Google Chrome", "about:blank - Google Chrome"],
    ));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    for tab in &tabs {
        assert!(!tab.title.is_empty());
        assert_ne!(tab.title, "New Tab");
        assert!(!tab.title.contains("about:blank"));
    }
    assert_eq!(tabs.len(), 2);
}

#[tokio::test]
async fn selected_tab_is_reported_active() {
    let desktop = Arc::new(FakeDesktop::new());
    let strip = FakeNode::container("TabStrip").with_children(vec![
        FakeNode::tab("Background - Google Chrome"),
        FakeNode::tab("Foreground - Google Chrome").with_selected(true),
    ]);
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "Google Chrome")
            .with_root(FakeNode::pane("browser").with_children(vec![strip])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    let foreground = tabs
        .iter()
        .find(|tab| tab.title.starts_with("Foreground"))
        .expect("foreground tab discovered");
    assert!(foreground.active);
    let background = tabs
        .iter()
        .find(|tab| tab.title.starts_with("Background"))
        .expect("background tab discovered");
    assert!(!background.active);
}

#[tokio::test]
async fn placement_failure_falls_back_to_the_normal_walker() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(
        chromium_window(1, 100, &["Reachable - Google Chrome"]).with_placement_failure(),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert!(!tabs[0].minimized);
}

#[tokio::test]
async fn minimized_window_tabs_are_found_through_the_container_walk() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(minimized_chromium_window(
        1,
        100,
        &["One - Google Chrome", "Two - Google Chrome", "Three - Google Chrome"],
    ));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 3);
    for tab in &tabs {
        assert!(tab.minimized);
        assert_eq!(tab.index, 0);
    }
}

#[tokio::test]
async fn minimized_walk_reaches_tabs_under_nested_panes() {
    let desktop = Arc::new(FakeDesktop::new());
    let inner = FakeNode::pane("scroll area")
        .with_children(vec![FakeNode::tab("Deep - Google Chrome")]);
    let strip = FakeNode::container("TabStrip")
        .blocks_descendant_queries()
        .with_children(vec![inner]);
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "Google Chrome")
            .minimized()
            .with_root(FakeNode::pane("browser").with_children(vec![strip])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].title, "Deep - Google Chrome");
}

#[tokio::test]
async fn tabs_reachable_through_two_containers_are_deduplicated_by_identity() {
    let desktop = Arc::new(FakeDesktop::new());
    // Two distinct node objects stand for the same logical tab element.
    let strip_a = FakeNode::container("TabStrip")
        .blocks_descendant_queries()
        .with_children(vec![FakeNode::tab("Shared - Google Chrome").with_identity(77)]);
    let strip_b = FakeNode::container("TabStripRegionView")
        .blocks_descendant_queries()
        .with_children(vec![FakeNode::tab("Shared - Google Chrome").with_identity(77)]);
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "Google Chrome")
            .minimized()
            .with_root(FakeNode::pane("browser").with_children(vec![strip_a, strip_b])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
}

#[tokio::test]
async fn a_stale_window_root_does_not_prevent_other_windows() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "Google Chrome")
            .with_root(FakeNode::pane("gone").stale()),
    );
    desktop.add_window(chromium_window(2, 200, &["Alive - Google Chrome"]));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].title, "Alive - Google Chrome");
}

#[tokio::test]
async fn a_stale_tab_node_is_skipped_without_aborting_its_window() {
    let desktop = Arc::new(FakeDesktop::new());
    let strip = FakeNode::container("TabStrip").with_children(vec![
        FakeNode::tab("First - Google Chrome"),
        FakeNode::tab("Broken - Google Chrome").stale(),
        FakeNode::tab("Third - Google Chrome"),
    ]);
    desktop.add_window(
        FakeWindow::new(1, 100, "chrome.exe", "Google Chrome")
            .with_root(FakeNode::pane("browser").with_children(vec![strip])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 2);
}

#[tokio::test]
async fn large_tab_strips_are_partitioned_without_losing_positions() {
    let desktop = Arc::new(FakeDesktop::new());
    let titles: Vec<String> = (0..100)
        .map(|index| format!("Site {index} - Google Chrome"))
        .collect();
    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    desktop.add_window(chromium_window(1, 100, &title_refs));

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 100);
    let indexes: HashSet<u32> = tabs.iter().map(|tab| tab.index).collect();
    assert_eq!(indexes.len(), 100);
    assert!(indexes.contains(&0));
    assert!(indexes.contains(&99));
}

#[tokio::test]
async fn cancellation_before_start_returns_an_empty_result() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(1, 100, &["Anything - Google Chrome"]));
    let cancel = CancelToken::new();
    cancel.cancel();

    let tabs = engine(&desktop).discover(&cancel).await;

    assert!(tabs.is_empty());
}

#[tokio::test]
async fn cancellation_during_processing_returns_an_empty_result() {
    let desktop = Arc::new(FakeDesktop::new());
    desktop.add_window(chromium_window(1, 100, &["A - Google Chrome"]));
    desktop.add_window(chromium_window(2, 200, &["B - Google Chrome"]));
    let cancel = CancelToken::new();
    desktop.cancel_on_window_root(&cancel);

    let tabs = engine(&desktop).discover(&cancel).await;

    assert!(tabs.is_empty());
}

#[tokio::test]
async fn firefox_windows_are_walked_with_their_own_classes() {
    let desktop = Arc::new(FakeDesktop::new());
    let strip = FakeNode::container("tabbrowser-tabs").with_children(vec![
        FakeNode::tab("Wiki - Mozilla Firefox").with_class("tab").invoke_only(),
    ]);
    desktop.add_window(
        FakeWindow::new(1, 300, "firefox.exe", "Mozilla Firefox")
            .with_root(FakeNode::pane("browser").with_children(vec![strip])),
    );

    let tabs = engine(&desktop).discover(&CancelToken::new()).await;

    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].url_or_title, "Wiki");
    assert!(!tabs[0].active);
}
