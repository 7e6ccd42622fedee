mod common;

use std::collections::BTreeSet;

use common::catalog;
use guardia_core::browse::Browser;
use guardia_core::catalog::Episode;
use guardia_core::filters::{FilterState, SortDirection, SortKey};
use guardia_core::pipeline::{self, PAGE_SIZE};
use guardia_core::prefs::{Mark, PreferenceStore, Preferences};
use guardia_core::storage::MemoryStore;

fn ids(items: &[&Episode]) -> Vec<String> {
    items.iter().map(|e| e.id.clone()).collect()
}

fn tagged() -> Vec<Episode> {
    let tag_sets: [&[&str]; 6] = [
        &["rei", "guerra"],
        &["rei"],
        &["guerra", "setge", "rei"],
        &[],
        &["setge"],
        &["guerra"],
    ];
    tag_sets
        .iter()
        .enumerate()
        .map(|(i, tags)| {
            let mut ep = common::episode(&format!("t{}", i));
            ep.tags = tags.iter().map(|t| t.to_string()).collect();
            ep
        })
        .collect()
}

#[test]
fn test_tag_filter_is_conjunctive() {
    let all = tagged();
    let prefs = Preferences::default();
    let selections: [&[&str]; 4] = [&[], &["rei"], &["rei", "guerra"], &["setge", "rei"]];

    for selection in selections {
        let filters = FilterState {
            tags: selection.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        let got: BTreeSet<String> = ids(&pipeline::filter_episodes(&all, &filters, &prefs))
            .into_iter()
            .collect();
        let expected: BTreeSet<String> = all
            .iter()
            .filter(|e| selection.iter().all(|t| e.tags.iter().any(|x| x == t)))
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(got, expected, "selection {:?}", selection);
    }
}

#[test]
fn test_only_and_hide_same_mark_yield_nothing() {
    let all = catalog(10);
    let mut prefs = PreferenceStore::load(MemoryStore::new());
    prefs.toggle(Mark::Favourite, "ep-001");
    prefs.toggle(Mark::Favourite, "ep-004");

    let filters = FilterState {
        favourites_only: true,
        ..Default::default()
    };
    assert_eq!(
        pipeline::filter_episodes(&all, &filters, prefs.preferences()).len(),
        2
    );

    let filters = FilterState {
        favourites_only: true,
        hide_favourites: true,
        ..Default::default()
    };
    assert!(pipeline::filter_episodes(&all, &filters, prefs.preferences()).is_empty());
}

#[test]
fn test_marks_combine_independently() {
    let all = catalog(6);
    let mut prefs = PreferenceStore::load(MemoryStore::new());
    prefs.toggle(Mark::Favourite, "ep-000");
    prefs.toggle(Mark::Favourite, "ep-001");
    prefs.toggle(Mark::Listened, "ep-001");
    prefs.toggle(Mark::Listened, "ep-002");

    let filters = FilterState {
        favourites_only: true,
        hide_listened: true,
        ..Default::default()
    };
    let got = pipeline::filter_episodes(&all, &filters, prefs.preferences());
    assert_eq!(ids(&got), vec!["ep-000"]);

    let filters = FilterState {
        hide_favourites: true,
        hide_listened: true,
        ..Default::default()
    };
    let got = pipeline::filter_episodes(&all, &filters, prefs.preferences());
    assert_eq!(ids(&got), vec!["ep-003", "ep-004", "ep-005"]);
}

#[test]
fn test_resorting_restores_previous_order() {
    let all = catalog(60);
    let mut items: Vec<&Episode> = all.iter().collect();

    pipeline::sort_episodes(&mut items, SortKey::Duration, SortDirection::Ascending, "ca");
    let by_duration = ids(&items);

    pipeline::sort_episodes(&mut items, SortKey::Title, SortDirection::Ascending, "ca");
    assert_ne!(ids(&items), by_duration);

    pipeline::sort_episodes(&mut items, SortKey::Duration, SortDirection::Ascending, "ca");
    assert_eq!(ids(&items), by_duration);
}

#[test]
fn test_fifty_matches_make_three_pages() {
    let all = catalog(50);
    let prefs = Preferences::default();
    let filters = FilterState {
        sort_key: SortKey::Title,
        sort_direction: SortDirection::Ascending,
        ..Default::default()
    };

    let p1 = pipeline::run(&all, &filters, &prefs, 1, "ca");
    assert_eq!(p1.total_items, 50);
    assert_eq!(p1.total_pages, 3);
    assert_eq!(p1.items.len(), PAGE_SIZE);

    let p3 = pipeline::run(&all, &filters, &prefs, 3, "ca");
    assert_eq!(p3.items.len(), 2);
    assert_eq!(p3.first_index(), 49);

    let mut seen: Vec<String> = Vec::new();
    for page in 1..=3 {
        seen.extend(ids(&pipeline::run(&all, &filters, &prefs, page, "ca").items));
    }
    let unique: BTreeSet<&String> = seen.iter().collect();
    assert_eq!(seen.len(), 50);
    assert_eq!(unique.len(), 50);
}

#[test]
fn test_browser_returns_to_first_page_on_filter_change() {
    let all = catalog(50);
    let prefs = Preferences::default();
    let mut browser = Browser::new();

    let total = browser.view(&all, &prefs, "ca").total_pages;
    browser.next_page(total);
    browser.next_page(total);
    assert_eq!(browser.view(&all, &prefs, "ca").items.len(), 2);

    browser.set_query("Episode ep-00");
    let page = browser.view(&all, &prefs, "ca");
    assert_eq!(page.page, 1);
    assert_eq!(page.total_items, 10);
    assert_eq!(page.total_pages, 1);
}
