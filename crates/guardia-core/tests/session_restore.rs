use guardia_core::browse::Browser;
use guardia_core::filters::{PersistedFilters, SortDirection, SortKey};
use guardia_core::prefs::{InstallHint, Mark, PreferenceStore};
use guardia_core::storage::JsonFileStore;

#[test]
fn test_marks_filters_and_hint_survive_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("storage.json");

    {
        let mut prefs = PreferenceStore::load(JsonFileStore::open(&path));
        prefs.toggle(Mark::Favourite, "ep-7");
        prefs.toggle(Mark::Listened, "ep-7");
        prefs.toggle(Mark::Listened, "ep-9");

        let mut browser = Browser::new();
        browser.set_query("setge");
        browser.toggle_tag("guerra");
        browser.set_sort(SortKey::Title, SortDirection::Ascending);
        browser.persisted().save(prefs.storage_mut());

        InstallHint::dismiss(prefs.storage_mut());
    }

    let prefs = PreferenceStore::load(JsonFileStore::open(&path));
    assert!(prefs.is_favourite("ep-7"));
    assert!(prefs.is_listened("ep-7"));
    assert!(prefs.is_listened("ep-9"));
    assert!(!prefs.is_favourite("ep-9"));
    assert!(InstallHint::is_dismissed(prefs.storage()));

    let browser = Browser::restore(PersistedFilters::load(prefs.storage()));
    assert_eq!(browser.filters().query, "setge");
    assert_eq!(browser.filters().tags, vec!["guerra"]);
    assert_eq!(browser.filters().sort_key, SortKey::Title);
    assert_eq!(browser.page(), 1);
}

#[test]
fn test_corrupt_storage_file_starts_clean() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("storage.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut prefs = PreferenceStore::load(JsonFileStore::open(&path));
    assert!(prefs.favourites().is_empty());
    assert!(!InstallHint::is_dismissed(prefs.storage()));

    // Writing replaces the corrupt file with a valid one
    prefs.toggle(Mark::Favourite, "ep-1");
    let reopened = PreferenceStore::load(JsonFileStore::open(&path));
    assert!(reopened.is_favourite("ep-1"));
}
