//! Reload behaviour of the console against an on-disk journal

use cli_console::{load_journal, Console, ConsoleConfig, Reply};
use services_storage::KeyValueStore;
use std::path::Path;

fn config_for(path: &Path) -> ConsoleConfig {
    ConsoleConfig {
        store_path: Some(path.to_path_buf()),
        ..ConsoleConfig::default()
    }
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.json");

    {
        let mut console = Console::start(&config_for(&path)).unwrap();
        console.execute("new").unwrap();
        console.execute("set local x = 1").unwrap();
        console.execute("rename new.lua \"my tool.lua\"").unwrap();
        console.execute("click 1").unwrap();
    }

    let console = Console::start(&config_for(&path)).unwrap();
    let session = console.session();
    assert_eq!(session.tab_names(), vec!["main.lua", "my tool.lua"]);
    assert_eq!(session.current().unwrap(), "main.lua");
    assert_eq!(
        session.document("my tool.lua").unwrap().value(),
        "local x = 1"
    );
}

#[test]
fn test_file_holds_only_live_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.json");

    let mut console = Console::start(&config_for(&path)).unwrap();
    console.execute("new").unwrap();
    console.execute("close new.lua").unwrap();

    let store = load_journal(&path).unwrap();
    let mut keys = store.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["lastTab", "tab:main.lua", "tabList"]);
    assert_eq!(
        store.get("tabList").unwrap().as_deref(),
        Some(r#"["main.lua"]"#)
    );
}

#[test]
fn test_closing_everything_then_restart_recreates_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.json");

    {
        let mut console = Console::start(&config_for(&path)).unwrap();
        assert!(matches!(console.execute("xclick 1").unwrap(), Reply::Output(_)));
        assert!(console.session().is_empty());
        let store = load_journal(&path).unwrap();
        assert_eq!(store.get("tabList").unwrap().as_deref(), Some("[]"));
    }

    let console = Console::start(&config_for(&path)).unwrap();
    assert_eq!(console.session().tab_names(), vec!["main.lua"]);
}
