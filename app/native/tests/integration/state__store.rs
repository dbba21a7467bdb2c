use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use uiviz_lib::state::{StateValue, Subsystem};

use crate::common::*;

#[test]
fn test_concurrent_reader_never_sees_partial_value() {
    let dir = StateDir::new();
    let store = dir.store();
    store.write(Subsystem::MenuBarAlpha, StateValue::Fraction(1.0)).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let done = Arc::clone(&done);
        let path = store.path(Subsystem::MenuBarAlpha);
        thread::spawn(move || {
            let mut reads = 0;
            while !done.load(Ordering::SeqCst) {
                let contents = fs::read_to_string(&path).unwrap();
                assert!(
                    contents == "1\n" || contents == "0.25\n",
                    "observed partial content {contents:?}"
                );
                reads += 1;
            }
            reads
        })
    };

    for round in 0..500 {
        let value = if round % 2 == 0 { 0.25 } else { 1.0 };
        store.write(Subsystem::MenuBarAlpha, StateValue::Fraction(value)).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
}

#[test]
fn test_no_temp_file_left_behind() {
    let dir = StateDir::new();
    let store = dir.store();

    store.write(Subsystem::MenuBar, StateValue::Flag(true)).unwrap();
    store.write(Subsystem::Dock, StateValue::Flag(false)).unwrap();

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["dock_state", "menubar_state"]);
}

#[test]
fn test_values_written_by_other_tools_are_read() {
    let dir = StateDir::new();
    fs::write(dir.path().join("menubar_state"), "1").unwrap();
    fs::write(dir.path().join("menubar_alpha"), "0.5\n").unwrap();
    fs::write(dir.path().join("dock_state"), "yes\n").unwrap();

    let store = dir.store();
    assert_eq!(store.read(Subsystem::MenuBar), StateValue::Flag(true));
    assert_eq!(store.read(Subsystem::MenuBarAlpha), StateValue::Fraction(0.5));
    assert_eq!(store.read(Subsystem::Dock), StateValue::Flag(false));
}
