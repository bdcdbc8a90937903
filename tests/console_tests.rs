mod common;

use std::io::Cursor;

use common::{FakeDevice, FakeDirectory};
use volwatch::console::menu::{choose, MenuError};
use volwatch::console::select_device;
use volwatch::kernel::device::Device;

fn named(name: &str, volume: u16) -> FakeDevice {
    let mut d = FakeDevice::with_volumes(&[volume]);
    d.name = name.to_string();
    d
}

#[test]
fn test_choose_prints_numbered_list() {
    let mut input = Cursor::new("2\n");
    let mut output = Vec::new();

    let idx = choose(&mut input, &mut output, "Choose a network interface", &["eth0", "wlan0"]).unwrap();

    assert_eq!(idx, 1);
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.starts_with("Choose a network interface\n"));
    assert!(printed.contains("\t1. eth0\n\t2. wlan0\n"));
    assert!(printed.ends_with("Choose (Enter number): "));
}

#[test]
fn test_choose_rejects_bad_input() {
    let items = ["a", "b", "c"];

    let err = choose(&mut Cursor::new("x\n"), &mut Vec::new(), "pick", &items).unwrap_err();
    assert!(matches!(err, MenuError::NotANumber(ref s) if s == "x"));

    let err = choose(&mut Cursor::new("0\n"), &mut Vec::new(), "pick", &items).unwrap_err();
    assert!(matches!(err, MenuError::OutOfRange { choice: 0, len: 3 }));

    let err = choose(&mut Cursor::new("4\n"), &mut Vec::new(), "pick", &items).unwrap_err();
    assert!(matches!(err, MenuError::OutOfRange { choice: 4, len: 3 }));

    let err = choose(&mut Cursor::new(""), &mut Vec::new(), "pick", &items).unwrap_err();
    assert!(matches!(err, MenuError::Eof));

    let empty: [&str; 0] = [];
    let err = choose(&mut Cursor::new("1\n"), &mut Vec::new(), "pick", &empty).unwrap_err();
    assert!(matches!(err, MenuError::Empty));
}

#[test]
fn test_choose_tolerates_whitespace() {
    let idx = choose(&mut Cursor::new("  3 \r\n"), &mut Vec::new(), "pick", &["a", "b", "c"]).unwrap();
    assert_eq!(idx, 2);
}

#[tokio::test]
async fn test_select_device_by_menu() {
    let directory = FakeDirectory {
        devices: vec![named("Kitchen", 11), named("Living Room", 22)],
    };
    let mut input = Cursor::new("2\n");
    let mut output = Vec::new();

    let (name, device) = select_device(&directory, None, &mut input, &mut output).await.unwrap();

    assert_eq!(name, "Living Room");
    assert_eq!(device.get_volume().await.unwrap(), 22);
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.starts_with("Found 2 devices:\n"));
    assert!(printed.contains("\t1. Kitchen\n\t2. Living Room\n"));
}

#[tokio::test]
async fn test_select_device_preselected_skips_prompt() {
    let directory = FakeDirectory {
        devices: vec![named("Kitchen", 11), named("Living Room", 22)],
    };
    // Nothing to read: a prompt would fail with Eof.
    let mut input = Cursor::new("");
    let mut output = Vec::new();

    let (name, _) = select_device(&directory, Some(1), &mut input, &mut output).await.unwrap();
    assert_eq!(name, "Kitchen");

    let err = select_device(&directory, Some(3), &mut input, &mut output).await.unwrap_err();
    assert!(err.downcast_ref::<MenuError>().is_some());
}

#[tokio::test]
async fn test_select_device_with_nothing_found() {
    let directory = FakeDirectory { devices: vec![] };
    let mut output = Vec::new();

    let err = select_device(&directory, None, &mut Cursor::new("1\n"), &mut output).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<MenuError>(), Some(MenuError::Empty)));
    assert_eq!(String::from_utf8(output).unwrap(), "Found 0 devices:\n");
}
