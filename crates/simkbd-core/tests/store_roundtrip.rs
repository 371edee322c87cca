//! Integration tests for the simkbd-core store codec and keyboard mutation.
//!
//! These tests go through the public API only: decode a realistic simulator
//! preferences file, mutate it, encode it, and decode the result again.

use simkbd_core::{
    decode, disable_connect_hardware_keyboard, encode, get_dictionary, EncodingTag, Value,
    CONNECT_HARDWARE_KEYBOARD_KEY, DEVICE_PREFERENCES_KEY,
};

const SIMULATOR_PREFERENCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CurrentDeviceUDID</key>
	<string>0D6C4E7A-2C0B-4E8C-9E0F-5A4B3C2D1E0F</string>
	<key>DevicePreferences</key>
	<dict>
		<key>0D6C4E7A-2C0B-4E8C-9E0F-5A4B3C2D1E0F</key>
		<dict>
			<key>ConnectHardwareKeyboard</key>
			<true/>
			<key>SimulatorExternalDisplay</key>
			<integer>0</integer>
			<key>SimulatorWindowGeometry</key>
			<dict>
				<key>0</key>
				<string>{{120, 80}, {414, 896}}</string>
			</dict>
		</dict>
		<key>7F1E2D3C-4B5A-6978-8796-A5B4C3D2E1F0</key>
		<dict>
			<key>SimulatorWindowRotationAngle</key>
			<real>0.0</real>
		</dict>
	</dict>
	<key>ShowSingleTouches</key>
	<false/>
	<key>RecentDevices</key>
	<array>
		<string>0D6C4E7A-2C0B-4E8C-9E0F-5A4B3C2D1E0F</string>
	</array>
</dict>
</plist>
"#;

fn keyboard_values(bytes: &[u8]) -> Vec<Option<Value>> {
    let (root, _) = decode(bytes).expect("decode must succeed");
    let devices = get_dictionary(&root, DEVICE_PREFERENCES_KEY).expect("device preferences");
    devices
        .values()
        .map(|d| {
            d.as_dictionary()
                .expect("device dictionary")
                .get(CONNECT_HARDWARE_KEYBOARD_KEY)
                .cloned()
        })
        .collect()
}

#[test]
fn test_unmodified_store_reencodes_to_equivalent_tree() {
    let (root, tag) = decode(SIMULATOR_PREFERENCES.as_bytes()).expect("decode");
    let bytes = encode(&root, tag).expect("encode");
    let (again, again_tag) = decode(&bytes).expect("decode re-encoded");

    assert_eq!(again_tag, EncodingTag::Xml);
    assert_eq!(again, root);
}

#[test]
fn test_binary_store_stays_binary_after_mutation() {
    // Arrange: convert the fixture to the binary variant first.
    let (root, _) = decode(SIMULATOR_PREFERENCES.as_bytes()).unwrap();
    let binary = encode(&root, EncodingTag::Binary).unwrap();

    // Act
    let (mut root, tag) = decode(&binary).unwrap();
    disable_connect_hardware_keyboard(&mut root).unwrap();
    let out = encode(&root, tag).unwrap();

    // Assert
    assert_eq!(tag, EncodingTag::Binary);
    assert!(out.starts_with(b"bplist00"));
    assert!(keyboard_values(&out)
        .iter()
        .all(|v| *v == Some(Value::Boolean(false))));
}

#[test]
fn test_mutation_applied_twice_produces_identical_bytes() {
    let (mut root, tag) = decode(SIMULATOR_PREFERENCES.as_bytes()).unwrap();
    disable_connect_hardware_keyboard(&mut root).unwrap();
    let once = encode(&root, tag).unwrap();

    let (mut root, tag) = decode(&once).unwrap();
    disable_connect_hardware_keyboard(&mut root).unwrap();
    let twice = encode(&root, tag).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_mutation_preserves_unrelated_top_level_keys() {
    let (mut original, _) = decode(SIMULATOR_PREFERENCES.as_bytes()).unwrap();
    let before = original.clone();

    disable_connect_hardware_keyboard(&mut original).unwrap();

    for key in ["CurrentDeviceUDID", "ShowSingleTouches", "RecentDevices"] {
        assert_eq!(original.get(key), before.get(key), "top-level key {key}");
    }
}
