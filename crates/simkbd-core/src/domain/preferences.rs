//! In-memory rewrite of the simulator's per-device keyboard setting.

use tracing::debug;

use crate::store::value::{get_dictionary_mut, Dictionary, LookupError, Value};

/// Top-level key mapping device UDIDs to per-device settings.
pub const DEVICE_PREFERENCES_KEY: &str = "DevicePreferences";

/// Per-device setting that routes the host keyboard into the simulator.
pub const CONNECT_HARDWARE_KEYBOARD_KEY: &str = "ConnectHardwareKeyboard";

/// Sets `ConnectHardwareKeyboard` to `false` for every device in
/// `DevicePreferences`, returning the number of devices touched.
///
/// Other keys are left alone.  The operation is idempotent.  On error the
/// dictionary may be partially updated, so callers must not persist it.
///
/// # Errors
///
/// Returns [`LookupError`] if `DevicePreferences` or any device entry is
/// missing or is not a dictionary.
pub fn disable_connect_hardware_keyboard(root: &mut Dictionary) -> Result<usize, LookupError> {
    let devices = get_dictionary_mut(root, DEVICE_PREFERENCES_KEY)?;

    for (device_id, entry) in devices.iter_mut() {
        let found = entry.kind();
        let device = entry
            .as_dictionary_mut()
            .ok_or_else(|| LookupError::NotADictionary {
                key: device_id.clone(),
                found,
            })?;

        match device.get(CONNECT_HARDWARE_KEYBOARD_KEY) {
            Some(original) => {
                debug!("{device_id}: original value for {CONNECT_HARDWARE_KEYBOARD_KEY}: {original:?}")
            }
            None => debug!("{device_id}: {CONNECT_HARDWARE_KEYBOARD_KEY} not found"),
        }

        device.insert(CONNECT_HARDWARE_KEYBOARD_KEY.to_string(), Value::Boolean(false));
        debug!("{device_id}: {CONNECT_HARDWARE_KEYBOARD_KEY} disabled");
    }

    Ok(devices.len())
}
