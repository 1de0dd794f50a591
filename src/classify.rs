//! Vendor classification for device identifier strings.

/// Label returned when no vendor keyword matches.
pub const GENERIC_LABEL: &str = "Generic Controller";

// Ordered keyword table; first matching set wins.
const VENDOR_LABELS: &[(&[&str], &str)] = &[
    (&["xbox", "x-box", "xinput", "microsoft"], "Xbox Controller"),
    (
        &["dualsense", "dualshock", "playstation", "sony", "ps4", "ps5"],
        "PlayStation Controller",
    ),
    (
        &["nintendo", "switch", "joy-con", "joycon", "pro controller"],
        "Nintendo Controller",
    ),
    (&["steam", "valve"], "Steam Controller"),
    (&["8bitdo"], "8BitDo Controller"),
    (&["logitech"], "Logitech Controller"),
];

/// Classifies a device identifier by case-insensitive substring match against
/// the vendor keyword table, falling back to [`GENERIC_LABEL`].
pub fn classify_device(device_id: &str) -> &'static str {
    let id = device_id.to_lowercase();
    for (keywords, label) in VENDOR_LABELS {
        if keywords.iter().any(|k| id.contains(k)) {
            return label;
        }
    }
    GENERIC_LABEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbox_pads_are_labelled_xbox() {
        assert_eq!(
            classify_device("Xbox Wireless Controller"),
            "Xbox Controller"
        );
        assert_eq!(classify_device("Microsoft X-Box One pad"), "Xbox Controller");
    }

    #[test]
    fn sony_pads_are_labelled_playstation() {
        assert_eq!(
            classify_device("DualSense Wireless Controller"),
            "PlayStation Controller"
        );
        assert_eq!(
            classify_device("Sony Interactive Entertainment DualShock 4"),
            "PlayStation Controller"
        );
    }

    #[test]
    fn unknown_devices_fall_back_to_generic() {
        assert_eq!(classify_device("Unknown HID Device"), GENERIC_LABEL);
        assert_eq!(classify_device(""), GENERIC_LABEL);
    }

    #[test]
    fn match_is_case_insensitive() {
        assert_eq!(classify_device("NINTENDO SWITCH PRO"), "Nintendo Controller");
        assert_eq!(classify_device("8bitdo SN30 Pro"), "8BitDo Controller");
    }

    #[test]
    fn first_matching_vendor_wins() {
        // "xbox" appears before "logitech" in the table.
        assert_eq!(
            classify_device("Logitech Xbox-compatible pad"),
            "Xbox Controller"
        );
    }
}
