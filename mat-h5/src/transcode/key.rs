//! Destination name mapping.

/// Remove a trailing run of ASCII digits.
///
/// MAT files from the recording pipeline number their variables
/// (`songVoltage12`); the destination drops the number. A name made only of
/// digits maps to the empty string, which is used as-is.
///
/// # Example
///
/// ```
/// use mat_h5::strip_digit_suffix;
///
/// assert_eq!(strip_digit_suffix("songVoltage12"), "songVoltage");
/// assert_eq!(strip_digit_suffix("song01Name1"), "song01Name");
/// assert_eq!(strip_digit_suffix("tempo"), "tempo");
/// assert_eq!(strip_digit_suffix("2024"), "");
/// ```
pub fn strip_digit_suffix(key: &str) -> &str {
    key.trim_end_matches(|c: char| c.is_ascii_digit())
}
