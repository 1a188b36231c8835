use super::*;

#[test]
fn ui_mode_defaults_to_plain() {
    assert_eq!(UiMode::default(), UiMode::Plain);
}

#[test]
fn ui_mode_displays_lowercase() {
    assert_eq!(UiMode::Plain.to_string(), "plain");
    assert_eq!(UiMode::Tui.to_string(), "tui");
}
