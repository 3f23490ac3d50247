//! Environment variable handling behind the log format split.
//!
//! Mutates the process environment, so everything runs in one test body.

use app_bootstrap::EnvironmentTag;

#[test]
fn test_environment_detection_binary_split() {
    std::env::remove_var(EnvironmentTag::VAR);
    let tag = EnvironmentTag::detect();
    assert!(tag.is_development());
    assert_eq!(tag.as_str(), "Development");

    std::env::set_var(EnvironmentTag::VAR, "Production");
    let tag = EnvironmentTag::detect();
    assert!(!tag.is_development());
    assert_eq!(tag.as_str(), "Production");

    // Blank values are treated as absent.
    std::env::set_var(EnvironmentTag::VAR, "  ");
    assert!(EnvironmentTag::detect().is_development());

    std::env::remove_var(EnvironmentTag::VAR);
}
