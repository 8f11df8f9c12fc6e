//! Integration tests for the server error taxonomy.

use nextcloud_core::{AvatarSize, NextcloudError};

#[test]
fn test_error_display_carries_status() {
    let err = NextcloudError::from_status(412, "Join the lobby first");
    assert_eq!(err.to_string(), "[412] Join the lobby first");
    assert_eq!(err.status_code(), Some(412));
}

#[test]
fn test_ocs_error_has_no_http_status() {
    let err = NextcloudError::Ocs {
        statuscode: 997,
        message: "Current user is not logged in".to_string(),
    };
    assert_eq!(err.status_code(), None);
    assert!(err.to_string().contains("997"));
}

#[test]
fn test_invalid_avatar_size_is_argument_error() {
    let err = AvatarSize::try_from(256).unwrap_err();
    assert!(matches!(err, NextcloudError::InvalidArgument(_)));
}
