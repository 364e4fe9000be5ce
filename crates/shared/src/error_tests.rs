use rstest::rstest;

use crate::error::AppError;

#[rstest]
#[case(AppError::invalid_input("test"), 400, "INVALID_INPUT")]
#[case(AppError::Unauthorized, 401, "UNAUTHORIZED")]
#[case(AppError::NotFound("test".into()), 404, "NOT_FOUND")]
#[case(AppError::Conflict("test".into()), 409, "CONFLICT")]
#[case(AppError::StoreUnavailable("test".into()), 503, "STORE_UNAVAILABLE")]
#[case(AppError::Configuration("test".into()), 500, "CONFIGURATION_ERROR")]
#[case(AppError::CommitFailed("test".into()), 503, "COMMIT_FAILED")]
#[case(AppError::Internal("test".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
}

#[test]
fn test_invalid_input_display_joins_reasons() {
    let err = AppError::InvalidInput(vec![
        "Passwords must have at least one digit ('0'-'9').".into(),
        "Email 'a@x.com' is already taken.".into(),
    ]);
    assert_eq!(
        err.to_string(),
        "Invalid input: Passwords must have at least one digit ('0'-'9').; Email 'a@x.com' is already taken."
    );
}

#[test]
fn test_unauthorized_display_is_opaque() {
    assert_eq!(AppError::Unauthorized.to_string(), "Authentication failed");
}

#[test]
fn test_retryable_errors() {
    assert!(AppError::StoreUnavailable("down".into()).is_retryable());
    assert!(AppError::CommitFailed("db".into()).is_retryable());
    assert!(!AppError::Unauthorized.is_retryable());
    assert!(!AppError::invalid_input("empty").is_retryable());
    assert!(!AppError::Configuration("secret".into()).is_retryable());
}
