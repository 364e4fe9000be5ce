//! Unit tests for JWT functionality.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::jwt::{JwtError, JwtService, TOKEN_LIFETIME_SECS};

fn config(secret: Option<&str>, issuer: &str) -> JwtConfig {
    JwtConfig {
        secret: secret.map(String::from),
        issuer: issuer.to_string(),
    }
}

fn create_test_service() -> JwtService {
    JwtService::new(&config(Some("test-secret-key-for-testing"), "vouch-test")).unwrap()
}

#[test]
fn test_issue_and_validate() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();

    let token = service.issue(user_id, "a@x.com").unwrap();
    let claims = service.validate_token(&token).unwrap();

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.iss, "vouch-test");
    assert_eq!(claims.aud, "vouch-test");
}

#[test]
fn test_expiry_is_exactly_one_hour() {
    let service = create_test_service();
    let before = Utc::now().timestamp();

    let token = service.issue(Uuid::new_v4(), "a@x.com").unwrap();
    let claims = service.validate_token(&token).unwrap();

    let after = Utc::now().timestamp();
    assert!(claims.iat >= before && claims.iat <= after);
    assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
    assert_eq!(TOKEN_LIFETIME_SECS, 3600);
}

#[test]
fn test_issue_at_is_deterministic() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();
    let at = Utc::now() - Duration::minutes(5);

    let first = service.issue_at(user_id, "a@x.com", at).unwrap();
    let second = service.issue_at(user_id, "a@x.com", at).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_token_has_three_segments() {
    let service = create_test_service();
    let token = service.issue(Uuid::new_v4(), "a@x.com").unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_missing_secret_is_rejected() {
    let err = JwtService::new(&config(None, "vouch")).unwrap_err();
    assert!(matches!(err, JwtError::MissingSecret));
    assert!(matches!(AppError::from(err), AppError::Configuration(_)));
}

#[test]
fn test_empty_secret_is_rejected() {
    let err = JwtService::new(&config(Some(""), "vouch")).unwrap_err();
    assert!(matches!(err, JwtError::MissingSecret));
}

#[test]
fn test_empty_email_is_rejected() {
    let service = create_test_service();
    let err = service.issue(Uuid::new_v4(), "").unwrap_err();
    assert!(matches!(err, JwtError::MissingEmail));
    assert!(matches!(AppError::from(err), AppError::InvalidInput(_)));
}

#[test]
fn test_expired_token() {
    let service = create_test_service();
    let issued_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    let token = service
        .issue_at(Uuid::new_v4(), "a@x.com", issued_at)
        .unwrap();

    assert!(matches!(
        service.validate_token(&token),
        Err(JwtError::Expired)
    ));
}

#[test]
fn test_other_secret_is_rejected() {
    let service = create_test_service();
    let other = JwtService::new(&config(Some("another-secret"), "vouch-test")).unwrap();

    let token = other.issue(Uuid::new_v4(), "a@x.com").unwrap();
    let err = service.validate_token(&token).unwrap_err();

    assert!(matches!(err, JwtError::DecodingError(_)));
    assert!(matches!(AppError::from(err), AppError::Unauthorized));
}

#[test]
fn test_other_issuer_is_rejected() {
    let service = create_test_service();
    let other =
        JwtService::new(&config(Some("test-secret-key-for-testing"), "someone-else")).unwrap();

    let token = other.issue(Uuid::new_v4(), "a@x.com").unwrap();

    assert!(matches!(
        service.validate_token(&token),
        Err(JwtError::WrongIssuer)
    ));
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    assert!(service.validate_token("invalid.token.here").is_err());
}

#[test]
fn test_debug_hides_keys() {
    let rendered = format!("{:?}", create_test_service());
    assert!(!rendered.contains("test-secret-key-for-testing"));
}
