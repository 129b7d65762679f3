//! Fixed-vector checks for TC3-HMAC-SHA256 signing.

use ai_gateway::signing::{sha256_hex, SigningContext, SigningError};
use chrono::{TimeZone, Utc};

const HOST: &str = "hunyuan.tencentcloudapi.com";

fn context(secret_id: &str, secret_key: &str, payload: &[u8]) -> SigningContext {
    SigningContext::new(secret_id, secret_key, "hunyuan")
        .with_header("content-type", "application/json")
        .with_header("host", HOST)
        .with_header("x-tc-action", "chatcompletions")
        .with_payload(payload.to_vec())
        .with_time(1704067200, "2024-01-01")
}

#[test]
fn known_vector() {
    let sig = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    assert_eq!(
        sig.signature,
        "bc277e27611ae013aaf1e61234186b17b94c49f82f92b9475f6ca1c3c9db6846"
    );
    assert_eq!(sig.credential_scope, "2024-01-01/hunyuan/tc3_request");
    assert_eq!(sig.signed_header_names, "content-type;host;x-tc-action");
}

#[test]
fn independent_invocations_are_identical() {
    let a = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    let b = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    assert_eq!(a.signature, b.signature);
    assert_eq!(a.authorization, b.authorization);
}

#[test]
fn single_byte_payload_change_changes_signature() {
    let x = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    let y = context("AKID", "SECRET", br#"{"Model":"y"}"#).sign().unwrap();
    assert_eq!(
        y.signature,
        "dc563d7eed6797cdb6b20f9de6035c8b624d190dfac7724d2d0ff7cdf778fcfc"
    );
    assert_ne!(x.signature, y.signature);
}

#[test]
fn every_time_and_secret_input_matters() {
    let base = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();

    let other_key = context("AKID", "SECRET2", br#"{"Model":"x"}"#).sign().unwrap();
    assert_ne!(base.signature, other_key.signature);

    let other_ts = context("AKID", "SECRET", br#"{"Model":"x"}"#)
        .with_time(1704067201, "2024-01-01")
        .sign()
        .unwrap();
    assert_ne!(base.signature, other_ts.signature);

    let other_date = context("AKID", "SECRET", br#"{"Model":"x"}"#)
        .with_time(1704067200, "2024-01-02")
        .sign()
        .unwrap();
    assert_ne!(base.signature, other_date.signature);

    let other_id = context("AKID2", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    assert_ne!(base.authorization, other_id.authorization);
}

#[test]
fn instant_splits_into_timestamp_and_utc_date() {
    let at = Utc.timestamp_opt(1704067200, 0).unwrap();
    let from_instant = SigningContext::new("AKID", "SECRET", "hunyuan")
        .with_header("content-type", "application/json")
        .with_header("host", HOST)
        .with_header("x-tc-action", "chatcompletions")
        .with_payload(br#"{"Model":"x"}"#.to_vec())
        .at(at)
        .sign()
        .unwrap();
    let fixed = context("AKID", "SECRET", br#"{"Model":"x"}"#).sign().unwrap();
    assert_eq!(from_instant, fixed);
}

#[test]
fn rejects_incomplete_inputs() {
    assert_eq!(
        context("", "SECRET", b"{}").sign().unwrap_err(),
        SigningError::MissingCredential("secret_id")
    );
    assert!(matches!(
        context("AKID", "SECRET", b"{}")
            .with_time(1704067200, "01/01/2024")
            .sign(),
        Err(SigningError::InvalidDate(_))
    ));
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
