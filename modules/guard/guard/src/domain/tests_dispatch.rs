#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use guard_sdk::{AccountStatusError, GuardError, Token};
use tracing_test::traced_test;

use crate::config::GuardConfig;
use crate::domain::{AuthenticationProvider, BuildError, UserChecker};
use crate::test_support::{
    Fixture, InMemoryUsers, StaticChecker, TestUser, post_token, pre_token,
    pre_token_with_password, provider_with,
};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn provider_is_shareable_across_threads() {
    assert_send_sync::<AuthenticationProvider>();
}

#[tokio::test]
async fn only_the_matching_authenticator_is_invoked() {
    let fixture = Fixture::new(3);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let token = provider.authenticate(pre_token("fw_1", "alice")).await.unwrap();

    assert!(fixture.authenticators[0].calls().is_empty());
    assert!(fixture.authenticators[2].calls().is_empty());
    assert_eq!(
        fixture.all_calls(),
        [
            "1:resolve_user",
            "checker:pre",
            "1:verify_credentials",
            "checker:post",
            "1:create_authenticated_token",
        ]
    );
    assert_eq!(
        token.attribute("authenticator"),
        Some(&serde_json::Value::String("1".to_owned()))
    );
    assert_eq!(token.context_name().as_str(), "fw");
    assert_eq!(token.user().identifier(), "alice");
    assert!(token.is_authenticated());
}

#[tokio::test]
async fn failed_verification_is_bad_credentials() {
    let fixture = Fixture::new(1);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let err = provider
        .authenticate(pre_token_with_password("fw_0", "alice", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, GuardError::BadCredentials));
    assert_eq!(
        fixture.all_calls(),
        ["0:resolve_user", "checker:pre", "0:verify_credentials"]
    );
}

#[tokio::test]
async fn unresolved_user_fails_before_any_check() {
    let fixture = Fixture::new(2);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let err = provider
        .authenticate(pre_token("fw_0", "mallory"))
        .await
        .unwrap_err();

    assert!(matches!(err, GuardError::AuthenticationFailed(_)));
    assert_eq!(fixture.all_calls(), ["0:resolve_user"]);
}

#[tokio::test]
async fn invalidated_token_expires_with_empty_authenticator_list() {
    let fixture = Fixture::new(0);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let err = provider.authenticate(post_token("fw", false)).await.unwrap_err();

    assert!(matches!(err, GuardError::Expired));
    assert!(err.requires_reauthentication());
}

#[tokio::test]
async fn invalidated_token_expires_without_consulting_collaborators() {
    let fixture = Fixture::new(3);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let err = provider.authenticate(post_token("fw", false)).await.unwrap_err();

    assert!(matches!(err, GuardError::Expired));
    assert!(fixture.all_calls().is_empty());
}

#[tokio::test]
async fn authenticated_post_token_is_returned_unchanged() {
    let fixture = Fixture::new(1);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let token = provider.authenticate(post_token("fw", true)).await.unwrap();

    assert!(token.is_authenticated());
    assert_eq!(token.user().identifier(), "alice");
    assert!(fixture.all_calls().is_empty());
}

#[tokio::test]
async fn foreign_context_is_unsupported_and_mismatched() {
    let fixture = Fixture::new(1);
    let provider = provider_with("fw_a", &fixture, StaticChecker::allow());
    let token = pre_token("fw_b_0", "alice");

    assert!(!provider.supports(&token));

    match provider.authenticate(token).await {
        Err(err @ GuardError::OriginMismatch { .. }) => {
            assert!(err.to_string().contains("fw_b_0"));
        }
        other => panic!("Expected OriginMismatch, got: {other:?}"),
    }
    assert!(fixture.all_calls().is_empty());
}

#[tokio::test]
#[traced_test]
async fn origin_mismatch_is_logged_with_context_key() {
    let fixture = Fixture::new(2);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let result = provider.authenticate(pre_token("fw_7", "alice")).await;

    assert!(matches!(result, Err(GuardError::OriginMismatch { .. })));
    assert!(logs_contain("did not originate from any authenticator"));
    assert!(logs_contain("fw_7"));
    assert!(!logs_contain(crate::test_support::PASSWORD));
}

#[tokio::test]
async fn anonymous_token_is_unsupported() {
    let fixture = Fixture::new(1);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    assert!(!provider.supports(&Token::Anonymous));
    let err = provider.authenticate(Token::Anonymous).await.unwrap_err();
    assert!(matches!(err, GuardError::UnsupportedToken(_)));
}

#[test]
fn supports_checks_context_and_registered_id() {
    let fixture = Fixture::new(3);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    assert!(provider.supports(&pre_token("fw_0", "alice")));
    assert!(provider.supports(&pre_token("fw_2", "alice")));
    assert!(!provider.supports(&pre_token("fw_3", "alice")));
    assert!(!provider.supports(&pre_token("fw_-1", "alice")));
    assert!(!provider.supports(&pre_token("fw_x", "alice")));
    assert!(!provider.supports(&pre_token("fw", "alice")));
    assert!(!provider.supports(&pre_token("other_0", "alice")));
    assert!(!provider.supports(&post_token("fw", true)));

    assert!(fixture.all_calls().is_empty());
}

#[test]
fn supports_with_empty_list_is_always_false() {
    let fixture = Fixture::new(0);
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    assert!(!provider.supports(&pre_token("fw_0", "alice")));
}

#[tokio::test]
async fn pre_auth_failure_propagates_and_skips_verification() {
    let fixture = Fixture::new(1);
    let provider = provider_with(
        "fw",
        &fixture,
        StaticChecker::reject_pre(AccountStatusError::Rejected("on hold".to_owned())),
    );

    let err = provider.authenticate(pre_token("fw_0", "alice")).await.unwrap_err();

    match err {
        GuardError::AccountStatus(AccountStatusError::Rejected(reason)) => {
            assert_eq!(reason, "on hold");
        }
        other => panic!("Expected AccountStatus, got: {other:?}"),
    }
    assert_eq!(fixture.all_calls(), ["0:resolve_user", "checker:pre"]);
}

#[tokio::test]
async fn post_auth_failure_propagates_and_skips_token_creation() {
    let fixture = Fixture::new(1);
    let provider = provider_with(
        "fw",
        &fixture,
        StaticChecker::reject_post(AccountStatusError::CredentialsExpired),
    );

    let err = provider.authenticate(pre_token("fw_0", "alice")).await.unwrap_err();

    assert!(matches!(
        err,
        GuardError::AccountStatus(AccountStatusError::CredentialsExpired)
    ));
    assert_eq!(
        fixture.all_calls(),
        [
            "0:resolve_user",
            "checker:pre",
            "0:verify_credentials",
            "checker:post",
        ]
    );
}

#[tokio::test]
async fn default_user_checker_rejects_locked_account() {
    let locked = TestUser {
        locked: true,
        ..TestUser::new("bob")
    };
    let fixture = Fixture::with_store(1, Arc::new(InMemoryUsers::new(vec![locked])));
    let provider = provider_with("fw", &fixture, UserChecker::new());

    let err = provider.authenticate(pre_token("fw_0", "bob")).await.unwrap_err();

    assert!(matches!(
        err,
        GuardError::AccountStatus(AccountStatusError::Locked)
    ));
    assert!(!fixture.all_calls().iter().any(|c| c == "0:verify_credentials"));
}

#[tokio::test]
async fn user_store_failure_propagates_unchanged() {
    let fixture = Fixture::with_store(1, Arc::new(InMemoryUsers::unavailable()));
    let provider = provider_with("fw", &fixture, StaticChecker::allow());

    let err = provider.authenticate(pre_token("fw_0", "alice")).await.unwrap_err();

    match err {
        GuardError::ServiceUnavailable(msg) => assert_eq!(msg, "user store is offline"),
        other => panic!("Expected ServiceUnavailable, got: {other:?}"),
    }
    assert_eq!(fixture.all_calls(), ["0:resolve_user"]);
}

#[tokio::test]
async fn explicit_ids_survive_reordering() {
    let fixture = Fixture::new(2);
    let [first, second] = [&fixture.authenticators[0], &fixture.authenticators[1]];

    let provider = AuthenticationProvider::builder(
        "fw",
        fixture.users.clone(),
        fixture.checker(StaticChecker::allow()),
    )
    .authenticator_with_id("api-key", second.clone())
    .authenticator_with_id("form", first.clone())
    .build()
    .unwrap();

    assert_eq!(
        provider.context_keys().map(ToString::to_string).collect::<Vec<_>>(),
        ["fw_api-key", "fw_form"]
    );
    assert!(provider.supports(&pre_token("fw_form", "alice")));
    assert!(!provider.supports(&pre_token("fw_0", "alice")));

    provider.authenticate(pre_token("fw_form", "alice")).await.unwrap();
    assert_eq!(first.calls().len(), 3);
    assert!(second.calls().is_empty());
}

#[test]
fn duplicate_ids_fail_fast() {
    let fixture = Fixture::new(2);
    let [first, second] = [&fixture.authenticators[0], &fixture.authenticators[1]];

    // explicit "1" collides with the positional id of the second entry
    let result = AuthenticationProvider::builder(
        "fw",
        fixture.users.clone(),
        fixture.checker(StaticChecker::allow()),
    )
    .authenticator_with_id("1", first.clone())
    .authenticator(second.clone())
    .build();

    match result {
        Err(BuildError::DuplicateAuthenticatorId { context, id }) => {
            assert_eq!(context, "fw");
            assert_eq!(id, "1");
        }
        Err(other) => panic!("Expected DuplicateAuthenticatorId, got: {other:?}"),
        Ok(_) => panic!("Expected DuplicateAuthenticatorId, got a provider"),
    }
}

#[test]
fn ids_containing_the_separator_are_rejected() {
    let fixture = Fixture::new(1);

    let result = AuthenticationProvider::builder(
        "fw",
        fixture.users.clone(),
        fixture.checker(StaticChecker::allow()),
    )
    .authenticator_with_id("a_0", fixture.authenticators[0].clone())
    .build();

    assert!(matches!(result, Err(BuildError::InvalidAuthenticatorId(_))));
}

#[test]
fn invalid_context_name_is_rejected() {
    let fixture = Fixture::new(1);

    let result = AuthenticationProvider::new(
        fixture.dyn_authenticators(),
        fixture.users.clone(),
        "",
        fixture.checker(StaticChecker::allow()),
    );

    assert!(matches!(result, Err(BuildError::InvalidContextName(_))));
}

#[test]
fn from_config_assigns_configured_ids() {
    let fixture = Fixture::new(2);
    let cfg = GuardConfig {
        context_name: "admin_area".to_owned(),
        authenticator_ids: vec!["form".to_owned(), "token".to_owned()],
    };

    let provider = AuthenticationProvider::from_config(
        &cfg,
        fixture.dyn_authenticators(),
        fixture.users.clone(),
        fixture.checker(UserChecker::new()),
    )
    .unwrap();

    assert_eq!(provider.context_name().as_str(), "admin_area");
    assert_eq!(
        provider.authenticator_ids().map(ToString::to_string).collect::<Vec<_>>(),
        ["form", "token"]
    );
    assert!(provider.supports(&pre_token("admin_area_token", "alice")));
}

#[test]
fn from_config_without_ids_is_positional() {
    let fixture = Fixture::new(2);
    let cfg = GuardConfig {
        context_name: "fw".to_owned(),
        ..GuardConfig::default()
    };

    let provider = AuthenticationProvider::from_config(
        &cfg,
        fixture.dyn_authenticators(),
        fixture.users.clone(),
        fixture.checker(UserChecker::new()),
    )
    .unwrap();

    assert!(provider.supports(&pre_token("fw_1", "alice")));
}

#[test]
fn from_config_rejects_count_mismatch() {
    let fixture = Fixture::new(2);
    let cfg = GuardConfig {
        context_name: "fw".to_owned(),
        authenticator_ids: vec!["form".to_owned()],
    };

    let result = AuthenticationProvider::from_config(
        &cfg,
        fixture.dyn_authenticators(),
        fixture.users.clone(),
        fixture.checker(UserChecker::new()),
    );

    assert!(matches!(
        result,
        Err(BuildError::AuthenticatorCountMismatch {
            configured: 1,
            supplied: 2
        })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatch_shares_one_provider() {
    let fixture = Fixture::new(2);
    let provider = Arc::new(provider_with("fw", &fixture, StaticChecker::allow()));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                let key = format!("fw_{}", i % 2);
                let password = if i % 4 < 2 { "secret" } else { "wrong" };
                provider
                    .authenticate(pre_token_with_password(&key, "alice", password))
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let (ok, failed): (Vec<_>, Vec<_>) = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .partition(Result::is_ok);

    assert_eq!(ok.len(), 16);
    assert_eq!(failed.len(), 16);
    assert!(
        failed
            .iter()
            .all(|r| matches!(r, Err(GuardError::BadCredentials)))
    );
    // per authenticator: 8 successes x 3 calls, 8 rejections x 2 calls
    assert_eq!(fixture.authenticators[0].calls().len(), 40);
    assert_eq!(fixture.authenticators[1].calls().len(), 40);
}
