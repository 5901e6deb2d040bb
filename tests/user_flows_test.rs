//! Registration, authentication and user-hierarchy flows over in-memory
//! fakes. Password hashing and JWT issuance run for real.

mod common;

use common::{test_env, TestEnv};

use jogtrack::domain::{Scope, ScopeSet, UpdateUser, User};
use jogtrack::errors::AppError;
use jogtrack::infra::RefreshTokenStore;
use jogtrack::services::{AuthService, Registration, UserService};
use jogtrack::types::PageParams;

fn registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: "testing123G".to_string(),
        email: Some(format!("{}@example.com", username)),
        name: Some("Amichay Oren".to_string()),
    }
}

async fn register(env: &TestEnv, username: &str) -> User {
    env.auth.register(registration(username)).await.unwrap()
}

/// Register + self-elevate, the same bootstrap path the API offers.
async fn register_with_scopes(env: &TestEnv, username: &str, scopes: &[Scope]) -> User {
    let user = register(env, username).await;
    let set: ScopeSet = scopes.iter().copied().collect();
    env.user_service
        .update_scopes(&user, user.id, set)
        .await
        .unwrap();
    env.user_service.resolve_actor(user.id).await.unwrap()
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let env = test_env();

    register(&env, "runner").await;
    let second = env.auth.register(registration("runner")).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn login_issues_tokens_and_caches_refresh_token() {
    let env = test_env();
    let user = register(&env, "runner").await;

    let tokens = env.auth.login("runner", "testing123G").await.unwrap();
    assert!(!tokens.access_token.is_empty());

    let cached = env.tokens.retrieve_refresh_token(user.id).await.unwrap();
    assert_eq!(cached.as_deref(), Some(tokens.refresh_token.as_str()));

    let claims = env.auth.verify_token(&tokens.access_token).unwrap();
    assert_eq!(claims.sub, user.id);
}

#[tokio::test]
async fn logout_tolerates_missing_or_mismatched_tokens() {
    let env = test_env();
    let user = register(&env, "runner").await;

    // Nothing cached yet: still a no-op success
    assert!(env.auth.logout(user.id, "not-cached").await.is_ok());

    let tokens = env.auth.login("runner", "testing123G").await.unwrap();

    // Mismatched token leaves the cached one in place
    env.auth.logout(user.id, "some-other-token").await.unwrap();
    assert!(env
        .tokens
        .retrieve_refresh_token(user.id)
        .await
        .unwrap()
        .is_some());

    // Matching token removes it
    env.auth.logout(user.id, &tokens.refresh_token).await.unwrap();
    assert!(env
        .tokens
        .retrieve_refresh_token(user.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn user_can_update_own_details() {
    let env = test_env();
    let user = register(&env, "runner").await;

    env.user_service
        .update_user(
            &user,
            user.id,
            UpdateUser {
                name: Some("my new name!".into()),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();

    let reloaded = env.user_service.resolve_actor(user.id).await.unwrap();
    assert_eq!(reloaded.name.as_deref(), Some("my new name!"));
}

#[tokio::test]
async fn password_update_allows_new_login() {
    let env = test_env();
    let user = register(&env, "runner").await;

    env.user_service
        .update_user(
            &user,
            user.id,
            UpdateUser {
                password: Some("mynewGreatPassword12".into()),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();

    assert!(env.auth.login("runner", "mynewGreatPassword12").await.is_ok());
    assert!(matches!(
        env.auth.login("runner", "testing123G").await,
        Err(AppError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn weak_password_update_is_rejected() {
    let env = test_env();
    let user = register(&env, "runner").await;

    let result = env
        .user_service
        .update_user(
            &user,
            user.id,
            UpdateUser {
                password: Some("12".into()),
                ..UpdateUser::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn manager_updates_plain_user_but_not_other_manager() {
    let env = test_env();
    let manager =
        register_with_scopes(&env, "first.manager", &[Scope::User, Scope::Manager]).await;
    let plain = register(&env, "plain.user").await;
    let other_manager =
        register_with_scopes(&env, "second.manager", &[Scope::User, Scope::Manager]).await;

    env.user_service
        .update_user(
            &manager,
            plain.id,
            UpdateUser {
                name: Some("some new name".into()),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();

    let denied = env
        .user_service
        .update_user(
            &manager,
            other_manager.id,
            UpdateUser {
                name: Some("some new name".into()),
                ..UpdateUser::default()
            },
        )
        .await;

    assert!(matches!(denied, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn admin_updates_managers_and_admins() {
    let env = test_env();
    let admin =
        register_with_scopes(&env, "admin", &[Scope::User, Scope::Manager, Scope::Admin]).await;
    let manager = register_with_scopes(&env, "manager", &[Scope::User, Scope::Manager]).await;
    let other_admin = register_with_scopes(&env, "other.admin", &[Scope::User, Scope::Admin]).await;

    for target in [&manager, &other_admin] {
        env.user_service
            .update_user(
                &admin,
                target.id,
                UpdateUser {
                    name: Some("renamed".into()),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn plain_user_cannot_touch_others() {
    let env = test_env();
    let actor = register(&env, "actor").await;
    let target = register(&env, "target").await;

    let update = env
        .user_service
        .update_user(&actor, target.id, UpdateUser::default())
        .await;
    let expire = env.user_service.expire_user(&actor, target.id).await;

    assert!(matches!(update, Err(AppError::Forbidden)));
    assert!(matches!(expire, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn expired_user_cannot_authenticate_or_be_resolved() {
    let env = test_env();
    let admin =
        register_with_scopes(&env, "admin", &[Scope::User, Scope::Admin]).await;
    let victim = register(&env, "victim").await;

    env.user_service.expire_user(&admin, victim.id).await.unwrap();

    assert!(matches!(
        env.auth.login("victim", "testing123G").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        env.user_service.resolve_actor(victim.id).await,
        Err(AppError::Unauthorized)
    ));

    // The username is free again for a fresh registration
    assert!(env.auth.register(registration("victim")).await.is_ok());
}

#[tokio::test]
async fn listing_is_gated_and_visibility_filtered() {
    let env = test_env();
    let plain = register(&env, "plain").await;
    let manager = register_with_scopes(&env, "manager", &[Scope::User, Scope::Manager]).await;
    let admin = register_with_scopes(&env, "admin", &[Scope::User, Scope::Admin]).await;

    let denied = env
        .user_service
        .list_users(&plain, &PageParams::default())
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    // Manager only sees user-scoped accounts
    let manager_view = env
        .user_service
        .list_users(&manager, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(
        manager_view.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["plain"]
    );

    // Admin sees everyone
    let admin_view = env
        .user_service
        .list_users(&admin, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 3);
}

#[tokio::test]
async fn bad_paging_is_rejected() {
    let env = test_env();
    let admin = register_with_scopes(&env, "admin", &[Scope::User, Scope::Admin]).await;

    let result = env
        .user_service
        .list_users(&admin, &PageParams { page: 1, count: 0 })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}
