mod common;

use axum::http::StatusCode;
use common::{post_json, seed_user, test_app, token_for};
use db::models::profile::{PlanType, Profile};
use serde_json::json;

#[tokio::test]
async fn admin_mints_a_key_and_a_user_redeems_it() {
    let app = test_app(None).await;
    let admin = seed_user(&app.db, "admin@example.com", 0).await;
    sqlx::query("UPDATE profiles SET is_admin = 1 WHERE id = $1")
        .bind(admin)
        .execute(&app.db.pool)
        .await
        .unwrap();
    let user = seed_user(&app.db, "user@example.com", 500).await;

    let (status, minted) = post_json(
        app.router.clone(),
        "/api/admin/keys",
        Some(&token_for(admin)),
        json!({ "plan": "premium" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let key_code = minted["keyCode"].as_str().unwrap().to_string();
    assert!(key_code.starts_with("CW-PREMIUM-"));

    let (status, redeemed) = post_json(
        app.router.clone(),
        "/api/keys/redeem",
        Some(&token_for(user)),
        json!({ "keyCode": key_code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(redeemed["success"], true);
    assert_eq!(redeemed["plan"], "premium");

    let profile = Profile::find_by_id(&app.db.pool, user).await.unwrap().unwrap();
    assert_eq!(profile.plan, PlanType::Premium);
    assert_eq!(profile.token_balance, 500 + 1_000_000_000);

    // Second redemption is a soft failure
    let (status, again) = post_json(
        app.router,
        "/api/keys/redeem",
        Some(&token_for(user)),
        json!({ "keyCode": key_code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["success"], false);
}

#[tokio::test]
async fn non_admins_cannot_mint_keys() {
    let app = test_app(None).await;
    let user = seed_user(&app.db, "user@example.com", 0).await;

    let (status, body) = post_json(
        app.router,
        "/api/admin/keys",
        Some(&token_for(user)),
        json!({ "plan": "ultra" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn unknown_key_is_a_soft_failure() {
    let app = test_app(None).await;
    let user = seed_user(&app.db, "user@example.com", 0).await;

    let (status, body) = post_json(
        app.router,
        "/api/keys/redeem",
        Some(&token_for(user)),
        json!({ "keyCode": "CW-ULTRA-deadbeef" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body.get("plan").is_none());
}
