mod common;

use common::*;
use matchpool::database::user_repo::{self, UniqueField, UserChanges};
use matchpool::models::{Gender, GenderPreference, GeoPoint, UserProfile};

#[tokio::test]
async fn pictures_append_in_order_and_pull_by_key() {
    let pool = test_pool().await;
    seed(&pool, Seed::new("u", Gender::Male, 30, 29.0, 41.0)).await;

    assert_eq!(user_repo::push_picture(&pool, "u", "a").await.unwrap(), 1);
    assert_eq!(user_repo::push_picture(&pool, "u", "b").await.unwrap(), 1);
    assert_eq!(user_repo::push_picture(&pool, "ghost", "c").await.unwrap(), 0);

    let row = user_repo::load_user(&pool, "u").await.unwrap().unwrap();
    let pictures = UserProfile::from(row).pictures;
    assert_eq!(
        pictures
            .iter()
            .map(|p| (p.image.as_str(), p.order))
            .collect::<Vec<_>>(),
        vec![("a", 0), ("b", 1)]
    );

    assert_eq!(user_repo::pull_picture(&pool, "u", "missing").await.unwrap(), 0);
    assert_eq!(user_repo::pull_picture(&pool, "u", "a").await.unwrap(), 1);
    assert_eq!(user_repo::pull_picture(&pool, "u", "b").await.unwrap(), 1);

    let row = user_repo::load_user(&pool, "u").await.unwrap().unwrap();
    assert!(row.pictures.0.is_empty());
}

#[tokio::test]
async fn pulling_a_picture_renumbers_the_rest() {
    let pool = test_pool().await;
    seed(&pool, Seed::new("u", Gender::Male, 30, 29.0, 41.0)).await;

    for image in ["a", "b", "c"] {
        user_repo::push_picture(&pool, "u", image).await.unwrap();
    }
    assert_eq!(user_repo::pull_picture(&pool, "u", "b").await.unwrap(), 1);
    user_repo::push_picture(&pool, "u", "d").await.unwrap();

    let row = user_repo::load_user(&pool, "u").await.unwrap().unwrap();
    assert_eq!(
        row.pictures
            .0
            .iter()
            .map(|p| (p.image.as_str(), p.order))
            .collect::<Vec<_>>(),
        vec![("a", 0), ("c", 1), ("d", 2)]
    );

    assert_eq!(user_repo::pull_picture(&pool, "u", "a").await.unwrap(), 1);
    let pictures = UserProfile::from(user_repo::load_user(&pool, "u").await.unwrap().unwrap()).pictures;
    assert_eq!(
        pictures
            .iter()
            .map(|p| (p.image.as_str(), p.order))
            .collect::<Vec<_>>(),
        vec![("c", 0), ("d", 1)]
    );
}

#[tokio::test]
async fn bulk_lookup_ignores_unknown_ids() {
    let pool = test_pool().await;
    seed(&pool, Seed::new("u", Gender::Male, 30, 29.0, 41.0)).await;
    seed(&pool, Seed::new("v", Gender::Female, 30, 29.0, 41.0)).await;

    let rows = user_repo::load_users(&pool, &["v".into(), "nope".into(), "u".into()])
        .await
        .unwrap();
    assert_eq!(
        rows.iter().map(|r| r.user_id.as_str()).collect::<Vec<_>>(),
        vec!["u", "v"]
    );
    assert!(user_repo::load_users(&pool, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_leaves_unset_columns_alone() {
    let pool = test_pool().await;
    seed(
        &pool,
        Seed::new("u", Gender::Male, 30, 29.0, 41.0)
            .with_preferences(prefs(50.0, 25, 35, GenderPreference::All)),
    )
    .await;

    let changes = UserChanges {
        geometry: Some(GeoPoint::new(28.9, 41.1)),
        ..Default::default()
    };
    assert_eq!(user_repo::update_user(&pool, "u", &changes).await.unwrap(), 1);

    let profile = UserProfile::from(user_repo::load_user(&pool, "u").await.unwrap().unwrap());
    assert_eq!(profile.geometry, Some(GeoPoint::new(28.9, 41.1)));
    assert_eq!(profile.gender, Gender::Male);
    assert_eq!(profile.preferences, Some(prefs(50.0, 25, 35, GenderPreference::All)));
}

#[tokio::test]
async fn uniqueness_and_credentials() {
    let pool = test_pool().await;
    seed(&pool, Seed::new("u", Gender::Male, 30, 29.0, 41.0)).await;

    assert!(user_repo::field_value_exists(&pool, UniqueField::Username, "u").await.unwrap());
    assert!(user_repo::field_value_exists(&pool, UniqueField::Email, "u@example.com").await.unwrap());
    assert!(!user_repo::field_value_exists(&pool, UniqueField::Email, "x@example.com").await.unwrap());
    assert_eq!(UniqueField::parse("password_hash"), None);

    let creds = user_repo::load_credentials_by_username(&pool, "u")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.user_id, "u");
    assert!(matchpool::services::auth_service::verify_password(PASSWORD, &creds.password_hash));
}
