use secrecy::SecretString;
use store_rating_api::{
    config::{Environment, split_origins},
    dto::{
        auth::{Claims, LoginRequest, RegisterRequest},
        ratings::SubmitRatingRequest,
        stores::CreateStoreRequest,
    },
    error::AppError,
    middleware::auth::bearer_token,
    models::{RatingSummary, Role, format_average},
    policy::Operation,
    response::Pagination,
    routes::params::{StoreSortBy, like_pattern, normalize_page},
    services::auth_service::{JwtKeys, hash_password, verify_password},
    validation::{Validate, is_valid_email},
};
use uuid::Uuid;

#[test]
fn average_is_zero_for_unrated_store() {
    assert_eq!(format_average(0, 0), "0.0");
    assert_eq!(RatingSummary::from_totals(0, 0).total_ratings, 0);
}

#[test]
fn average_uses_one_decimal_rounding_half_up() {
    // 5 + 3 + 4
    assert_eq!(format_average(12, 3), "4.0");
    // 4.25
    assert_eq!(format_average(17, 4), "4.3");
    // 4.33..
    assert_eq!(format_average(13, 3), "4.3");
    // 4.666..
    assert_eq!(format_average(14, 3), "4.7");
    assert_eq!(format_average(5, 2), "2.5");
    assert_eq!(format_average(5, 1), "5.0");
}

#[test]
fn summary_carries_count_and_formatted_average() {
    let summary = RatingSummary::from_totals(9, 2);
    assert_eq!(summary.average_rating, "4.5");
    assert_eq!(summary.total_ratings, 2);
}

#[test]
fn only_normal_users_may_rate() {
    assert!(Operation::SubmitRating.permits(Role::Normal));
    assert!(!Operation::SubmitRating.permits(Role::Admin));
    assert!(!Operation::SubmitRating.permits(Role::StoreOwner));
}

#[test]
fn admin_operations_reject_other_roles() {
    for op in [
        Operation::CreateStore,
        Operation::ListUsers,
        Operation::ManageUsers,
        Operation::ViewDashboard,
    ] {
        assert!(op.permits(Role::Admin), "{op:?}");
        assert!(!op.permits(Role::Normal), "{op:?}");
        assert!(!op.permits(Role::StoreOwner), "{op:?}");
    }
}

#[test]
fn read_operations_allow_every_role() {
    for op in [
        Operation::ReadStores,
        Operation::ReadOwnRatings,
        Operation::ReadStoreRatings,
    ] {
        for role in Role::ALL {
            assert!(op.permits(role), "{op:?} {role}");
        }
        assert!(!op.is_mutating());
    }
    assert!(Operation::SubmitRating.is_mutating());
}

#[test]
fn only_writes_recheck_the_stored_role() {
    for op in [
        Operation::SubmitRating,
        Operation::CreateStore,
        Operation::ManageUsers,
    ] {
        assert!(op.is_mutating(), "{op:?}");
    }
    for op in [Operation::ListUsers, Operation::ViewDashboard] {
        assert!(!op.is_mutating(), "{op:?}");
    }
}

#[test]
fn role_parses_only_known_names() {
    assert_eq!("store_owner".parse::<Role>(), Ok(Role::StoreOwner));
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert!("superuser".parse::<Role>().is_err());
    assert!("Admin".parse::<Role>().is_err());
}

#[test]
fn rating_outside_range_is_rejected() {
    let store_id = Uuid::new_v4();
    for rating in [0, 6, -1] {
        let req = SubmitRatingRequest { store_id, rating };
        assert!(req.validate().is_err(), "rating {rating} accepted");
    }
    for rating in 1..=5 {
        let req = SubmitRatingRequest { store_id, rating };
        assert!(req.validate().is_ok(), "rating {rating} rejected");
    }
}

#[test]
fn registration_reports_every_bad_field() {
    let req = RegisterRequest {
        name: "A".into(),
        email: "not-an-email".into(),
        password: "123".into(),
        address: Some("x".repeat(401)),
    };
    let errors = req.validate().expect_err("invalid");
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().any(|e| e.contains("\"name\"")));
    assert!(errors.iter().any(|e| e.contains("\"email\"")));
    assert!(errors.iter().any(|e| e.contains("\"password\"")));
    assert!(errors.iter().any(|e| e.contains("\"address\"")));
}

#[test]
fn registration_accepts_boundary_lengths() {
    let req = RegisterRequest {
        name: "x".repeat(60),
        email: "someone@example.com".into(),
        password: "123456".into(),
        address: Some("y".repeat(400)),
    };
    assert!(req.validate().is_ok());

    let too_long = RegisterRequest {
        name: "x".repeat(61),
        ..req
    };
    assert!(too_long.validate().is_err());
}

#[test]
fn registration_body_cannot_carry_a_role() {
    let req: RegisterRequest = serde_json::from_value(serde_json::json!({
        "name": "Mallory",
        "email": "mallory@example.com",
        "password": "password123",
        "role": "admin"
    }))
    .expect("unknown fields are ignored");
    assert!(req.validate().is_ok());
}

#[test]
fn login_only_requires_both_fields() {
    let malformed = LoginRequest {
        email: "not-an-email".into(),
        password: "whatever".into(),
    };
    assert!(malformed.validate().is_ok());

    let empty = LoginRequest {
        email: String::new(),
        password: String::new(),
    };
    assert_eq!(empty.validate().expect_err("empty").len(), 2);
}

#[test]
fn store_without_address_is_valid() {
    let req = CreateStoreRequest {
        name: "Corner Shop".into(),
        email: "shop@example.com".into(),
        address: None,
        owner_id: None,
    };
    assert!(req.validate().is_ok());
}

#[test]
fn email_shape_check() {
    assert!(is_valid_email("user@example.com"));
    assert!(is_valid_email("first.last@sub.example.org"));
    assert!(!is_valid_email("user@localhost"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("user@@example.com"));
    assert!(!is_valid_email("us er@example.com"));
    assert!(!is_valid_email(""));
}

#[test]
fn issued_token_decodes_to_same_identity() {
    let keys = JwtKeys::new(&SecretString::from("unit-secret"));
    let user_id = Uuid::new_v4();
    let token = keys
        .issue(user_id, "owner@example.com", Role::StoreOwner)
        .expect("issue");

    let claims = keys.decode(&token).expect("decode");
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.email, "owner@example.com");
    assert_eq!(claims.role, Role::StoreOwner);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
}

#[test]
fn expired_or_foreign_token_is_unauthorized() {
    let keys = JwtKeys::new(&SecretString::from("unit-secret"));
    let now = chrono::Utc::now().timestamp() as usize;
    let expired = keys
        .sign(&Claims {
            user_id: Uuid::new_v4(),
            email: "old@example.com".into(),
            role: Role::Normal,
            iat: now - 2 * 24 * 3600,
            exp: now - 24 * 3600,
        })
        .expect("sign");
    assert!(matches!(keys.decode(&expired), Err(AppError::Unauthorized(_))));

    let other = JwtKeys::new(&SecretString::from("another-secret"));
    let token = other
        .issue(Uuid::new_v4(), "x@example.com", Role::Normal)
        .expect("issue");
    assert!(matches!(keys.decode(&token), Err(AppError::Unauthorized(_))));
}

#[test]
fn password_hash_verifies_only_original() {
    let hash = hash_password("s3cret-pass").expect("hash");
    assert_ne!(hash, "s3cret-pass");
    assert!(verify_password("s3cret-pass", &hash).expect("verify"));
    assert!(!verify_password("wrong-pass", &hash).expect("verify"));
}

#[test]
fn bearer_header_parsing() {
    assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
    assert_eq!(bearer_token("Bearer "), None);
    assert_eq!(bearer_token("Basic abc"), None);
}

#[test]
fn paging_defaults_and_clamps() {
    assert_eq!(normalize_page(None, None), (1, 10, 0));
    assert_eq!(normalize_page(Some(3), Some(20)), (3, 20, 40));
    assert_eq!(normalize_page(Some(0), Some(500)), (1, 100, 0));
    assert_eq!(normalize_page(Some(-2), Some(0)), (1, 1, 0));
}

#[test]
fn pagination_rounds_pages_up() {
    let p = Pagination::new(2, 10, 21);
    assert_eq!(p.total_pages, 3);
    assert_eq!(p.current_page, 2);
    assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
}

#[test]
fn search_wildcards_are_escaped() {
    assert_eq!(like_pattern("tech"), "%tech%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
}

#[test]
fn sort_columns_come_from_a_closed_set() {
    assert_eq!(StoreSortBy::default().as_sql(), "s.name");
    assert_eq!(StoreSortBy::TotalRatings.as_sql(), "COUNT(r.id)");
    let parsed: StoreSortBy = serde_json::from_str("\"average_rating\"").expect("known column");
    assert_eq!(parsed.as_sql(), "COALESCE(AVG(r.rating), 0)");
    assert!(serde_json::from_str::<StoreSortBy>("\"name; DROP TABLE users\"").is_err());
}

#[test]
fn environment_and_origins_parse() {
    assert_eq!(Environment::parse("PRODUCTION"), Environment::Production);
    assert_eq!(Environment::parse("staging"), Environment::Development);
    assert_eq!(
        split_origins(" http://a.test , ,http://b.test"),
        vec!["http://a.test".to_string(), "http://b.test".to_string()]
    );
}
