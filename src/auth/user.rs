use axum::async_trait;
use axum::extract::{FromRequest, RequestParts};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{unauthorized_error, Error};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// The caller of an API operation, as asserted by the upstream gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: Uuid, roles: Vec<String>) -> Self {
        Self { id, roles }
    }

    fn id_equals_id(&self, id: Uuid) -> bool {
        self.id == id
    }

    fn id_equals_nullable_id(&self, optional_id: Option<Uuid>) -> bool {
        optional_id.map_or(false, |id| self.id == id)
    }

    fn has_role(&self, role: String) -> bool {
        self.roles.iter().any(|x| x == &role)
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("id", |recv: &User| recv.id)
            .add_attribute_getter("roles", |recv: &User| recv.roles.clone())
            .add_method("id_equals_id", User::id_equals_id)
            .add_method("id_equals_nullable_id", User::id_equals_nullable_id)
            .add_method("has_role", User::has_role)
    }

    fn get_polar_class() -> oso::Class {
        User::get_polar_class_builder().build()
    }
}

#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let headers = req.headers();

        let id = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| {
                tracing::info!("request without a valid {} header", USER_ID_HEADER);
                unauthorized_error()
            })?;

        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(|role| role.trim().to_ascii_lowercase())
                    .filter(|role| !role.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(User::new(id, roles))
    }
}

#[test]
fn user_is_extracted_from_gateway_headers() {
    use axum::http::Request;

    let id = Uuid::new_v4();
    let request = Request::builder()
        .header("X-User-Id", id.to_string())
        .header("X-User-Roles", "Customer, driver,")
        .body(())
        .unwrap();

    let mut parts = RequestParts::new(request);
    let user = tokio_test::block_on(User::from_request(&mut parts)).unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.roles, vec!["customer".to_string(), "driver".to_string()]);
}

#[test]
fn missing_roles_header_yields_no_roles() {
    use axum::http::Request;

    let request = Request::builder()
        .header("X-User-Id", Uuid::new_v4().to_string())
        .body(())
        .unwrap();

    let mut parts = RequestParts::new(request);
    let user = tokio_test::block_on(User::from_request(&mut parts)).unwrap();

    assert!(user.roles.is_empty());
}

#[test]
fn request_without_valid_identity_is_rejected() {
    use axum::http::Request;

    for request in [
        Request::builder().body(()).unwrap(),
        Request::builder()
            .header("X-User-Id", "not-a-uuid")
            .body(())
            .unwrap(),
    ] {
        let mut parts = RequestParts::new(request);
        let err = tokio_test::block_on(User::from_request(&mut parts)).unwrap_err();

        assert_eq!(err, unauthorized_error());
    }
}
