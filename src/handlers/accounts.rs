use std::str::FromStr;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::{run_blocking, timestamp, Accounts};
use crate::auth::{AdminUser, AuthUser};
use crate::domain::account::{ProfileUpdate, Registration, Role, User};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleRequest {
    /// `admin` or `customer`
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            address: u.address,
            role: u.role.to_string(),
            created_at: timestamp(u.created_at),
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Customer account created", body = UserResponse),
        (status = 400, description = "Invalid email, name or password"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "accounts"
)]
pub async fn register(
    accounts: Accounts,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let registration = Registration {
        email: body.email,
        password: body.password,
        name: body.name,
        address: body.address,
    };
    let user = run_blocking(move || accounts.register(registration)).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "accounts"
)]
pub async fn login(accounts: Accounts, body: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let session = run_blocking(move || accounts.login(&body.email, &body.password)).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token: session.token,
        user: session.user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn get_profile(user: AuthUser, accounts: Accounts) -> Result<HttpResponse, AppError> {
    let profile = run_blocking(move || accounts.profile(user.id)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Name missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn update_profile(
    user: AuthUser,
    accounts: Accounts,
    body: web::Json<ProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let update = ProfileUpdate {
        name: body.name,
        address: body.address,
    };
    let profile = run_blocking(move || accounts.update_profile(user.id, update)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong current password or new one too short"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn change_password(
    user: AuthUser,
    accounts: Accounts,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    run_blocking(move || {
        accounts.change_password(user.id, &body.current_password, &body.new_password)
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed" })))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn list_users(_admin: AdminUser, accounts: Accounts) -> Result<HttpResponse, AppError> {
    let users = run_blocking(move || accounts.list_users()).await?;
    let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /admin/users/{id}
///
/// Removes the user with their orders, reviews and cart. The last admin
/// cannot be removed.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Last admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn delete_user(
    _admin: AdminUser,
    accounts: Accounts,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    run_blocking(move || accounts.delete_user(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = i32, Path, description = "User id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 409, description = "Would demote the last admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
pub async fn set_role(
    _admin: AdminUser,
    accounts: Accounts,
    path: web::Path<i32>,
    body: web::Json<RoleRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let role = Role::from_str(body.role.trim())?;
    let user = run_blocking(move || accounts.set_role(id, role)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
