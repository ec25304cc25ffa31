use poem_openapi::payload::Json;

use super::{authorize, error_json};
use crate::{
    error::SyncError,
    kosync_api::models::{
        AuthResponseDto, AuthorizedDto, CreateUserRequestDto, CreateUserResponseDto,
    },
    sync::SyncService,
};

pub struct UserService<'a> {
    pub sync: &'a SyncService,
}

impl<'a> UserService<'a> {
    pub fn new(sync: &'a SyncService) -> Self {
        Self { sync }
    }

    #[tracing::instrument(level = "debug", skip(self, req), fields(username = %req.username))]
    pub fn create(&self, req: CreateUserRequestDto) -> CreateUserResponseDto {
        match self.sync.create_user(&req.username, &req.password) {
            Ok(created) => CreateUserResponseDto::Created(Json(created.into())),
            Err(SyncError::RegistrationDisabled) => {
                CreateUserResponseDto::Unauthorized(error_json("Registration disabled"))
            }
            Err(SyncError::AlreadyExists(_)) => {
                CreateUserResponseDto::PaymentRequired(error_json("Username is already registered"))
            }
            Err(SyncError::InvalidUsername(reason)) => {
                CreateUserResponseDto::BadRequest(error_json(format!("Invalid username: {reason}")))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register user");
                CreateUserResponseDto::InternalError(error_json("Internal Error"))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, auth_key))]
    pub fn auth(&self, username: Option<&str>, auth_key: Option<&str>) -> AuthResponseDto {
        match authorize(self.sync, username, auth_key) {
            Ok(_) => AuthResponseDto::Ok(Json(AuthorizedDto {
                authorized: "OK".into(),
            })),
            Err(SyncError::Unauthorized) => AuthResponseDto::Unauthorized(error_json("Unauthorized")),
            Err(e) => {
                tracing::error!(error = %e, "failed to authenticate");
                AuthResponseDto::InternalError(error_json("Internal Error"))
            }
        }
    }
}
