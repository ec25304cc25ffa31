use poem_openapi::{ApiResponse, Object, payload::Json};

use crate::domain::{CreatedUser, Progress};

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto { message }
    }
}

// ===== Users =====

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "snake_case")]
pub struct CreateUserRequestDto {
    pub username: String,
    pub password: String,
}

/// Registered user. `authKey` is the secret to send as `x-auth-key`.
///
/// `password` and `authKey` both carry that same secret. The client keeps
/// its registered secret as the bearer token, and older clients read it
/// from `password`.
#[derive(Debug, Clone, Object)]
pub struct CreatedUserDto {
    pub username: String,
    pub password: String,
    #[oai(rename = "authKey")]
    pub auth_key: String,
}

impl From<CreatedUser> for CreatedUserDto {
    fn from(u: CreatedUser) -> Self {
        CreatedUserDto {
            username: u.username,
            password: u.auth_key.clone(),
            auth_key: u.auth_key,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct AuthorizedDto {
    pub authorized: String,
}

#[derive(ApiResponse)]
pub enum CreateUserResponseDto {
    /// User registered
    #[oai(status = 201)]
    Created(Json<CreatedUserDto>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    /// Registration disabled
    #[oai(status = 401)]
    Unauthorized(Json<ErrorDto>),

    /// Username is already registered
    #[oai(status = 402)]
    PaymentRequired(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum AuthResponseDto {
    #[oai(status = 200)]
    Ok(Json<AuthorizedDto>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

// ===== Progress =====

/// Progress pushed by a device. A client `timestamp` is accepted but ignored.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "snake_case")]
pub struct ProgressUpdateDto {
    pub document: String,
    #[oai(default)]
    pub percentage: f64,
    #[oai(default)]
    pub progress: String,
    #[oai(default)]
    pub device: String,
    #[oai(default)]
    pub device_id: String,
    pub timestamp: Option<i64>,
}

impl From<ProgressUpdateDto> for Progress {
    fn from(dto: ProgressUpdateDto) -> Self {
        Progress {
            document: dto.document,
            percentage: dto.percentage,
            progress: dto.progress,
            device: dto.device,
            device_id: dto.device_id,
            timestamp: dto.timestamp.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ProgressSavedDto {
    pub document: String,
    /// Server time the record was stored
    pub timestamp: i64,
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "snake_case")]
pub struct ProgressDto {
    pub document: String,
    pub percentage: f64,
    pub progress: String,
    pub device: String,
    pub device_id: String,
    pub timestamp: i64,
}

impl From<Progress> for ProgressDto {
    fn from(p: Progress) -> Self {
        ProgressDto {
            document: p.document,
            percentage: p.percentage,
            progress: p.progress,
            device: p.device,
            device_id: p.device_id,
            timestamp: p.timestamp,
        }
    }
}

#[derive(ApiResponse)]
pub enum ProgressPutResponseDto {
    #[oai(status = 200)]
    Ok(Json<ProgressSavedDto>),

    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum ProgressGetResponseDto {
    #[oai(status = 200)]
    Ok(Json<ProgressDto>),

    /// Empty or unusable document id
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorDto>),

    /// No progress stored for this document
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    #[oai(status = 500)]
    InternalError(Json<ErrorDto>),
}

// ===== Health =====

#[derive(Debug, Clone, Object)]
pub struct HealthDto {
    pub state: String,
}

#[derive(ApiResponse)]
pub enum HealthResponseDto {
    #[oai(status = 200)]
    Ok(Json<HealthDto>),
}
