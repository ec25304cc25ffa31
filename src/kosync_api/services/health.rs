use poem_openapi::payload::{Json, PlainText};

use crate::kosync_api::models::{HealthDto, HealthResponseDto};

pub const BANNER: &str = "koreader_sync: koreader progress sync server";

pub struct HealthService;

impl HealthService {
    pub fn health(&self) -> HealthResponseDto {
        HealthResponseDto::Ok(Json(HealthDto { state: "OK".into() }))
    }

    pub fn banner(&self) -> PlainText<String> {
        PlainText(BANNER.to_string())
    }
}
