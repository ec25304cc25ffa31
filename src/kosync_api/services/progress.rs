use poem_openapi::payload::Json;

use super::{authorize, error_json};
use crate::{
    error::SyncError,
    kosync_api::models::{
        ProgressGetResponseDto, ProgressPutResponseDto, ProgressSavedDto, ProgressUpdateDto,
    },
    sync::SyncService,
};

pub struct ProgressService<'a> {
    pub sync: &'a SyncService,
}

impl<'a> ProgressService<'a> {
    pub fn new(sync: &'a SyncService) -> Self {
        Self { sync }
    }

    #[tracing::instrument(level = "debug", skip(self, auth_key, update), fields(document = %update.document))]
    pub fn update(
        &self,
        username: Option<&str>,
        auth_key: Option<&str>,
        update: ProgressUpdateDto,
    ) -> ProgressPutResponseDto {
        let user = match authorize(self.sync, username, auth_key) {
            Ok(user) => user,
            Err(SyncError::Unauthorized) => {
                return ProgressPutResponseDto::Unauthorized(error_json("Unauthorized"));
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to authenticate");
                return ProgressPutResponseDto::InternalError(error_json("Internal Error"));
            }
        };
        match self.sync.save_progress(&user, update.into()) {
            Ok(saved) => ProgressPutResponseDto::Ok(Json(ProgressSavedDto {
                document: saved.document,
                timestamp: saved.timestamp,
            })),
            Err(SyncError::InvalidDocument) => {
                ProgressPutResponseDto::BadRequest(error_json("Invalid document"))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save progress");
                ProgressPutResponseDto::InternalError(error_json("Internal Error"))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, auth_key))]
    pub fn get(
        &self,
        username: Option<&str>,
        auth_key: Option<&str>,
        document: &str,
    ) -> ProgressGetResponseDto {
        let user = match authorize(self.sync, username, auth_key) {
            Ok(user) => user,
            Err(SyncError::Unauthorized) => {
                return ProgressGetResponseDto::Unauthorized(error_json("Unauthorized"));
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to authenticate");
                return ProgressGetResponseDto::InternalError(error_json("Internal Error"));
            }
        };
        match self.sync.get_progress(&user, document) {
            Ok(progress) => ProgressGetResponseDto::Ok(Json(progress.into())),
            Err(SyncError::InvalidDocument) => {
                ProgressGetResponseDto::BadRequest(error_json("Invalid document"))
            }
            Err(SyncError::NotFound(_)) => {
                ProgressGetResponseDto::NotFound(error_json("Document not found"))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read progress");
                ProgressGetResponseDto::InternalError(error_json("Internal Error"))
            }
        }
    }
}
