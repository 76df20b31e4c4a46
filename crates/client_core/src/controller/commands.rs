//! Backend commands emitted by the controller for the worker to execute.

use std::{path::PathBuf, time::Duration};

use shared::{domain::Purpose, protocol::TaskRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    CheckSession {
        /// Session generation the result belongs to.
        generation: u64,
    },
    SignOut,
    ListFiles {
        purpose: Purpose,
        prefix: String,
        /// Wait before listing, so a fresh upload is visible.
        delay: Duration,
    },
    Upload {
        purpose: Purpose,
        local_path: PathBuf,
        key: String,
        content_type: &'static str,
    },
    DeleteFile {
        purpose: Purpose,
        key: String,
    },
    PresignDownload {
        key: String,
    },
    SubmitTask {
        request: TaskRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckSession { .. } => "check_session",
            Self::SignOut => "sign_out",
            Self::ListFiles { .. } => "list_files",
            Self::Upload { .. } => "upload",
            Self::DeleteFile { .. } => "delete_file",
            Self::PresignDownload { .. } => "presign_download",
            Self::SubmitTask { request } => request.tag().as_str(),
        }
    }
}
