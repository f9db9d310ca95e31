//! 저장소 에러.

use chicfocus_core::error::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// 저장소 레이어 에러
#[derive(Debug, Error)]
pub enum StoreError {
    /// 파일 읽기/쓰기 실패
    #[error("저장 파일 I/O 실패: {path}: {source}")]
    Io {
        /// 대상 경로
        path: PathBuf,
        /// 원인
        #[source]
        source: std::io::Error,
    },

    /// 저장 파일 형식 오류
    #[error("저장 파일 파싱 실패: {path}: {source}")]
    Corrupt {
        /// 대상 경로
        path: PathBuf,
        /// 원인
        #[source]
        source: serde_json::Error,
    },

    /// 코어 에러
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => core,
            other => CoreError::Internal(other.to_string()),
        }
    }
}
