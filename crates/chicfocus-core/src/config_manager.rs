//! 설정 파일 관리.
//!
//! `<config_dir>/chicfocus/config.json`을 읽고 쓴다. 읽은 값과 바꿀 값은 모두
//! [`AppConfig::validate`]를 통과해야 하며, 저장은 임시 파일 + rename으로 한다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.json";
const APP_NAME: &str = "chicfocus";

/// 설정 관리자. 복제하면 같은 설정을 공유한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: Arc<RwLock<AppConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 기본 파일로 생성
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(platform_dirs()?.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 지정 경로로 생성. 파일이 없으면 기본 설정을 써 둔다.
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let config = if path.exists() {
            read_config(&path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!("기본 설정 파일 생성: {}", path.display());
            config
        };

        Ok(Self {
            current: Arc::new(RwLock::new(config)),
            path,
        })
    }

    /// 현재 설정 (복제본)
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 설정 교체 후 저장. 검증에 실패하면 파일도 메모리도 그대로 둔다.
    pub fn update(&self, config: AppConfig) -> Result<(), CoreError> {
        config.validate()?;
        write_config(&self.path, &config)?;
        *self.current.write() = config;
        debug!("설정 저장: {}", self.path.display());
        Ok(())
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// 파일에서 다시 읽기 (외부 편집 반영)
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config;
        info!("설정 다시 로드: {}", self.path.display());
        Ok(())
    }

    /// 플랫폼 데이터 디렉토리 (사이클 저장 파일 위치)
    ///
    /// - macOS: `~/Library/Application Support/chicfocus`
    /// - Windows: `%APPDATA%\chicfocus\data`
    /// - Linux: `~/.local/share/chicfocus`
    pub fn data_dir() -> Result<PathBuf, CoreError> {
        Ok(platform_dirs()?.data_dir().to_path_buf())
    }
}

fn platform_dirs() -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{} 읽기 실패: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("{} 파싱 실패: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CoreError::Config(format!("{} 생성 실패: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| CoreError::Config(format!("{} 저장 실패: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(manager.get().web.port, 5000);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn update_persists_across_managers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        let mut config = manager.get();
        config.web.port = 8080;
        config.reconnect.max_attempts = None;
        manager.update(config).unwrap();

        let reloaded = ConfigManager::with_path(path).unwrap().get();
        assert_eq!(reloaded.web.port, 8080);
        assert_eq!(reloaded.reconnect.max_attempts, None);
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::with_path(path.clone()).unwrap();

        let mut config = manager.get();
        config.timer.daily_limit = 0;
        let err = manager.update(config).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(manager.get().timer.daily_limit, 5);
        assert_eq!(ConfigManager::with_path(path).unwrap().get().timer.daily_limit, 5);
    }

    #[test]
    fn reload_picks_up_external_edit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        fs::write(&path, r#"{"timer": {"daily_limit": 2}}"#).unwrap();

        manager.reload().unwrap();
        assert_eq!(manager.get().timer.daily_limit, 2);
        assert_eq!(manager.get().cycle.length_days, 7);
    }

    #[test]
    fn broken_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = ConfigManager::with_path(path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn out_of_range_file_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"market": {"event_chance": 2.0}}"#).unwrap();

        let err = ConfigManager::with_path(path).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
