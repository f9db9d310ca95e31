//! 파일 기반 사이클 저장소.
//!
//! `<data_dir>/chickens.json` 하나에 전체 사이클 데이터를 저장한다.
//! 변경마다 임시 파일에 쓰고 rename으로 교체한다.

use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::scoreboard::CycleWinner;
use chicfocus_core::models::session::FocusSession;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cycle::{CycleData, UserRecord};
use crate::error::StoreError;

/// 저장 파일 이름
pub const DATA_FILE_NAME: &str = "chickens.json";

/// 사이클 저장소
pub struct CycleStore {
    /// 저장 파일 경로 (None이면 메모리 전용)
    path: Option<PathBuf>,
    data: Mutex<CycleData>,
}

impl CycleStore {
    /// 디렉토리 아래 저장 파일을 열거나 새로 만든다
    pub fn open_dir(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Self::open(&data_dir.join(DATA_FILE_NAME))
    }

    /// 저장 파일을 열거나 새로 만든다
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut data: CycleData =
                serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                })?;
            for identity in Identity::ALL {
                data.user_mut(identity);
            }
            debug!("사이클 데이터 로드: {}", path.display());
            data
        } else {
            let data = CycleData::fresh(Utc::now(), None);
            write_file(path, &data)?;
            info!("새 사이클 데이터 생성: {}", path.display());
            data
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    /// 메모리 전용 저장소 (테스트용)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(CycleData::fresh(Utc::now(), None)),
        }
    }

    /// 저장 파일 경로
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 전체 데이터 복제본
    pub fn data(&self) -> CycleData {
        self.data.lock().clone()
    }

    /// 참가자 레코드 복제본
    pub fn user(&self, identity: Identity) -> UserRecord {
        self.data.lock().user(identity)
    }

    /// 완료 세션 추가
    pub fn record_session(
        &self,
        identity: Identity,
        mut session: FocusSession,
    ) -> Result<(), StoreError> {
        session.completed = true;
        self.mutate(|data| data.user_mut(identity).sessions.push(session))
    }

    /// 챌린지 보너스 추가
    pub fn add_challenge_bonus(&self, identity: Identity, points: i64) -> Result<(), StoreError> {
        self.mutate(|data| data.user_mut(identity).challenge_bonus += points)
    }

    /// 사이클 종료: 잠금 안에서 현재 점수로 승자를 정해 기록하고 `now`부터 새 사이클 시작
    ///
    /// 종료 직전 데이터를 반환한다. 승자는 반환값의 [`CycleData::leader`]와 같다.
    pub fn reset_cycle(&self, now: DateTime<Utc>) -> Result<CycleData, StoreError> {
        let mut data = self.data.lock();
        let winner = data.leader();
        let finished = std::mem::replace(&mut *data, CycleData::fresh(now, Some(winner)));
        if let Err(e) = self.persist(&*data) {
            warn!("사이클 초기화 저장 실패, 이전 데이터 복원: {e}");
            *data = finished;
            return Err(e);
        }
        info!("사이클 종료: 승자 {winner}");
        Ok(finished)
    }

    /// 데이터 변경 후 즉시 저장. 저장 실패 시 변경을 되돌린다.
    fn mutate<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut CycleData),
    {
        let mut data = self.data.lock();
        let before = data.clone();
        change(&mut *data);
        if let Err(e) = self.persist(&*data) {
            *data = before;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self, data: &CycleData) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_file(path, data),
            None => Ok(()),
        }
    }
}

/// 임시 파일에 쓴 뒤 rename
fn write_file(path: &Path, data: &CycleData) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chicfocus_core::models::tier::Tier;
    use tempfile::TempDir;

    #[test]
    fn creates_file_on_first_open() {
        let dir = TempDir::new().unwrap();
        let store = CycleStore::open_dir(dir.path()).unwrap();
        assert!(dir.path().join(DATA_FILE_NAME).exists());
        assert_eq!(store.user(Identity::Luu).sessions.len(), 0);
    }

    #[test]
    fn sessions_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = CycleStore::open_dir(dir.path()).unwrap();
            store
                .record_session(Identity::Keni, FocusSession::begin("math", Tier::Heavy))
                .unwrap();
            store.add_challenge_bonus(Identity::Keni, 5).unwrap();
        }

        let store = CycleStore::open_dir(dir.path()).unwrap();
        let keni = store.user(Identity::Keni);
        assert_eq!(keni.sessions.len(), 1);
        assert!(keni.sessions[0].completed);
        assert_eq!(keni.total_points(), 8);
    }

    #[test]
    fn reset_cycle_clears_users_and_keeps_winner() {
        let dir = TempDir::new().unwrap();
        let store = CycleStore::open_dir(dir.path()).unwrap();
        store
            .record_session(Identity::Luu, FocusSession::begin("essay", Tier::Light))
            .unwrap();

        let now = Utc::now();
        let finished = store.reset_cycle(now).unwrap();
        assert_eq!(finished.user(Identity::Luu).sessions.len(), 1);
        assert_eq!(finished.leader(), CycleWinner::User(Identity::Luu));

        let reopened = CycleStore::open_dir(dir.path()).unwrap().data();
        assert_eq!(reopened.winner, Some(CycleWinner::User(Identity::Luu)));
        assert_eq!(reopened.cycle_start, now);
        assert!(reopened.user(Identity::Luu).sessions.is_empty());
    }

    #[test]
    fn reset_cycle_decides_winner_from_latest_data() {
        let store = CycleStore::in_memory();
        store
            .record_session(Identity::Luu, FocusSession::begin("essay", Tier::Light))
            .unwrap();
        store
            .record_session(Identity::Keni, FocusSession::begin("math", Tier::Heavy))
            .unwrap();

        let finished = store.reset_cycle(Utc::now()).unwrap();
        assert_eq!(finished.user(Identity::Keni).total_points(), 3);
        assert_eq!(store.data().winner, Some(CycleWinner::User(Identity::Keni)));
        assert!(store.user(Identity::Keni).sessions.is_empty());
    }

    #[test]
    fn tie_is_recorded_when_points_match() {
        let store = CycleStore::in_memory();
        let finished = store.reset_cycle(Utc::now()).unwrap();
        assert_eq!(finished.leader(), CycleWinner::Tie);
        assert_eq!(store.data().winner, Some(CycleWinner::Tie));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DATA_FILE_NAME), "{ broken").unwrap();
        let err = CycleStore::open_dir(dir.path()).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn in_memory_store_has_no_path() {
        let store = CycleStore::in_memory();
        assert!(store.path().is_none());
        store.add_challenge_bonus(Identity::Luu, 5).unwrap();
        assert_eq!(store.user(Identity::Luu).challenge_bonus, 5);
    }
}
