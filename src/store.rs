//! 状态记录落盘：固定路径上的 JSON 仓储
//!
//! 记录文件是跨调用的唯一事实来源；文件不存在视为全新状态，
//! 不是错误。存在但解析不了则按致命错误上抛，不悄悄丢弃用户状态。

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pomodoro::Phase;

/// 状态文件名
pub const RECORD_FILENAME: &str = "tomato_bar_status.json";

/// 仓储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 记录存在但格式坏了（字段缺失、未知字段或不是合法 JSON）
    #[error("状态记录无法解析: {0}")]
    Corrupt(#[from] serde_json::Error),
    /// 读写或删除失败（权限、磁盘等）
    #[error("状态文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 落盘的状态记录（秒级精度，字段一一对应 `Pomo`）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateRecord {
    pub status: Phase,
    pub sprint_circle: u32,
    /// 计时锚点，Unix 秒级时间戳
    #[serde(with = "ts_seconds")]
    pub started_time: DateTime<Utc>,
    /// 已用时长（秒）
    pub elapsed_time: i64,
    pub is_paused: bool,
    /// 暂停快照（秒）
    pub delta: i64,
}

/// 记录仓储接口：注入依赖，测试时可换成内存实现
pub trait RecordStore {
    /// 读取记录；文件不存在返回 `Ok(None)`
    fn load(&self) -> Result<Option<StateRecord>, StoreError>;
    fn save(&self, record: &StateRecord) -> Result<(), StoreError>;
    fn delete(&self) -> Result<(), StoreError>;
}

/// 状态文件的默认位置：优先 XDG 运行时目录，退回系统临时目录
pub fn default_record_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(RECORD_FILENAME)
}

/// 文件仓储
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_path() -> Self {
        Self::new(default_record_path())
    }
}

impl RecordStore for FileStore {
    fn load(&self) -> Result<Option<StateRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// 先写临时文件再重命名，避免刷新间隔重叠时读到半截记录
    fn save(&self, record: &StateRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            // 重复重置不算错
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            other => other.map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> StateRecord {
        StateRecord {
            status: Phase::Work,
            sprint_circle: 3,
            started_time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            elapsed_time: 125,
            is_paused: true,
            delta: 125,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tomato_bar_test_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn record_roundtrips_through_json() {
        let record = sample_record();
        let text = serde_json::to_string(&record).unwrap();
        let back: StateRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_uses_wire_field_names() {
        let text = serde_json::to_string(&sample_record()).unwrap();
        for key in [
            "\"status\":\"WORK\"",
            "\"sprint_circle\":3",
            "\"started_time\":1700000000",
            "\"elapsed_time\":125",
            "\"is_paused\":true",
            "\"delta\":125",
        ] {
            assert!(text.contains(key), "missing {key} in {text}");
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = r#"{"status":"WORK","sprint_circle":1,"started_time":0,
            "elapsed_time":0,"is_paused":true,"delta":0,"surprise":1}"#;
        assert!(serde_json::from_str::<StateRecord>(text).is_err());
    }

    #[test]
    fn load_missing_file_is_none() {
        let store = FileStore::new(temp_path("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_load_delete_cycle() {
        let store = FileStore::new(temp_path("cycle"));
        let record = sample_record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));

        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
        // 文件已不存在时再删一次仍然成功
        store.delete().unwrap();
    }

    #[test]
    fn corrupt_file_surfaces_corrupt_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "{'status': 'WORK', not json at all").unwrap();
        match FileStore::new(path).load() {
            Err(StoreError::Corrupt(_)) => {}
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }
}
