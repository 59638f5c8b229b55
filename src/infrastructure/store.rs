//! 用户集合的持久化存储
//!
//! 集合整体读取、整体重写。`JsonFileStore` 通过同目录下的 `.lock`
//! 文件加排他锁，使读-改-写在线程之间和进程之间都串行执行；
//! 写入先落到临时文件再重命名，读者不会看到写了一半的文件。

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::app::users::model::User;

/// 存储错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored data in {} is not a valid user list: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
    #[error("background task failed: {0}")]
    Background(String),
}

/// 一次事务内对集合的修改；返回 `true` 表示需要持久化
pub type Mutation<'a> = &'a mut dyn FnMut(&mut Vec<User>) -> bool;

/// 有序用户集合的存储
pub trait UserStore: Send + Sync {
    /// 读取当前集合
    fn load(&self) -> Result<Vec<User>, StoreError>;

    /// 在排他锁内执行 读取 → 修改 → 持久化，返回修改后的集合
    fn transaction(&self, mutation: Mutation<'_>) -> Result<Vec<User>, StoreError>;
}

/// 基于 JSON 文件的存储
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    gate: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self {
            path,
            lock_path,
            gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))
            }
            _ => Ok(()),
        }
    }

    /// 打开锁文件并加锁，文件关闭时自动释放
    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| self.io_error(&self.lock_path, e))?;
        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| self.io_error(&self.lock_path, e))?;
        Ok(file)
    }

    fn read(&self) -> Result<Vec<User>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, users: &[User]) -> Result<(), StoreError> {
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let content = serde_json::to_vec_pretty(users).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut file = File::create(&tmp_path).map_err(|e| self.io_error(&tmp_path, e))?;
        file.write_all(&content)
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(&tmp_path, e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        debug!(path = %self.path.display(), count = users.len(), "用户集合已写入");
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Result<Vec<User>, StoreError> {
        let _gate = self.gate.lock().map_err(|_| StoreError::Poisoned)?;
        let _lock = self.lock(false)?;
        self.read()
    }

    fn transaction(&self, mutation: Mutation<'_>) -> Result<Vec<User>, StoreError> {
        let _gate = self.gate.lock().map_err(|_| StoreError::Poisoned)?;
        let _lock = self.lock(true)?;
        let stored = self.read()?;
        let mut working = stored.clone();
        if mutation(&mut working) {
            self.write(&working)?;
            Ok(working)
        } else {
            Ok(stored)
        }
    }
}

/// 内存存储，用于测试和不需要持久化的场景
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

impl UserStore for MemoryStore {
    fn load(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(users.clone())
    }

    fn transaction(&self, mutation: Mutation<'_>) -> Result<Vec<User>, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        let mut working = users.clone();
        if mutation(&mut working) {
            *users = working;
        }
        Ok(users.clone())
    }
}
