//! 用户目录业务服务

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::model::{CreateUserRequest, DeleteUserRequest, User};
use crate::core::error::CoreError;
use crate::infrastructure::store::{StoreError, UserStore};

/// 存储操作的默认等待上限
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    timeout: Duration,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    /// 存储在 `timeout` 内没有完成时返回 `CoreError::Timeout`
    pub fn with_timeout(store: Arc<dyn UserStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// 按存储顺序返回完整集合
    pub async fn list(&self) -> Result<Vec<User>, CoreError> {
        self.blocking(|store| store.load()).await
    }

    /// 校验后追加到末尾，返回更新后的完整集合
    pub async fn create(&self, request: CreateUserRequest) -> Result<Vec<User>, CoreError> {
        let user = request.into_user()?;
        let users = self
            .blocking(move |store| {
                store.transaction(&mut |users| {
                    users.push(user.clone());
                    true
                })
            })
            .await?;
        info!(count = users.len(), "已添加用户");
        Ok(users)
    }

    /// 删除指定位置的记录，后续记录依次前移
    pub async fn delete(&self, request: DeleteUserRequest) -> Result<Vec<User>, CoreError> {
        let (users, rejection) = self
            .blocking(move |store| {
                let mut rejection = None;
                let users = store.transaction(&mut |users| {
                    match request.position(users.len()) {
                        Ok(position) => {
                            users.remove(position);
                            true
                        }
                        Err(e) => {
                            rejection = Some(e);
                            false
                        }
                    }
                })?;
                Ok((users, rejection))
            })
            .await?;

        if let Some(e) = rejection {
            return Err(e);
        }
        info!(count = users.len(), "已删除用户");
        Ok(users)
    }

    /// 文件读写放到阻塞线程池里执行，超时后放弃等待。
    /// 阻塞线程无法取消，会在拿到锁之后自行结束。
    async fn blocking<T, F>(&self, operation: F) -> Result<T, CoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn UserStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || operation(store.as_ref()));
        let result = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| CoreError::Timeout(self.timeout))?
            .map_err(|e| StoreError::Background(e.to_string()))?;
        Ok(result?)
    }
}
