//! 客户端控制器：首屏加载、表单提交、删除按钮点击

use tracing::{debug, warn};

use super::api::{ApiClient, ClientError};
use super::markup::{parse_position, render_rows};
use super::status::{StatusDisplay, StatusKind, StatusSink};
use crate::app::users::model::{NewUser, User};

pub const MSG_REQUIRED: &str = "Name and email are required.";
pub const MSG_CREATED: &str = "User added.";
pub const MSG_DELETED: &str = "User deleted.";
pub const MSG_CONFIRM_DELETE: &str = "Delete this user?";
pub const FALLBACK_LIST: &str = "Could not load the user list.";
pub const FALLBACK_CREATE: &str = "Could not create the user.";
pub const FALLBACK_DELETE: &str = "Could not delete the user.";

/// 用户表格主体
pub trait TableBody: Send {
    /// 清空后按顺序重新填充
    fn replace(&mut self, users: &[User]);
}

/// 新建用户表单
pub trait CreateForm: Send {
    /// 当前的 (name, email) 原始输入
    fn values(&self) -> (String, String);
    fn reset(&mut self);
}

/// 删除前的确认
pub trait Confirm: Send {
    fn confirm(&mut self, message: &str) -> bool;
}

/// 渲染为 HTML 的表格主体
#[derive(Debug, Default, Clone)]
pub struct HtmlTable {
    html: String,
}

impl HtmlTable {
    pub fn html(&self) -> &str {
        &self.html
    }
}

impl TableBody for HtmlTable {
    fn replace(&mut self, users: &[User]) {
        self.html = render_rows(users);
    }
}

/// 一次用户操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 缺少页面元素、标记无效或用户取消，没有发出请求
    Ignored,
    /// 客户端校验失败，没有发出请求
    Invalid,
    Succeeded,
    Failed,
}

pub struct ClientController<A: ApiClient, S: StatusSink> {
    api: A,
    table: Option<Box<dyn TableBody>>,
    form: Option<Box<dyn CreateForm>>,
    confirm: Box<dyn Confirm>,
    status: StatusDisplay<S>,
}

impl<A: ApiClient, S: StatusSink> ClientController<A, S> {
    /// 表格或表单缺失时，相关操作直接跳过
    pub fn new(
        api: A,
        table: Option<Box<dyn TableBody>>,
        form: Option<Box<dyn CreateForm>>,
        status: StatusDisplay<S>,
        confirm: Box<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            table,
            form,
            confirm,
            status,
        }
    }

    pub fn status(&self) -> &StatusDisplay<S> {
        &self.status
    }

    /// 页面就绪后拉取列表
    pub async fn initial_load(&mut self) -> Outcome {
        if self.table.is_none() {
            debug!("没有表格主体，跳过首屏加载");
            return Outcome::Ignored;
        }
        let result = self.api.list().await;
        self.apply(result, FALLBACK_LIST, None)
    }

    /// 提交新建表单
    pub async fn submit_create(&mut self) -> Outcome {
        let Some(form) = self.form.as_ref() else {
            return Outcome::Ignored;
        };
        let (name, email) = form.values();
        let user = NewUser::new(&name, &email);
        if !user.is_complete() {
            self.status.show(StatusKind::Error, MSG_REQUIRED);
            return Outcome::Invalid;
        }

        let result = self.api.create(&user).await;
        let outcome = self.apply(result, FALLBACK_CREATE, Some(MSG_CREATED));
        if outcome == Outcome::Succeeded {
            if let Some(form) = self.form.as_mut() {
                form.reset();
            }
        }
        outcome
    }

    /// 表格内的点击；`marker` 是最近的删除按钮上的位置标记
    pub async fn click_delete(&mut self, marker: Option<&str>) -> Outcome {
        if self.table.is_none() {
            return Outcome::Ignored;
        }
        let Some(position) = marker.and_then(parse_position) else {
            return Outcome::Ignored;
        };
        if !self.confirm.confirm(MSG_CONFIRM_DELETE) {
            return Outcome::Ignored;
        }

        let result = self.api.delete(position).await;
        self.apply(result, FALLBACK_DELETE, Some(MSG_DELETED))
    }

    fn apply(
        &mut self,
        result: Result<Vec<User>, ClientError>,
        fallback: &str,
        success: Option<&str>,
    ) -> Outcome {
        match result {
            Ok(users) => {
                if let Some(table) = self.table.as_mut() {
                    table.replace(&users);
                }
                if let Some(message) = success {
                    self.status.show(StatusKind::Ok, message);
                }
                Outcome::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "请求失败");
                self.status.show(StatusKind::Error, &e.message_or(fallback));
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{MemoryStore, UserStore};
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    /// 直接操作内存集合的假客户端，语义与服务端一致
    #[derive(Default, Clone)]
    struct FakeApi {
        store: Arc<MemoryStore>,
        calls: Arc<AtomicUsize>,
        offline: bool,
    }

    #[async_trait]
    impl ApiClient for FakeApi {
        async fn list(&self) -> Result<Vec<User>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(ClientError::InvalidResponse("connection refused".into()));
            }
            Ok(self.store.load().unwrap())
        }

        async fn create(&self, user: &NewUser) -> Result<Vec<User>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let user = User {
                name: user.name.clone(),
                email: user.email.clone(),
            };
            Ok(self
                .store
                .transaction(&mut |users| {
                    users.push(user.clone());
                    true
                })
                .unwrap())
        }

        async fn delete(&self, index: i64) -> Result<Vec<User>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let len = self.store.load().unwrap().len();
            let position = usize::try_from(index).ok().filter(|&p| p < len);
            match position {
                Some(p) => Ok(self
                    .store
                    .transaction(&mut |users| {
                        users.remove(p);
                        true
                    })
                    .unwrap()),
                None => Err(ClientError::Rejected(None)),
            }
        }
    }

    #[derive(Clone, Default)]
    struct SharedTable(Arc<Mutex<HtmlTable>>);

    impl TableBody for SharedTable {
        fn replace(&mut self, users: &[User]) {
            self.0.lock().unwrap().replace(users);
        }
    }

    #[derive(Clone, Default)]
    struct SharedForm(Arc<Mutex<(String, String)>>);

    impl SharedForm {
        fn fill(&self, name: &str, email: &str) {
            *self.0.lock().unwrap() = (name.to_string(), email.to_string());
        }
    }

    impl CreateForm for SharedForm {
        fn values(&self) -> (String, String) {
            self.0.lock().unwrap().clone()
        }

        fn reset(&mut self) {
            *self.0.lock().unwrap() = Default::default();
        }
    }

    struct Answer(bool);

    impl Confirm for Answer {
        fn confirm(&mut self, _message: &str) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Slot(Option<(StatusKind, String)>);

    impl StatusSink for Slot {
        fn show(&mut self, kind: StatusKind, text: &str) {
            self.0 = Some((kind, text.to_string()));
        }

        fn clear(&mut self) {
            self.0 = None;
        }
    }

    struct Page {
        api: FakeApi,
        table: SharedTable,
        form: SharedForm,
        controller: ClientController<FakeApi, Slot>,
    }

    fn page(api: FakeApi, confirm: bool) -> Page {
        let table = SharedTable::default();
        let form = SharedForm::default();
        let controller = ClientController::new(
            api.clone(),
            Some(Box::new(table.clone())),
            Some(Box::new(form.clone())),
            StatusDisplay::new(Slot::default()),
            Box::new(Answer(confirm)),
        );
        Page {
            api,
            table,
            form,
            controller,
        }
    }

    fn status(page: &Page) -> Option<(StatusKind, String)> {
        page.controller.status().with_sink(|slot| slot.0.clone())
    }

    fn html(page: &Page) -> String {
        page.table.0.lock().unwrap().html().to_string()
    }

    fn seeded(names: &[&str]) -> FakeApi {
        let users = names
            .iter()
            .map(|name| User {
                name: name.to_string(),
                email: format!("{}@x.com", name.to_lowercase()),
            })
            .collect();
        FakeApi {
            store: Arc::new(MemoryStore::with_users(users)),
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn initial_load_renders_rows() {
        let mut page = page(seeded(&["Ana", "Bea"]), true);
        assert_eq!(page.controller.initial_load().await, Outcome::Succeeded);
        assert!(html(&page).contains("<td>2</td><td>Bea</td>"));
        assert_eq!(status(&page), None);
    }

    #[tokio::test]
    async fn initial_load_failure_shows_error() {
        let api = FakeApi {
            offline: true,
            ..FakeApi::default()
        };
        let mut page = page(api, true);
        assert_eq!(page.controller.initial_load().await, Outcome::Failed);
        assert_eq!(
            status(&page),
            Some((
                StatusKind::Error,
                "invalid response: connection refused".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn blank_form_makes_no_request() {
        let mut page = page(seeded(&[]), true);
        page.form.fill("   ", "a@b.com");
        assert_eq!(page.controller.submit_create().await, Outcome::Invalid);
        assert_eq!(page.api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            status(&page),
            Some((StatusKind::Error, MSG_REQUIRED.to_string()))
        );
        assert_eq!(page.form.values().0, "   ");
    }

    #[tokio::test]
    async fn create_renders_resets_and_confirms() {
        let mut page = page(seeded(&[]), true);
        page.form.fill(" Ana ", "ana@x.com ");
        assert_eq!(page.controller.submit_create().await, Outcome::Succeeded);
        assert!(html(&page).contains("<td>1</td><td>Ana</td><td>ana@x.com</td>"));
        assert_eq!(page.form.values(), (String::new(), String::new()));
        assert_eq!(
            status(&page),
            Some((StatusKind::Ok, MSG_CREATED.to_string()))
        );
    }

    #[tokio::test]
    async fn delete_removes_clicked_row() {
        let mut page = page(seeded(&["Ana", "Bea"]), true);
        page.controller.initial_load().await;
        assert_eq!(
            page.controller.click_delete(Some("0")).await,
            Outcome::Succeeded
        );
        let rendered = html(&page);
        assert!(rendered.contains("<td>1</td><td>Bea</td>"));
        assert!(!rendered.contains("Ana"));
        assert_eq!(
            status(&page),
            Some((StatusKind::Ok, MSG_DELETED.to_string()))
        );
    }

    #[tokio::test]
    async fn delete_ignores_missing_or_bad_markers() {
        let mut page = page(seeded(&["Ana"]), true);
        assert_eq!(page.controller.click_delete(None).await, Outcome::Ignored);
        assert_eq!(
            page.controller.click_delete(Some("x")).await,
            Outcome::Ignored
        );
        assert_eq!(page.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declined_confirmation_aborts_delete() {
        let mut page = page(seeded(&["Ana"]), false);
        assert_eq!(
            page.controller.click_delete(Some("0")).await,
            Outcome::Ignored
        );
        assert_eq!(page.api.store.load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_delete_uses_fallback_text() {
        let mut page = page(seeded(&["Ana", "Bea"]), true);
        assert_eq!(
            page.controller.click_delete(Some("5")).await,
            Outcome::Failed
        );
        assert_eq!(
            status(&page),
            Some((StatusKind::Error, FALLBACK_DELETE.to_string()))
        );
        assert_eq!(page.api.store.load().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_elements_skip_wiring() {
        let api = seeded(&["Ana"]);
        let mut controller = ClientController::new(
            api.clone(),
            None,
            None,
            StatusDisplay::new(Slot::default()),
            Box::new(Answer(true)),
        );
        assert_eq!(controller.initial_load().await, Outcome::Ignored);
        assert_eq!(controller.submit_create().await, Outcome::Ignored);
        assert_eq!(controller.click_delete(Some("0")).await, Outcome::Ignored);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}
