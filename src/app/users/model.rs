//! 用户数据模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::CoreError;

/// 用户记录
///
/// 没有 id 字段，记录在集合中的位置（从 0 开始）就是它的键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "nombre")]
    pub name: String,
    pub email: String,
}

/// 客户端提交的新用户，两个字段都已去除首尾空白
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }
}

/// `action=create` 的请求体
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateUserRequest {
    /// 校验并生成待追加的记录；错误信息列出所有缺失字段
    pub fn into_user(self) -> Result<User, CoreError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();

        let missing: Vec<&str> = [("name", name), ("email", email)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        Ok(User {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// `action=delete` 的请求体
///
/// `index` 保留为原始 JSON 值，浮点数、字符串等都要当作无效索引处理。
#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub index: Value,
}

impl DeleteUserRequest {
    /// 在长度为 `len` 的集合中解析出要删除的位置
    pub fn position(&self, len: usize) -> Result<usize, CoreError> {
        let index = self
            .index
            .as_i64()
            .ok_or_else(|| CoreError::Validation(format!("invalid index: {}", self.index)))?;

        usize::try_from(index)
            .ok()
            .filter(|&position| position < len)
            .ok_or_else(|| {
                CoreError::Validation(format!("index {index} out of range (0..{len})"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: Value) -> Result<User, CoreError> {
        serde_json::from_value::<CreateUserRequest>(body)
            .unwrap()
            .into_user()
    }

    fn position(body: Value, len: usize) -> Result<usize, CoreError> {
        serde_json::from_value::<DeleteUserRequest>(body)
            .unwrap()
            .position(len)
    }

    #[test]
    fn create_trims_fields() {
        let user = create(json!({"name": "  Ana ", "email": "\tana@x.com\n"})).unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@x.com");
    }

    #[test]
    fn create_names_every_missing_field() {
        let err = create(json!({"name": "   "})).unwrap_err();
        assert_eq!(err.to_string(), "missing required field(s): name, email");

        let err = create(json!({"name": "Ana", "email": ""})).unwrap_err();
        assert_eq!(err.to_string(), "missing required field(s): email");
    }

    #[test]
    fn create_accepts_legacy_key() {
        let user = create(json!({"nombre": "Ana", "email": "ana@x.com"})).unwrap();
        assert_eq!(user.name, "Ana");
    }

    #[test]
    fn position_accepts_in_range_integers() {
        assert_eq!(position(json!({"index": 0}), 2).unwrap(), 0);
        assert_eq!(position(json!({"index": 1}), 2).unwrap(), 1);
    }

    #[test]
    fn position_rejects_out_of_range() {
        assert!(position(json!({"index": 2}), 2).is_err());
        assert!(position(json!({"index": -1}), 2).is_err());
        assert!(position(json!({"index": 0}), 0).is_err());
    }

    #[test]
    fn position_rejects_non_integers() {
        assert!(position(json!({"index": 1.5}), 3).is_err());
        assert!(position(json!({"index": "1"}), 3).is_err());
        assert!(position(json!({}), 3).is_err());
    }

    #[test]
    fn new_user_completeness() {
        assert!(NewUser::new(" a ", "b").is_complete());
        assert!(!NewUser::new("  ", "b").is_complete());
    }
}
