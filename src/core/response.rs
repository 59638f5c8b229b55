//! 核心响应处理模块

use serde::{Deserialize, Serialize};

/// API 响应信封
///
/// 所有响应都是 `{ok, data?, error?}`。成功时携带完整的当前集合，
/// 失败时只携带错误描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data() {
        let json = serde_json::to_value(Envelope::<Vec<u8>>::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"ok": false, "error": "boom"}));
    }

    #[test]
    fn success_omits_error() {
        let json = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "data": [1, 2]}));
    }
}
