//! 表格渲染与转义

use std::fmt::Write;

use crate::app::users::model::User;

/// 删除按钮上记录位置的属性名
pub const POSITION_ATTRIBUTE: &str = "data-position";

/// 转义 `& < > " '`，`&` 必须最先处理
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// 生成表格主体：每条记录一行，序号从 1 开始，删除按钮带 0 起始的位置
pub fn render_rows(users: &[User]) -> String {
    let mut html = String::new();
    for (position, user) in users.iter().enumerate() {
        let number = position + 1;
        // 写入 String 不会失败
        let _ = write!(
            html,
            "<tr>\
             <td>{number}</td>\
             <td>{name}</td>\
             <td>{email}</td>\
             <td><button type=\"button\" {POSITION_ATTRIBUTE}=\"{position}\" \
             aria-label=\"Delete user {number}\">Delete</button></td>\
             </tr>\n",
            name = escape_html(&user.name),
            email = escape_html(&user.email),
        );
    }
    html
}

/// 按 `parseInt(value, 10)` 的规则解析位置标记：
/// 跳过前导空白，可选符号，取开头的十进制数字，没有数字则失败
pub fn parse_position(marker: &str) -> Option<i64> {
    let trimmed = marker.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}
