//! 客户端控制器
//!
//! 页面元素通过 trait 句柄注入，控制器本身不依赖浏览器，
//! 既可以驱动终端界面，也可以在测试里用假视图验证。

pub mod api;
pub mod controller;
pub mod markup;
pub mod status;

pub use api::{ApiClient, ClientError, HttpApiClient};
pub use controller::{ClientController, Confirm, CreateForm, HtmlTable, Outcome, TableBody};
pub use markup::{escape_html, parse_position, render_rows};
pub use status::{StatusDisplay, StatusKind, StatusSink, STATUS_CLEAR_DELAY};
