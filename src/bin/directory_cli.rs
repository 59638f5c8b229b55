//! 终端版用户目录
//! 通过客户端控制器访问正在运行的服务器

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use user_directory::{
    client::{
        controller::Outcome, ClientController, Confirm, CreateForm, HttpApiClient, StatusDisplay,
        StatusKind, StatusSink, TableBody,
    },
    infrastructure::logger::Logger,
    User,
};

#[derive(Debug, Parser)]
#[command(name = "directory_cli", about = "用户目录命令行客户端")]
struct Cli {
    /// 服务器地址
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    url: String,

    /// API 端点路径
    #[arg(long, default_value = "/api")]
    api_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 列出所有用户
    List,
    /// 添加用户
    Add { name: String, email: String },
    /// 按表格中的序号删除用户
    Remove {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
        /// 不再询问确认
        #[arg(long)]
        yes: bool,
    },
}

/// 以文本表格输出
struct TerminalTable;

impl TableBody for TerminalTable {
    fn replace(&mut self, users: &[User]) {
        if users.is_empty() {
            println!("(no users)");
            return;
        }
        println!("{:>4}  {:<24}  {}", "#", "Name", "Email");
        for (position, user) in users.iter().enumerate() {
            println!("{:>4}  {:<24}  {}", position + 1, user.name, user.email);
        }
    }
}

/// 命令行参数充当表单
struct ArgsForm {
    name: String,
    email: String,
}

impl CreateForm for ArgsForm {
    fn values(&self) -> (String, String) {
        (self.name.clone(), self.email.clone())
    }

    fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
    }
}

/// 从标准输入读取确认
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

struct TerminalStatus;

impl StatusSink for TerminalStatus {
    fn show(&mut self, kind: StatusKind, text: &str) {
        match kind {
            StatusKind::Ok => println!("✅ {text}"),
            StatusKind::Error => eprintln!("❌ {text}"),
        }
    }

    fn clear(&mut self) {}
}

#[tokio::main]
async fn main() -> ExitCode {
    Logger::init("warn");
    let cli = Cli::parse();

    let api = HttpApiClient::new(&cli.url, &cli.api_path);
    let (form, assume_yes) = match &cli.command {
        Command::Add { name, email } => (
            Some(Box::new(ArgsForm {
                name: name.clone(),
                email: email.clone(),
            }) as Box<dyn CreateForm>),
            false,
        ),
        Command::Remove { yes, .. } => (None, *yes),
        Command::List => (None, false),
    };

    let mut controller = ClientController::new(
        api,
        Some(Box::new(TerminalTable)),
        form,
        StatusDisplay::new(TerminalStatus),
        Box::new(Prompt { assume_yes }),
    );

    let outcome = match cli.command {
        Command::List => controller.initial_load().await,
        Command::Add { .. } => controller.submit_create().await,
        Command::Remove { number, .. } => {
            let marker = (number - 1).to_string();
            controller.click_delete(Some(&marker)).await
        }
    };

    match outcome {
        Outcome::Succeeded | Outcome::Ignored => ExitCode::SUCCESS,
        Outcome::Invalid | Outcome::Failed => ExitCode::FAILURE,
    }
}
