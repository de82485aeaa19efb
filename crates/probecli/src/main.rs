//! Telnet 服務探測 CLI
//!
//! 對單一目標執行選項協商與提示偵測，輸出判定結果。
//! 結束碼：0 比對到提示、2 連線被拒絕、3 期限內沒有結果

mod config;

use std::process::ExitCode;

use probecore::{
    ProbeOutcome, ProbeSession, ProbeVerdict, PromptKind, TcpTransport, TelnetError,
};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Profile;

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日誌
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // 寫出一份設定檔範本後結束
    if args.first().map(String::as_str) == Some("--init-profile") {
        let Some(path) = args.get(1) else {
            eprintln!("--init-profile 需要檔案路徑");
            return ExitCode::from(64);
        };
        return match Profile::new("192.0.2.1").save(path) {
            Ok(()) => {
                println!("已寫出設定檔範本: {}", path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("寫出設定檔失敗: {}", e);
                ExitCode::from(1)
            }
        };
    }

    let profile = match parse_args(&args) {
        Ok(profile) => profile,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("用法: probecli <host> [port] [banner逾時秒數]");
            eprintln!("      probecli --profile <設定檔.json>");
            eprintln!("      probecli --init-profile <設定檔.json>");
            return ExitCode::from(64);
        }
    };

    match run(&profile).await {
        Ok(code) => code,
        Err(e) => {
            error!("探測失敗: {}", e);
            ExitCode::from(1)
        }
    }
}

/// 解析命令列參數
fn parse_args(args: &[String]) -> Result<Profile, String> {
    match args.first().map(String::as_str) {
        Some("--profile") => {
            let path = args.get(1).ok_or("--profile 需要檔案路徑")?;
            Profile::load(path).map_err(|e| format!("讀取設定檔失敗: {}", e))
        }
        Some(host) => {
            let mut profile = Profile::new(host);
            if let Some(port) = args.get(1) {
                profile.port = port
                    .parse()
                    .map_err(|_| format!("無效的連接埠: {}", port))?;
            }
            if let Some(secs) = args.get(2) {
                profile.banner_timeout_secs = secs
                    .parse()
                    .map_err(|_| format!("無效的秒數: {}", secs))?;
            }
            Ok(profile)
        }
        None => Err("缺少目標主機".to_string()),
    }
}

async fn run(profile: &Profile) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let patterns = profile.patterns()?;

    let mut transport =
        match TcpTransport::dial(&profile.host, profile.port, &profile.transport_config()).await {
            Ok(transport) => transport,
            Err(TelnetError::ConnectionRefused) => {
                println!("{}:{} refused", profile.host, profile.port);
                return Ok(ExitCode::from(2));
            }
            Err(e) => return Err(e.into()),
        };

    let mut session = ProbeSession::new(profile.probe_config(), patterns);

    match session.probe_or_refused(&mut transport).await? {
        ProbeVerdict::Refused => {
            println!("{}:{} refused", profile.host, profile.port);
            Ok(ExitCode::from(2))
        }
        ProbeVerdict::Connected(report) => {
            let label = match report.outcome {
                ProbeOutcome::Matched(PromptKind::Login) => "login-prompt",
                ProbeOutcome::Matched(PromptKind::Password) => "password-prompt",
                ProbeOutcome::Matched(PromptKind::Busy) => "busy",
                ProbeOutcome::TimedOut => "timeout",
            };
            println!("{}:{} {}", profile.host, profile.port, label);
            if !report.banner.is_empty() {
                println!("{}", report.banner_text());
            }
            match report.outcome {
                ProbeOutcome::Matched(_) => Ok(ExitCode::SUCCESS),
                ProbeOutcome::TimedOut => Ok(ExitCode::from(3)),
            }
        }
    }
}
