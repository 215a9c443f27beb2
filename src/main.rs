use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use slip_submit::config::Config;
use slip_submit::logger;
use slip_submit::models::{CandidateLink, Outcome};
use slip_submit::orchestrator::batch_processor::resolve_unit;
use slip_submit::orchestrator::{process_scraped_file, LinkDispatcher};
use slip_submit::services::{LinkValidator, SessionManager};
use slip_submit::utils::log_startup;
use slip_submit::workflow::SlipFlow;

#[derive(Parser)]
#[command(name = "slip_submit")]
#[command(author, version, about = "自动打开 PrizePicks 分享链接并提交投注单", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径
    #[arg(short, long, global = true, default_value = "slip_submit.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// 批量处理抓取文件
    Process {
        /// 抓取结果 JSON 文件
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 注额（默认使用配置值）
        #[arg(long)]
        unit_size: Option<u32>,

        /// 实际下注（否则只校验链接）
        #[arg(long)]
        auto_place: bool,

        /// 无头模式
        #[arg(long)]
        headless: bool,
    },

    /// 提交单条分享链接
    Place {
        #[arg(value_name = "LINK")]
        link: String,

        #[arg(long)]
        unit_size: Option<u32>,

        #[arg(long)]
        headless: bool,
    },

    /// 登录并保存 Cookie
    Login {
        #[arg(long)]
        headless: bool,
    },

    /// 只校验链接格式，不打开浏览器
    Validate {
        #[arg(value_name = "LINK", required = true)]
        links: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(&cli.config)?;

    // 初始化日志
    logger::init_with_level(&config.log_level);

    match cli.command {
        Commands::Process {
            file,
            unit_size,
            auto_place,
            headless,
        } => {
            config.auto_place_bets |= auto_place;
            config.headless |= headless;
            process_scraped_file(config, &file, unit_size).await?;
        }
        Commands::Place {
            link,
            unit_size,
            headless,
        } => {
            config.headless |= headless;
            place_single(config, link, unit_size).await?;
        }
        Commands::Login { headless } => {
            config.headless |= headless;
            let credentials = config.credentials();
            let mut manager = SessionManager::initialize(config).await?;
            let outcome = manager.ensure_authenticated(credentials.as_ref()).await;
            manager.teardown().await;
            outcome?;
            info!("✅ 登录完成，Cookie 已保存");
        }
        Commands::Validate { links } => {
            let validator = LinkValidator::new();
            for link in links {
                match validator.matching_rule(&link) {
                    Some(rule) => info!("✓ {} ({})", link, rule),
                    None => warn!("✗ {}", link),
                }
            }
        }
    }

    Ok(())
}

async fn place_single(config: Config, link: String, unit_size: Option<u32>) -> Result<()> {
    let unit = resolve_unit(&config, unit_size)?;
    log_startup(&config);

    let credentials = config.credentials();
    let flow = SlipFlow::new(&config);
    let inter_bet_delay = config.inter_bet_delay;
    let results_path = config.results_dir.join(format!(
        "single_bet_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));

    let mut manager = SessionManager::initialize(config).await?;
    if let Err(e) = manager.ensure_authenticated(credentials.as_ref()).await {
        manager.teardown().await;
        return Err(e.into());
    }

    let (handle, worker) = LinkDispatcher::spawn(manager, flow, inter_bet_delay, 1);
    let result = handle.submit(CandidateLink::bare(link), unit).await;
    drop(handle);

    let (mut manager, log) = worker.await?;
    manager.teardown().await;
    if let Err(e) = log.save_json(&results_path) {
        error!("保存结果失败: {}", e);
    }

    let result = result?;
    match result.outcome {
        Outcome::Confirmed => info!("✅ 投注单已提交"),
        Outcome::Unconfirmed => warn!("❔ 已提交，但未能确认结果"),
        Outcome::Failed => error!(
            "❌ 提交失败: {} ({})",
            result.error.as_deref().unwrap_or("unknown"),
            result.detail.as_deref().unwrap_or("")
        ),
    }
    Ok(())
}
