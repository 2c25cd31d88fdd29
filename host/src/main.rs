//! # scroll-sim
//!
//! 在无界面页面上回放滚动，输出每一帧的内联样式。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p scroll-host -- run page.json
//! cargo run -p scroll-host -- run page.json --width 800 --steps 0,400,800 --resize 1280x800
//! cargo run -p scroll-host -- check "1.5 md:2 lg:clamp(3)"
//! cargo run -p scroll-host -- --log debug run page.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use scroll_host::{Page, SimConfig, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scroll-sim")]
#[command(about = "data-scroll 模拟器 - 在无界面页面上回放滚动")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 日志过滤，优先于 RUST_LOG 与配置文件
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放滚动（默认）
    Run(RunArgs),

    /// 静态检查速度表达式
    Check {
        /// 速度表达式，如 "1.5 md:2"
        expression: String,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// 页面描述文件（覆盖配置中的 page_path）
    page: Option<PathBuf>,

    /// 视口宽度
    #[arg(long)]
    width: Option<f32>,

    /// 视口高度
    #[arg(long)]
    height: Option<f32>,

    /// 滚动位置列表，逗号分隔
    #[arg(long, value_delimiter = ',')]
    steps: Vec<f32>,

    /// 回放结束后改变视口尺寸，如 1280x800
    #[arg(long, value_parser = parse_size)]
    resize: Option<(f32, f32)>,
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (width, height) = s
        .split_once('x')
        .ok_or_else(|| format!("尺寸格式应为 WIDTHxHEIGHT: {}", s))?;
    let width = width.trim().parse().map_err(|_| format!("无效的宽度: {}", width))?;
    let height = height.trim().parse().map_err(|_| format!("无效的高度: {}", height))?;
    Ok((width, height))
}

fn init_tracing(cli: &Cli) {
    let filter = cli
        .log
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .or_else(|| SimConfig::read(&cli.config).ok().map(|c| c.log_filter))
        .unwrap_or_else(|| "info".to_string());

    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = SimConfig::load(&cli.config);
    match cli.command {
        None => run(config, RunArgs::default()),
        Some(Commands::Run(args)) => run(config, args),
        Some(Commands::Check { expression }) => check(&config, &expression),
    }
}

fn run(mut config: SimConfig, args: RunArgs) -> Result<()> {
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    if !args.steps.is_empty() {
        config.scroll_steps = args.steps;
    }
    if let Some(page) = args.page {
        config.page_path = Some(page);
    }

    let Some(page_path) = config.page_path.clone() else {
        bail!("未指定页面文件（命令行参数或配置中的 page_path）");
    };
    let page = Page::load(&page_path)
        .with_context(|| format!("加载页面失败: {}", page_path.display()))?;
    info!(path = %page_path.display(), elements = page.len(), "页面加载成功");

    let mut sim = Simulation::new(&config, page).context("创建模拟环境失败")?;
    for diagnostic in sim.report().diagnostics.iter() {
        println!("{}", diagnostic);
    }

    let steps = config.scroll_steps.clone();
    println!("{}", sim.run(&steps));

    if let Some((width, height)) = args.resize {
        let frame = sim.resize(width, height).context("改变视口尺寸失败")?;
        println!("{}", frame);
    }

    sim.destroy();
    Ok(())
}

fn check(config: &SimConfig, expression: &str) -> Result<()> {
    let result = data_scroll::analyze_speed(expression, &config.data_scroll.screens);
    if result.is_empty() {
        println!("✅ \"{}\"", expression);
        return Ok(());
    }

    println!("{}", result);
    if result.warn_count() > 0 {
        bail!("{} 条警告", result.warn_count());
    }
    Ok(())
}
