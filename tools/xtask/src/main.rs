//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `speed-check`: 检查 HTML 中的 `data-scroll-speed` 表达式

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use data_scroll::{DiagnosticLevel, DiagnosticResult, SPEED_ATTRIBUTE, Screens, analyze_speed};
use scraper::{ElementRef, Html, Selector};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => check_all()?,
        "speed-check" => {
            let path = args.next();
            speed_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  speed-check     检查 HTML 中的速度表达式

SPEED-CHECK:
  cargo xtask speed-check [path]

  不带参数：检查 demos/ 下所有 .html 文件
  带路径参数：检查指定文件或目录

  检查内容（使用默认断点表）：
    - 速度值是否为正数
    - 断点名是否存在
    - 只有第一个值可以省略断点

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo speed-check   -> cargo xtask speed-check
"#
    );
}

//=============================================================================
// speed-check 命令实现
//=============================================================================

/// 默认检查目录（相对于 workspace root）
const DEFAULT_DEMOS_DIR: &str = "demos";

/// 检查结果
#[derive(Default)]
struct SpeedCheckResult {
    files_checked: usize,
    expressions_checked: usize,
    read_errors: usize,
    /// 每条诊断对应的位置（文件 + 元素）
    findings: Vec<(String, DiagnosticResult)>,
}

impl SpeedCheckResult {
    fn warn_count(&self) -> usize {
        self.findings.iter().map(|(_, d)| d.warn_count()).sum()
    }

    fn info_count(&self) -> usize {
        self.findings
            .iter()
            .flat_map(|(_, d)| d.iter())
            .filter(|d| d.level == DiagnosticLevel::Info)
            .count()
    }
}

fn speed_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_html_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_DEMOS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认目录不存在: {}\n请在 workspace 根目录运行，或指定 HTML 路径",
                    dir.display()
                );
            }
            collect_html_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到 HTML 文件（.html）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个 HTML 文件...\n", files.len());

    let screens = Screens::default();
    let mut result = SpeedCheckResult::default();
    for file in &files {
        check_html_file(file, &screens, &mut result);
    }

    print_check_result(&result);

    if result.read_errors > 0 || result.warn_count() > 0 {
        anyhow::bail!("速度表达式检查发现问题");
    }
    Ok(())
}

/// 收集目录下的所有 HTML 文件
fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "html" || ext == "htm"))
        .collect();
    files.sort();
    files
}

fn check_html_file(file: &Path, screens: &Screens, result: &mut SpeedCheckResult) {
    let file_id = file.display().to_string();
    result.files_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", file_id, e);
            result.read_errors += 1;
            return;
        }
    };

    let values = match extract_attribute_values(&content, SPEED_ATTRIBUTE) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("[ERROR] {}: {:#}", file_id, e);
            result.read_errors += 1;
            return;
        }
    };

    for (element, expression) in values {
        result.expressions_checked += 1;
        let diagnostics = analyze_speed(&expression, screens);
        if !diagnostics.is_empty() {
            result
                .findings
                .push((format!("{} {}", file_id, element), diagnostics));
        }
    }
}

/// 解析 HTML，提取带有该属性的元素及属性值
///
/// 注释与文本中的同名内容不会被识别，属性值中的字符引用已解码。
fn extract_attribute_values(content: &str, name: &str) -> anyhow::Result<Vec<(String, String)>> {
    let document = Html::parse_document(content);
    let selector = Selector::parse(&format!("[{name}]"))
        .map_err(|e| anyhow::anyhow!("无效的属性选择器 [{name}]: {e}"))?;

    Ok(document
        .select(&selector)
        .filter_map(|element| {
            let value = element.value().attr(name)?;
            Some((describe_element(&element), value.to_string()))
        })
        .collect())
}

/// 元素的简短描述：`<div#hero>` 或 `<div>`
fn describe_element(element: &ElementRef) -> String {
    let value = element.value();
    match value.id() {
        Some(id) => format!("<{}#{}>", value.name(), id),
        None => format!("<{}>", value.name()),
    }
}

/// 输出检查结果
fn print_check_result(result: &SpeedCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!(
        "检查完成: {} 个文件, {} 个表达式",
        result.files_checked, result.expressions_checked
    );
    eprintln!();

    for (location, diagnostics) in &result.findings {
        for diag in diagnostics.iter() {
            eprintln!("{} {}", location, diag);
        }
    }

    let warn_count = result.warn_count();
    let info_count = result.info_count();

    eprintln!();
    if result.read_errors > 0 {
        eprintln!("❌ {} 个文件无法读取, {} 个警告", result.read_errors, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  {} 个警告, {} 条提示", warn_count, info_count);
    } else if info_count > 0 {
        eprintln!("✅ 检查通过，{} 条提示", info_count);
    } else {
        eprintln!("✅ 检查通过，无问题");
    }
}
