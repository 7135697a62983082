use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shell_tools_core::{
    Action, ActionReport, ClassifyConfig, EmptyDirClassifier, FileGenerator, GenerateConfig,
    RepoSyncer, ShellToolsError, SyncConfig, SyncSummary, TraversalPolicy, action,
    find_repositories,
    format_bytes, parse_size,
};

pub mod settings;

pub use settings::Settings;

/// 运行正常结束（包括部分删除失败）
pub const EXIT_OK: u8 = 0;
/// 扫描或执行失败
pub const EXIT_FAILURE: u8 = 1;
/// 参数错误：根路径不是目录、未知动作、无效大小
pub const EXIT_USAGE: u8 = 2;

/// find-empty 命令的参数配置
#[derive(Debug)]
struct FindEmptyArgs {
    root: Option<PathBuf>,
    ignore_empty_files: bool,
    no_ignore_empty_files: bool,
    action: Option<String>,
    remove: bool,
    skip_errors: bool,
}

/// generate-file 命令的参数配置
#[derive(Debug)]
struct GenerateFileArgs {
    path: PathBuf,
    size: Option<String>,
    line_size: Option<usize>,
    yes: bool,
}

/// sync-repos 命令的参数配置
#[derive(Debug)]
struct SyncReposArgs {
    root: Option<PathBuf>,
    recursive: bool,
    submodules: bool,
    wait: bool,
}

#[derive(Parser)]
#[command(name = "shell-tools")]
#[command(about = "Small filesystem helpers: empty directories, random files and repository sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Settings file (defaults to <config dir>/shell-tools/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find empty directories and print or remove them
    FindEmpty {
        /// Root directory (defaults to the current directory)
        root: Option<PathBuf>,

        /// Treat empty files as absent
        #[arg(short = 'e', long, overrides_with = "no_ignore_empty_files")]
        ignore_empty_files: bool,

        /// Count empty files as content, even when the settings file says otherwise
        #[arg(long, overrides_with = "ignore_empty_files")]
        no_ignore_empty_files: bool,

        /// Action applied to the found directories (print, remove)
        #[arg(short, long)]
        action: Option<String>,

        /// Shorthand for --action remove
        #[arg(long, conflicts_with = "action")]
        remove: bool,

        /// Skip unreadable directories instead of aborting the scan
        #[arg(long)]
        skip_errors: bool,
    },
    /// Generate a file filled with random data
    GenerateFile {
        /// Location of the generated file
        path: PathBuf,

        /// File size in bytes [kb|mb|gb] (default: 10mb)
        #[arg(short, long)]
        size: Option<String>,

        /// Length of line/chunk (default: 64)
        #[arg(
            short,
            long,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        line_size: Option<usize>,

        /// Overwrite an existing file without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Find git repositories and pull changes from their remotes
    SyncRepos {
        /// Directory holding the repositories (defaults to the current directory)
        root: Option<PathBuf>,

        /// Search repositories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Also update submodules
        #[arg(long)]
        submodules: bool,

        /// Wait for Enter before exiting
        #[arg(long)]
        wait: bool,
    },
    /// List registered actions
    Actions,
}

pub fn run_cli() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("shell_tools={log_level}"))
        .with_writer(io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    let code = match cli.command {
        Commands::FindEmpty {
            root,
            ignore_empty_files,
            no_ignore_empty_files,
            action,
            remove,
            skip_errors,
        } => handle_find_empty_command(
            FindEmptyArgs {
                root,
                ignore_empty_files,
                no_ignore_empty_files,
                action,
                remove,
                skip_errors,
            },
            &settings,
        )?,
        Commands::GenerateFile {
            path,
            size,
            line_size,
            yes,
        } => handle_generate_file_command(
            GenerateFileArgs {
                path,
                size,
                line_size,
                yes,
            },
            &settings,
        )?,
        Commands::SyncRepos {
            root,
            recursive,
            submodules,
            wait,
        } => handle_sync_repos_command(
            SyncReposArgs {
                root,
                recursive,
                submodules,
                wait,
            },
            &settings,
        )?,
        Commands::Actions => {
            list_actions();
            EXIT_OK
        }
    };

    Ok(ExitCode::from(code))
}

fn handle_find_empty_command(args: FindEmptyArgs, settings: &Settings) -> Result<u8> {
    let root = resolve_root(args.root.clone())?;

    if !root.exists() {
        // 根目录不存在只警告，继续以空结果执行
        eprintln!("The root directory is not set or doesn't exists.");
    } else if !root.is_dir() {
        eprintln!("Error: {}", ShellToolsError::InvalidRoot { path: root });
        return Ok(EXIT_USAGE);
    }

    let action_name = select_action_name(&args, settings);

    // 先解析动作，未知动作时不做任何扫描
    let selected = match action::resolve_global(&action_name) {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Available actions: {}", registered_action_names().join(", "));
            return Ok(EXIT_USAGE);
        }
    };

    let classifier = EmptyDirClassifier::new(ClassifyConfig {
        ignore_empty_files: select_ignore_empty_files(&args, settings),
        on_error: if args.skip_errors {
            TraversalPolicy::Skip
        } else {
            TraversalPolicy::Abort
        },
    });

    let outcome = classifier
        .classify_with_outcome(&root)
        .context("Failed to scan for empty directories")?;

    for skipped in &outcome.skipped {
        eprintln!("skipped unreadable directory '{}'", skipped.display());
    }

    let report = selected
        .apply(&outcome.empty_dirs)
        .with_context(|| format!("Action '{action_name}' failed"))?;

    display_action_failures(&report);

    Ok(EXIT_OK)
}

fn handle_generate_file_command(args: GenerateFileArgs, settings: &Settings) -> Result<u8> {
    let path = std::path::absolute(&args.path)
        .with_context(|| format!("Invalid path {}", args.path.display()))?;

    if path.is_dir() {
        eprintln!("Script aborted: '{}' exists and it's directory", path.display());
        return Ok(EXIT_FAILURE);
    }

    if path.is_file() && !args.yes && !confirm_overwrite(&path)? {
        println!("Generation cancelled.");
        return Ok(EXIT_OK);
    }

    let size_text = args.size.unwrap_or_else(|| settings.file_size.clone());
    let size = match parse_size(&size_text) {
        Ok(size) => size,
        Err(_) => {
            eprintln!("Invalid file size was requested (file-size={size_text}).");
            eprintln!("Use '{} --help' to see allowed options.", program_name());
            return Ok(EXIT_USAGE);
        }
    };

    let line_size = args.line_size.unwrap_or(settings.line_size);
    if line_size == 0 {
        eprintln!("Invalid line size was requested (line-size={line_size}).");
        eprintln!("Use '{} --help' to see allowed options.", program_name());
        return Ok(EXIT_USAGE);
    }

    let generator = FileGenerator::new(GenerateConfig {
        size,
        line_size,
        overwrite: true,
    });

    println!(
        "The file of {size_text} ({}) will be generated at '{}'.",
        format_bytes(size),
        path.display()
    );
    generator
        .generate(&path)
        .with_context(|| format!("Failed to generate {}", path.display()))?;
    println!("The generation is finished.");

    Ok(EXIT_OK)
}

fn handle_sync_repos_command(args: SyncReposArgs, settings: &Settings) -> Result<u8> {
    let root = resolve_root(args.root)?;
    let suffix = if args.recursive { "recursively " } else { "" };
    println!(
        "Scanning '{}' for git repositories {suffix}...",
        root.display()
    );

    let syncer = RepoSyncer::new(SyncConfig {
        submodules: args.submodules || settings.submodules,
        ..Default::default()
    });

    let repos = find_repositories(&root, args.recursive);
    let summary = syncer.sync_all(&repos);
    display_sync_summary(&root, &summary);

    if args.wait {
        print!("Press Enter to exit...");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
    }

    Ok(EXIT_OK)
}

fn display_sync_summary(root: &Path, summary: &SyncSummary) {
    let relative = |repo: &Path| display_relative(repo.strip_prefix(root).unwrap_or(repo));

    for repo in &summary.synced {
        println!("{} was synced", relative(repo.as_path()));
    }

    if summary.failed.is_empty() {
        return;
    }

    eprintln!(
        "\nFailed to sync {} of {} repositories:",
        summary.failed.len(),
        summary.synced.len() + summary.failed.len()
    );
    for (repo, reason) in &summary.failed {
        eprintln!("  - {}: {reason}", relative(repo.as_path()));
    }
}

/// 命令行的 -e / --no-ignore-empty-files 优先于配置文件
fn select_ignore_empty_files(args: &FindEmptyArgs, settings: &Settings) -> bool {
    if args.no_ignore_empty_files {
        false
    } else {
        args.ignore_empty_files || settings.ignore_empty_files
    }
}

/// 根据命令行与配置确定动作名称：--remove 优先，其次 --action，最后配置文件
fn select_action_name(args: &FindEmptyArgs, settings: &Settings) -> String {
    if args.remove {
        action::REMOVE.to_string()
    } else {
        args.action
            .clone()
            .unwrap_or_else(|| settings.action.clone())
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    std::path::absolute(&root).with_context(|| format!("Invalid path {}", root.display()))
}

fn registered_action_names() -> Vec<String> {
    action::global()
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .names()
}

fn list_actions() {
    for name in registered_action_names() {
        println!("{name}");
    }
}

fn display_relative(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}

fn display_action_failures(report: &ActionReport) {
    if report.is_success() {
        return;
    }

    eprintln!("\nFailed to process {} directories:", report.failed.len());
    for failure in &report.failed {
        eprintln!("  - {}: {}", failure.path.display(), failure.reason);
    }
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!(
        "file '{}' already exists. override? [yes/no]: ",
        path.display()
    );

    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase().starts_with('y'))
}

fn program_name() -> String {
    std::env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "shell-tools".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn find_args(root: &Path, action: Option<&str>) -> FindEmptyArgs {
        FindEmptyArgs {
            root: Some(root.to_path_buf()),
            ignore_empty_files: false,
            no_ignore_empty_files: false,
            action: action.map(str::to_string),
            remove: false,
            skip_errors: false,
        }
    }

    #[test]
    fn test_cli_parse_find_empty_command() {
        let args = vec![
            "shell-tools",
            "find-empty",
            "/tmp",
            "--ignore-empty-files",
            "--action",
            "remove",
            "--skip-errors",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::FindEmpty {
                root,
                ignore_empty_files,
                action,
                remove,
                skip_errors,
                ..
            } => {
                assert_eq!(root, Some(PathBuf::from("/tmp")));
                assert!(ignore_empty_files);
                assert_eq!(action.as_deref(), Some("remove"));
                assert!(!remove);
                assert!(skip_errors);
            }
            _ => panic!("Expected FindEmpty command"),
        }
    }

    #[test]
    fn test_cli_parse_find_empty_defaults() {
        let cli = Cli::try_parse_from(["shell-tools", "find-empty"]).unwrap();

        match cli.command {
            Commands::FindEmpty {
                root,
                ignore_empty_files,
                action,
                remove,
                ..
            } => {
                assert!(root.is_none());
                assert!(!ignore_empty_files);
                assert!(action.is_none());
                assert!(!remove);
            }
            _ => panic!("Expected FindEmpty command"),
        }
    }

    #[test]
    fn test_cli_remove_conflicts_with_action() {
        let result = Cli::try_parse_from([
            "shell-tools",
            "find-empty",
            "--remove",
            "--action",
            "print",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_generate_file_command() {
        let cli = Cli::try_parse_from([
            "shell-tools",
            "generate-file",
            "out.txt",
            "--size",
            "1kb",
            "--line-size",
            "32",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Commands::GenerateFile {
                path,
                size,
                line_size,
                yes,
            } => {
                assert_eq!(path, PathBuf::from("out.txt"));
                assert_eq!(size.as_deref(), Some("1kb"));
                assert_eq!(line_size, Some(32));
                assert!(yes);
            }
            _ => panic!("Expected GenerateFile command"),
        }
    }

    #[test]
    fn test_cli_parse_sync_repos_command() {
        let cli = Cli::try_parse_from([
            "shell-tools",
            "--verbose",
            "sync-repos",
            "/src",
            "-r",
            "--submodules",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::SyncRepos {
                root,
                recursive,
                submodules,
                wait,
            } => {
                assert_eq!(root, Some(PathBuf::from("/src")));
                assert!(recursive);
                assert!(submodules);
                assert!(!wait);
            }
            _ => panic!("Expected SyncRepos command"),
        }
    }

    #[test]
    fn test_select_action_name() {
        let root = Path::new("/tmp");
        let settings = Settings::default();

        assert_eq!(select_action_name(&find_args(root, None), &settings), "print");
        assert_eq!(
            select_action_name(&find_args(root, Some("remove")), &settings),
            "remove"
        );

        let mut args = find_args(root, None);
        args.remove = true;
        assert_eq!(select_action_name(&args, &settings), "remove");

        let configured = Settings {
            action: "remove".to_string(),
            ..Default::default()
        };
        assert_eq!(
            select_action_name(&find_args(root, None), &configured),
            "remove"
        );
        assert_eq!(
            select_action_name(&find_args(root, Some("print")), &configured),
            "print"
        );
    }

    #[test]
    fn test_cli_parse_no_ignore_empty_files() {
        let cli = Cli::try_parse_from(["shell-tools", "find-empty", "--no-ignore-empty-files"])
            .unwrap();
        match cli.command {
            Commands::FindEmpty {
                ignore_empty_files,
                no_ignore_empty_files,
                ..
            } => {
                assert!(!ignore_empty_files);
                assert!(no_ignore_empty_files);
            }
            _ => panic!("Expected FindEmpty command"),
        }

        // 后出现的选项生效
        let cli = Cli::try_parse_from([
            "shell-tools",
            "find-empty",
            "--no-ignore-empty-files",
            "-e",
        ])
        .unwrap();
        match cli.command {
            Commands::FindEmpty {
                ignore_empty_files,
                no_ignore_empty_files,
                ..
            } => {
                assert!(ignore_empty_files);
                assert!(!no_ignore_empty_files);
            }
            _ => panic!("Expected FindEmpty command"),
        }
    }

    #[test]
    fn test_select_ignore_empty_files() {
        let root = Path::new("/tmp");
        let configured = Settings {
            ignore_empty_files: true,
            ..Default::default()
        };

        assert!(!select_ignore_empty_files(&find_args(root, None), &Settings::default()));
        assert!(select_ignore_empty_files(&find_args(root, None), &configured));

        let mut args = find_args(root, None);
        args.ignore_empty_files = true;
        assert!(select_ignore_empty_files(&args, &Settings::default()));

        let mut args = find_args(root, None);
        args.no_ignore_empty_files = true;
        assert!(!select_ignore_empty_files(&args, &configured));
    }

    #[test]
    fn test_find_empty_settings_overridden_from_command_line() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("logs"))?;
        fs::write(root.join("logs").join("today.log"), b"")?;

        let configured = Settings {
            ignore_empty_files: true,
            ..Default::default()
        };
        let mut args = find_args(root, None);
        args.remove = true;
        args.no_ignore_empty_files = true;

        let code = handle_find_empty_command(args, &configured)?;
        assert_eq!(code, EXIT_OK);
        assert!(root.join("logs").join("today.log").exists());

        Ok(())
    }

    #[test]
    fn test_cli_rejects_zero_line_size() {
        let result = Cli::try_parse_from([
            "shell-tools",
            "generate-file",
            "out.txt",
            "--line-size",
            "0",
            "-y",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_file_zero_line_size_keeps_existing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let existing = temp_dir.path().join("keep.txt");
        fs::write(&existing, b"precious data")?;

        // 配置文件中的 line_size = 0 不经过 clap 校验
        let settings = Settings {
            line_size: 0,
            ..Default::default()
        };
        let code = handle_generate_file_command(
            GenerateFileArgs {
                path: existing.clone(),
                size: Some("1kb".to_string()),
                line_size: None,
                yes: true,
            },
            &settings,
        )?;
        assert_eq!(code, EXIT_USAGE);
        assert_eq!(fs::read(&existing)?, b"precious data");

        Ok(())
    }

    #[test]
    fn test_sync_repos_command_reports_failures() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("repo").join(".git"))?;

        // 假仓库没有远端，git pull 失败时命令仍正常结束
        let code = handle_sync_repos_command(
            SyncReposArgs {
                root: Some(root.to_path_buf()),
                recursive: false,
                submodules: false,
                wait: false,
            },
            &Settings::default(),
        )?;
        assert_eq!(code, EXIT_OK);

        Ok(())
    }

    #[test]
    fn test_find_empty_unknown_action() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let keep = temp_dir.path().join("keep");
        fs::create_dir(&keep)?;

        let code = handle_find_empty_command(
            find_args(temp_dir.path(), Some("shred")),
            &Settings::default(),
        )?;
        assert_eq!(code, EXIT_USAGE);
        assert!(keep.exists());

        Ok(())
    }

    #[test]
    fn test_find_empty_remove() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("one"))?;
        fs::create_dir_all(root.join("two"))?;
        fs::write(root.join("one").join("file"), b"")?;

        let mut args = find_args(root, None);
        args.remove = true;
        let code = handle_find_empty_command(args, &Settings::default())?;

        assert_eq!(code, EXIT_OK);
        assert!(root.join("one").exists());
        assert!(!root.join("two").exists());

        Ok(())
    }

    #[test]
    fn test_find_empty_root_checks() -> Result<()> {
        let temp_dir = TempDir::new()?;

        let missing = temp_dir.path().join("missing");
        let code = handle_find_empty_command(find_args(&missing, None), &Settings::default())?;
        assert_eq!(code, EXIT_OK);

        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"content")?;
        let code = handle_find_empty_command(find_args(&file, None), &Settings::default())?;
        assert_eq!(code, EXIT_USAGE);

        Ok(())
    }

    #[test]
    fn test_generate_file_command() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("random.txt");

        let code = handle_generate_file_command(
            GenerateFileArgs {
                path: target.clone(),
                size: Some("1kb".to_string()),
                line_size: Some(64),
                yes: false,
            },
            &Settings::default(),
        )?;
        assert_eq!(code, EXIT_OK);
        // 16 行，每行 64 个字符加换行符
        assert_eq!(fs::metadata(&target)?.len(), 16 * 65);

        let code = handle_generate_file_command(
            GenerateFileArgs {
                path: temp_dir.path().join("bad.txt"),
                size: Some("lots".to_string()),
                line_size: None,
                yes: true,
            },
            &Settings::default(),
        )?;
        assert_eq!(code, EXIT_USAGE);
        assert!(!temp_dir.path().join("bad.txt").exists());

        let code = handle_generate_file_command(
            GenerateFileArgs {
                path: temp_dir.path().to_path_buf(),
                size: None,
                line_size: None,
                yes: true,
            },
            &Settings::default(),
        )?;
        assert_eq!(code, EXIT_FAILURE);

        Ok(())
    }

    #[test]
    fn test_display_relative() {
        assert_eq!(display_relative(Path::new("")), ".");
        assert_eq!(display_relative(Path::new("group/repo")), "group/repo");
    }
}
