//! # 命令行接口
//!
//! `service-checklist` 的子命令定义与处理函数。每个命令按顺序完成：
//! 加载存储 -> 执行操作 -> 重写受影响的存储 / 导出报告。
//!
//! 命令边界使用 `anyhow` 附加上下文，内部服务统一返回 `AppResult`。

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::enums::CheckKind;
use crate::models::structs::{CheckLimits, Machine, ReportHeader, ServiceSubmission};
use crate::services::application::{
    summary_text, CatalogService, IReportGenerationService, InspectionService, ReportGenerationService,
};
use crate::services::domain::{CheckDraft, TemplateEntry};
use crate::services::infrastructure::JsonPersistenceService;
use crate::services::traits::BaseService;
use crate::utils::config::AppConfig;
use crate::utils::error::AppError;
use crate::utils::time_utils;

#[derive(Parser, Debug)]
#[command(name = "service-checklist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Machine service checklist: templates, per-machine limits and PDF service reports", long_about = None)]
pub struct Cli {
    /// Path to the application config file
    #[arg(long, global = true, env = "CHECKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding checklist.json, templates.json and machines.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage check definitions
    Check {
        #[command(subcommand)]
        action: CheckAction,
    },

    /// Manage templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage machines
    Machine {
        #[command(subcommand)]
        action: MachineAction,
    },

    /// Show the effective checks of a machine
    Resolve {
        /// Machine name
        machine: String,
    },

    /// Write a blank submission with default values for every configured machine
    Form {
        /// Output file (JSON)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        header: HeaderArgs,
    },

    /// Evaluate a submission, print the summary and export the report
    Report {
        /// Submission file (JSON)
        #[arg(short, long)]
        submission: PathBuf,

        #[command(flatten)]
        header: HeaderArgs,

        /// Also write the report as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Skip the PDF export
        #[arg(long)]
        no_pdf: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckAction {
    /// Add a check; the id is derived from the title
    Add(CheckArgs),

    /// Replace an existing check in place
    Update {
        /// Check id
        id: String,

        #[command(flatten)]
        check: CheckArgs,
    },

    /// Remove a check from the checklist, all templates and all machine overrides
    Remove {
        /// Check id
        id: String,
    },

    /// List all checks
    List,
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// Create or replace a template
    Save {
        /// Template name
        name: String,

        /// Check to include: `id` or `id=min:max`
        #[arg(short, long = "check", value_parser = parse_template_entry)]
        checks: Vec<TemplateEntry>,
    },

    /// Delete a template (machines keep the dangling name)
    Delete {
        name: String,
    },

    /// List all templates
    List,

    /// Show the checks of a template
    Show {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MachineAction {
    /// Create or replace a machine
    Save {
        /// Machine name
        name: String,

        /// Template to apply, in order (repeatable)
        #[arg(short, long = "template")]
        templates: Vec<String>,

        /// Numeric override: `id=min:max` (either bound may be left empty)
        #[arg(short, long = "override", value_parser = parse_override, allow_hyphen_values = true)]
        overrides: Vec<(String, CheckLimits)>,
    },

    /// Delete a machine
    Delete {
        name: String,
    },

    /// List all machines
    List,

    /// Show a machine's configuration
    Show {
        name: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Display title
    #[arg(long)]
    pub title: String,

    /// Check type: numeric or boolean
    #[arg(long = "type", default_value = "numeric")]
    pub kind: CheckKind,

    /// Unit (numeric checks)
    #[arg(long)]
    pub unit: Option<String>,

    /// Default lower limit (numeric checks)
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Default upper limit (numeric checks)
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<f64>,
}

impl From<CheckArgs> for CheckDraft {
    fn from(args: CheckArgs) -> Self {
        CheckDraft {
            title: args.title,
            kind: args.kind,
            unit: args.unit,
            min: args.min,
            max: args.max,
        }
    }
}

/// 报告抬头参数，给出时覆盖提交文件中的值
#[derive(Args, Debug, Clone, Default)]
pub struct HeaderArgs {
    /// Service date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Service engineer
    #[arg(long)]
    pub engineer: Option<String>,

    /// Job id
    #[arg(long)]
    pub job_id: Option<String>,

    /// Customer / site
    #[arg(long)]
    pub customer: Option<String>,
}

impl HeaderArgs {
    pub fn apply(self, header: &mut ReportHeader) -> Result<()> {
        if let Some(date) = self.date {
            let parsed = time_utils::parse_service_date(&date)
                .with_context(|| format!("invalid service date '{}', expected YYYY-MM-DD", date))?;
            header.service_date = parsed.format("%Y-%m-%d").to_string();
        }
        if let Some(engineer) = self.engineer {
            header.engineer = engineer;
        }
        if let Some(job_id) = self.job_id {
            header.job_id = job_id;
        }
        if let Some(customer) = self.customer {
            header.customer = customer;
        }
        Ok(())
    }
}

// ==================== 参数解析 ====================

fn parse_bound(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| format!("invalid limit '{}': {}", raw, e))
}

/// 解析 `min:max`，任一侧可留空
pub fn parse_limits(raw: &str) -> Result<CheckLimits, String> {
    let (min, max) = raw
        .split_once(':')
        .ok_or_else(|| format!("limits must be written as min:max, got '{}'", raw))?;
    Ok(CheckLimits {
        min: parse_bound(min)?,
        max: parse_bound(max)?,
    })
}

/// 解析模板条目：`id` 或 `id=min:max`
pub fn parse_template_entry(raw: &str) -> Result<TemplateEntry, String> {
    match raw.split_once('=') {
        None if !raw.trim().is_empty() => Ok(TemplateEntry::new(raw.trim())),
        None => Err("check id must not be empty".to_string()),
        Some((id, limits)) => Ok(TemplateEntry::with_limits(id.trim(), parse_limits(limits)?)),
    }
}

/// 解析机器覆盖：`id=min:max`
pub fn parse_override(raw: &str) -> Result<(String, CheckLimits), String> {
    let (id, limits) = raw
        .split_once('=')
        .ok_or_else(|| format!("override must be written as id=min:max, got '{}'", raw))?;
    let limits = parse_limits(limits)?;
    if limits.is_empty() {
        return Err(format!("override for '{}' sets neither min nor max", id.trim()));
    }
    Ok((id.trim().to_string(), limits))
}

// ==================== 命令执行 ====================

/// 操作员可修正的输入错误（重复ID、名称缺失、引用不存在等）
///
/// 这类错误只需一行提示；其余错误按完整错误链输出。
pub fn user_error(err: &anyhow::Error) -> Option<&AppError> {
    err.downcast_ref::<AppError>().filter(|e| e.is_user_error())
}

/// 执行命令
pub async fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    if let Some(data_dir) = cli.data_dir {
        config.persistence_config.data_path = data_dir;
    }

    let mut persistence = JsonPersistenceService::new(config.persistence_config.clone());
    persistence
        .initialize()
        .await
        .context("failed to initialise the data directory")?;
    let persistence = Arc::new(persistence);

    let mut catalog = CatalogService::load(persistence)
        .await
        .context("failed to load checklist data")?;

    match cli.command {
        Commands::Check { action } => run_check(&mut catalog, action).await,
        Commands::Template { action } => run_template(&mut catalog, action).await,
        Commands::Machine { action } => run_machine(&mut catalog, action).await,
        Commands::Resolve { machine } => run_resolve(&catalog, &machine),
        Commands::Form { output, header } => run_form(&catalog, output, header).await,
        Commands::Report { submission, header, json, no_pdf } => {
            run_report(&catalog, &config, submission, header, json, no_pdf).await
        }
    }
}

async fn run_check(catalog: &mut CatalogService, action: CheckAction) -> Result<()> {
    match action {
        CheckAction::Add(args) => {
            let check = catalog.add_check(args.into()).await?;
            println!("Added check '{}' ({})", check.id, check.kind);
        }
        CheckAction::Update { id, check } => {
            let check = catalog.update_check(&id, check.into()).await?;
            println!("Updated check '{}'", check.id);
        }
        CheckAction::Remove { id } => {
            let summary = catalog.delete_check(&id).await?;
            println!(
                "Removed check '{}' (templates touched: {}, machine overrides touched: {})",
                id,
                summary.templates.len(),
                summary.machines.len()
            );
        }
        CheckAction::List => {
            let checklist = &catalog.catalog().checklist;
            if checklist.is_empty() {
                println!("No checks defined.");
            }
            for check in checklist.iter() {
                println!(
                    "{:<28} {:<8} {:<32} {:<6} {}",
                    check.id,
                    check.kind,
                    check.title,
                    check.unit_label(),
                    check.default_limits()
                );
            }
        }
    }
    Ok(())
}

async fn run_template(catalog: &mut CatalogService, action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::Save { name, checks } => {
            let saved = catalog.save_template(&name, checks).await?;
            println!("Saved template '{}' with {} checks", name.trim(), saved.len());
        }
        TemplateAction::Delete { name } => {
            catalog.delete_template(&name).await?;
            println!("Deleted template '{}'", name);
        }
        TemplateAction::List => {
            let templates = &catalog.catalog().templates;
            if templates.is_empty() {
                println!("No templates defined.");
            }
            for (name, checks) in templates {
                println!("{:<28} {} checks", name, checks.len());
            }
        }
        TemplateAction::Show { name } => {
            let checks = catalog
                .catalog()
                .templates
                .get(&name)
                .with_context(|| format!("template '{}' not found", name))?;
            for (check_id, limits) in checks {
                println!("{:<28} {}", check_id, limits);
            }
        }
    }
    Ok(())
}

async fn run_machine(catalog: &mut CatalogService, action: MachineAction) -> Result<()> {
    match action {
        MachineAction::Save { name, templates, overrides } => {
            let machine = Machine {
                templates,
                overrides: overrides.into_iter().collect(),
            };
            catalog.save_machine(&name, machine).await?;
            println!("Saved machine '{}'", name.trim());
        }
        MachineAction::Delete { name } => {
            catalog.delete_machine(&name).await?;
            println!("Deleted machine '{}'", name);
        }
        MachineAction::List => {
            let machines = &catalog.catalog().machines;
            if machines.is_empty() {
                println!("No machines defined.");
            }
            for (name, machine) in machines {
                println!("{:<28} [{}]", name, machine.templates.join(", "));
            }
        }
        MachineAction::Show { name } => {
            let machine = catalog
                .catalog()
                .machines
                .get(&name)
                .with_context(|| format!("machine '{}' not found", name))?;
            println!("Templates: [{}]", machine.templates.join(", "));
            if machine.overrides.is_empty() {
                println!("Overrides: none");
            }
            for (check_id, limits) in &machine.overrides {
                println!("Override  {:<28} {}", check_id, limits);
            }
        }
    }
    Ok(())
}

fn run_resolve(catalog: &CatalogService, machine_name: &str) -> Result<()> {
    let machine = catalog
        .catalog()
        .machines
        .get(machine_name)
        .with_context(|| format!("machine '{}' not found", machine_name))?;

    let (effective, issues) = catalog.catalog().resolver().effective_checks(machine);
    if effective.is_empty() {
        println!("Machine '{}' has no checks configured.", machine_name);
    }
    for check in &effective {
        println!(
            "{:<28} {:<8} {}",
            check.definition.id,
            check.definition.kind,
            if check.definition.is_numeric() {
                check.limits.or(check.definition.default_limits()).to_string()
            } else {
                "-".to_string()
            }
        );
    }
    for issue in &issues {
        println!("warning: {}", issue);
    }
    Ok(())
}

async fn run_form(catalog: &CatalogService, output: PathBuf, header_args: HeaderArgs) -> Result<()> {
    let mut header = ReportHeader::default();
    header_args.apply(&mut header)?;

    let submission = InspectionService::default().blank_submission(catalog.catalog(), header);
    if submission.machines.is_empty() {
        log::warn!("没有任何已配置检查项的机器，生成的表单为空");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(&submission)?;
    tokio::fs::write(&output, content)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Blank submission written to {}", output.display());
    Ok(())
}

async fn read_submission(path: &PathBuf) -> Result<ServiceSubmission> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read submission {}", path.display()))?;
    match serde_json::from_str(&content) {
        Ok(submission) => Ok(submission),
        Err(e) => {
            crate::log_file_parsing_failure!("提交文件 {:?} 解析失败: {}", path, e);
            bail!("submission {} is not valid JSON: {}", path.display(), e)
        }
    }
}

async fn run_report(
    catalog: &CatalogService,
    config: &AppConfig,
    submission_path: PathBuf,
    header_args: HeaderArgs,
    json: Option<PathBuf>,
    no_pdf: bool,
) -> Result<()> {
    let mut submission = read_submission(&submission_path).await?;
    header_args.apply(&mut submission.header)?;

    let report = InspectionService::default().build_report(catalog.catalog(), &submission)?;
    print!("{}", summary_text(&report));

    let generator = ReportGenerationService::new(config.report_config.clone());
    if !no_pdf {
        let path = generator.export_pdf(&report).await?;
        crate::log_user_operation!("导出PDF报告 {:?}", path);
        println!("PDF exported: {}", path.display());
    }
    if let Some(json_path) = json {
        let path = generator.export_json(&report, &json_path).await?;
        crate::log_user_operation!("导出JSON报告 {:?}", path);
        println!("JSON exported: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_limits() {
        assert_eq!(parse_limits("0:0.05").unwrap(), CheckLimits::new(0.0, 0.05));
        assert_eq!(parse_limits(":8").unwrap(), CheckLimits { min: None, max: Some(8.0) });
        assert_eq!(parse_limits("-5:-1").unwrap(), CheckLimits::new(-5.0, -1.0));
        assert!(parse_limits("5").is_err());
        assert!(parse_limits("a:b").is_err());
    }

    #[test]
    fn test_parse_entries() {
        assert_eq!(parse_template_entry("guard").unwrap(), TemplateEntry::new("guard"));
        assert_eq!(
            parse_template_entry("gap=1:2").unwrap(),
            TemplateEntry::with_limits("gap", CheckLimits::new(1.0, 2.0))
        );
        assert!(parse_template_entry("").is_err());

        assert_eq!(parse_override("gap=:3").unwrap().1, CheckLimits { min: None, max: Some(3.0) });
        assert!(parse_override("gap").is_err());
        assert!(parse_override("gap=:").is_err());
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from([
            "service-checklist",
            "--data-dir",
            "/tmp/data",
            "machine",
            "save",
            "Lathe 3",
            "-t",
            "Lathe",
            "-t",
            "Coolant",
            "-o",
            "coolant_concentration=5.5:7.5",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        match cli.command {
            Commands::Machine { action: MachineAction::Save { name, templates, overrides } } => {
                assert_eq!(name, "Lathe 3");
                assert_eq!(templates, vec!["Lathe", "Coolant"]);
                assert_eq!(overrides[0].1, CheckLimits::new(5.5, 7.5));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "service-checklist",
            "check",
            "add",
            "--title",
            "E-Stop Tested",
            "--type",
            "boolean",
        ])
        .unwrap();
        match cli.command {
            Commands::Check { action: CheckAction::Add(args) } => assert_eq!(args.kind, CheckKind::Boolean),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_user_error_classification() {
        let duplicate: anyhow::Error = AppError::already_exists_error("检查项", "gap").into();
        assert_eq!(user_error(&duplicate).map(|e| e.error_code()), Some("ALREADY_EXISTS_ERROR"));

        let io: anyhow::Error = AppError::io_error("磁盘已满", "StorageFull").into();
        assert!(user_error(&io).is_none());

        let wrapped = anyhow::Error::from(AppError::validation_error("标题不能为空")).context("failed to add check");
        assert!(user_error(&wrapped).is_some());
        assert!(user_error(&anyhow::anyhow!("plain failure")).is_none());
    }

    #[test]
    fn test_header_args() {
        let mut header = ReportHeader::default();
        HeaderArgs {
            date: Some("2026-10-19".to_string()),
            engineer: Some("R. Okafor".to_string()),
            ..HeaderArgs::default()
        }
        .apply(&mut header)
        .unwrap();
        assert_eq!(header.service_date, "2026-10-19");
        assert_eq!(header.engineer, "R. Okafor");

        let bad = HeaderArgs { date: Some("19/10/2026".to_string()), ..HeaderArgs::default() };
        assert!(bad.apply(&mut header).is_err());
    }
}
