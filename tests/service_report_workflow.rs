//! 服务检查单端到端流程测试
//!
//! 配置检查项、模板与机器 -> 重新加载 -> 生成空白表单 -> 填写 -> 评估 -> 导出

use std::sync::Arc;

use checklist_lib::commands::{self, Cli};
use checklist_lib::models::{CheckLimits, CheckStatus, CheckSubmission, Machine, ReportHeader};
use checklist_lib::services::{
    BaseService, CatalogService, CheckDraft, ChecklistPersistenceService, IReportGenerationService,
    InspectionService, JsonPersistenceService, ReportGenerationService, TemplateEntry,
};
use checklist_lib::utils::{AppConfig, PersistenceConfig, ReportConfig};
use clap::Parser;
use tempfile::TempDir;

async fn persistence(data_dir: &std::path::Path) -> Arc<JsonPersistenceService> {
    let mut service = JsonPersistenceService::new(PersistenceConfig {
        data_path: data_dir.to_path_buf(),
        ..PersistenceConfig::default()
    });
    service.initialize().await.expect("初始化持久化服务失败");
    Arc::new(service)
}

async fn configure(catalog: &mut CatalogService) {
    catalog
        .add_check(CheckDraft::numeric("Spindle Runout", "mm", 0.0, 0.05))
        .await
        .unwrap();
    catalog
        .add_check(CheckDraft::numeric("Coolant Concentration", "%", 5.0, 8.0))
        .await
        .unwrap();
    catalog.add_check(CheckDraft::boolean("E-Stop Tested")).await.unwrap();

    catalog
        .save_template(
            "Lathe",
            vec![
                TemplateEntry::with_limits("spindle_runout", CheckLimits::new(0.0, 0.03)),
                TemplateEntry::new("e-stop_tested"),
            ],
        )
        .await
        .unwrap();
    catalog
        .save_template("Coolant", vec![TemplateEntry::new("coolant_concentration")])
        .await
        .unwrap();

    catalog
        .save_machine(
            "Lathe 3",
            Machine::with_templates(["Lathe", "Coolant"])
                .with_override("coolant_concentration", CheckLimits::new(6.0, 8.0)),
        )
        .await
        .unwrap();
    catalog
        .save_machine("Mill 1", Machine::with_templates(["Coolant"]))
        .await
        .unwrap();
    catalog.save_machine("Spare", Machine::default()).await.unwrap();
}

#[tokio::test]
async fn test_full_service_report_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let mut catalog = CatalogService::load(persistence(&data_dir).await).await.unwrap();
    configure(&mut catalog).await;

    // 重新加载后与内存中的目录一致
    let storage = persistence(&data_dir).await;
    assert_eq!(storage.load_checklist().await.unwrap().len(), 3);
    let catalog = CatalogService::load(storage).await.unwrap();

    let inspection = InspectionService::default();
    let header = ReportHeader {
        service_date: "2026-10-19".to_string(),
        engineer: "R. Okafor".to_string(),
        job_id: "WO-118".to_string(),
        customer: "Plant 4".to_string(),
    };
    let mut submission = inspection.blank_submission(catalog.catalog(), header);
    assert_eq!(submission.machines.len(), 2);
    assert_eq!(submission.machines["Lathe 3"].len(), 3);

    submission.set("Lathe 3", "spindle_runout", CheckSubmission::numeric(0.015));
    submission.set("Lathe 3", "e-stop_tested", CheckSubmission::boolean(true));
    submission.set("Lathe 3", "coolant_concentration", CheckSubmission::numeric(7.9).with_note("near top"));
    submission.set("Mill 1", "coolant_concentration", CheckSubmission::numeric(4.0));

    let report = inspection.build_report(catalog.catalog(), &submission).unwrap();

    let lathe = report.machine("Lathe 3").unwrap();
    assert_eq!(lathe.status, CheckStatus::Warning);
    let ids: Vec<_> = lathe.results.iter().map(|r| r.check_id.as_str()).collect();
    assert_eq!(ids, vec!["spindle_runout", "coolant_concentration", "e-stop_tested"]);
    assert_eq!(lathe.results[1].min, Some(6.0));

    assert_eq!(report.machine("Mill 1").unwrap().status, CheckStatus::Fail);
    assert_eq!(report.unconfigured_machines, vec!["Spare".to_string()]);
    assert_eq!(report.overall_status(), Some(CheckStatus::Fail));

    let generator = ReportGenerationService::new(ReportConfig {
        export_dir: temp_dir.path().join("exports"),
        ..ReportConfig::default()
    });
    let pdf = generator.export_pdf(&report).await.unwrap();
    assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    let file_name = pdf.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("service_report_"));

    let json = generator
        .export_json(&report, &temp_dir.path().join("report.json"))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(value["machines"][0]["machine"], "Lathe 3");
    assert_eq!(value["machines"][0]["status"], "WARNING");
}

/// 删除检查项级联到模板与机器覆盖
#[tokio::test]
async fn test_cascade_delete_through_persistence() {
    let temp_dir = TempDir::new().unwrap();
    let mut catalog = CatalogService::load(persistence(temp_dir.path()).await).await.unwrap();
    configure(&mut catalog).await;

    catalog.delete_check("coolant_concentration").await.unwrap();

    let reloaded = CatalogService::load(persistence(temp_dir.path()).await).await.unwrap();
    let lathe = reloaded.resolve_machine("Lathe 3").unwrap();
    assert!(!lathe.checks.contains_key("coolant_concentration"));
    assert!(lathe.issues.is_empty());
    assert!(reloaded.resolve_machine("Mill 1").unwrap().is_empty());
    assert!(reloaded.catalog().templates["Coolant"].is_empty());
}

/// 通过命令行接口完成配置、生成表单与报告
#[tokio::test]
async fn test_cli_commands() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let form = temp_dir.path().join("form.json");
    let report_json = temp_dir.path().join("report.json");

    let mut config = AppConfig::default();
    config.report_config.export_dir = temp_dir.path().join("exports");

    let steps: Vec<Vec<&str>> = vec![
        vec!["check", "add", "--title", "Belt Tension", "--unit", "N", "--min", "40", "--max", "60"],
        vec!["check", "add", "--title", "Guard Fitted", "--type", "boolean"],
        vec!["template", "save", "Daily", "-c", "belt_tension=45:55", "-c", "guard_fitted"],
        vec!["machine", "save", "Press 1", "-t", "Daily", "-o", "belt_tension=:58"],
        vec!["resolve", "Press 1"],
        vec!["form", "--output", form.to_str().unwrap(), "--engineer", "R. Okafor"],
    ];
    for step in steps {
        let args = ["service-checklist", "--data-dir", data_dir.to_str().unwrap()]
            .into_iter()
            .chain(step);
        let cli = Cli::try_parse_from(args).unwrap();
        commands::run(cli, config.clone()).await.unwrap();
    }

    let mut submission: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&form).unwrap()).unwrap();
    assert_eq!(submission["header"]["engineer"], "R. Okafor");
    submission["machines"]["Press 1"]["belt_tension"]["value"] = serde_json::json!(50.0);
    submission["machines"]["Press 1"]["guard_fitted"]["value"] = serde_json::json!(true);
    std::fs::write(&form, serde_json::to_string(&submission).unwrap()).unwrap();

    let cli = Cli::try_parse_from([
        "service-checklist",
        "--data-dir",
        data_dir.to_str().unwrap(),
        "report",
        "--submission",
        form.to_str().unwrap(),
        "--json",
        report_json.to_str().unwrap(),
        "--no-pdf",
    ])
    .unwrap();
    commands::run(cli, config.clone()).await.unwrap();

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_json).unwrap()).unwrap();
    assert_eq!(report["machines"][0]["status"], "PASS");
    assert_eq!(report["machines"][0]["results"][0]["max"], 58.0);
    assert!(!config.report_config.export_dir.exists());

    // 重复的检查项是校验错误
    let cli = Cli::try_parse_from([
        "service-checklist",
        "--data-dir",
        data_dir.to_str().unwrap(),
        "check",
        "add",
        "--title",
        "belt tension",
    ])
    .unwrap();
    assert!(commands::run(cli, config).await.is_err());
}
