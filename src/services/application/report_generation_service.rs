/// 报告生成服务
///
/// 负责将服务报告导出为PDF（A4，摘要表 + 各机器明细表）和JSON

use async_trait::async_trait;
use chrono::Local;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::models::enums::CheckStatus;
use crate::models::structs::{MachineReportEntry, ServiceReport};
use crate::utils::config::ReportConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time_utils;

/// 报告生成服务接口
#[async_trait]
pub trait IReportGenerationService: Send + Sync {
    /// 生成PDF报告，返回文件路径
    async fn export_pdf(&self, report: &ServiceReport) -> AppResult<PathBuf>;

    /// 将报告以JSON格式写入指定文件
    async fn export_json(&self, report: &ServiceReport, output_path: &Path) -> AppResult<PathBuf>;
}

// ==================== 版面参数（毫米） ====================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 1.8;
const BODY_SIZE: f32 = 9.0;
const HEADING_SIZE: f32 = 13.0;
const TITLE_SIZE: f32 = 18.0;
/// 1pt = 0.3528mm
const PT_TO_MM: f32 = 0.3528;

const SUMMARY_COLUMNS: [(&str, f32); 2] = [("Machine", 88.0), ("Status", 53.0)];
const DETAIL_COLUMNS: [(&str, f32); 4] = [("Check", 63.0), ("Result", 25.0), ("Details", 56.0), ("Notes", 42.0)];

type Rgb3 = (f32, f32, f32);

const BLACK: Rgb3 = (0.0, 0.0, 0.0);
const GRID_GREY: Rgb3 = (0.5, 0.5, 0.5);
const HEADER_GREY: Rgb3 = (0.83, 0.83, 0.83);

fn color((r, g, b): Rgb3) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// 按列宽截断单元格文本（Helvetica 平均字宽约为字号的一半）
fn fit_text(text: &str, width: f32, size: f32) -> String {
    let usable = (width - 2.0 * CELL_PADDING).max(0.0);
    let max_chars = (usable / (size * 0.5 * PT_TO_MM)).floor() as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

/// 按页面正文宽度截断整行文字（标题、表头字段、机器标题）
fn fit_line(text: &str, size: f32) -> String {
    fit_text(text, PAGE_WIDTH - 2.0 * MARGIN, size)
}

/// 表格单元格
struct Cell {
    text: String,
    color: Rgb3,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: BLACK }
    }

    fn status(status: CheckStatus) -> Self {
        Self { text: status.label().to_string(), color: status.rgb() }
    }
}

/// 逐页排版的PDF写入器，`cursor` 为当前行顶部的纵坐标
struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl PdfCanvas {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::pdf_error(format!("添加字体失败: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::pdf_error(format!("添加字体失败: {}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    /// 剩余空间不足时换页，返回是否换页
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.cursor - height < MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&self, text: &str, size: f32, x: f32, baseline: f32, bold: bool, rgb: Rgb3) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer.set_fill_color(color(rgb));
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
    }

    /// 写一行文字并下移光标
    fn line(&mut self, text: &str, size: f32, bold: bool, rgb: Rgb3) {
        let height = size * PT_TO_MM * 1.6;
        self.ensure_space(height);
        self.cursor -= height;
        self.text(&fit_line(text, size), size, MARGIN, self.cursor, bold, rgb);
    }

    fn space(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn rect_points(x: f32, top: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
        vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top - height)), false),
            (Point::new(Mm(x), Mm(top - height)), false),
        ]
    }

    fn fill_rect(&self, x: f32, top: f32, width: f32, height: f32, rgb: Rgb3) {
        self.layer.set_fill_color(color(rgb));
        self.layer.add_polygon(Polygon {
            rings: vec![Self::rect_points(x, top, width, height)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_rect(&self, x: f32, top: f32, width: f32, height: f32) {
        self.layer.set_outline_color(color(GRID_GREY));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: Self::rect_points(x, top, width, height),
            is_closed: true,
        });
    }

    fn row(&mut self, columns: &[(&str, f32)], cells: &[Cell], header: bool) {
        let top = self.cursor;
        let total: f32 = columns.iter().map(|(_, w)| w).sum();
        if header {
            self.fill_rect(MARGIN, top, total, ROW_HEIGHT, HEADER_GREY);
        }

        let baseline = top - ROW_HEIGHT + 2.2;
        let mut x = MARGIN;
        for ((_, width), cell) in columns.iter().zip(cells) {
            self.stroke_rect(x, top, *width, ROW_HEIGHT);
            let text = fit_text(&cell.text, *width, BODY_SIZE);
            self.text(&text, BODY_SIZE, x + CELL_PADDING, baseline, header, cell.color);
            x += width;
        }
        self.cursor -= ROW_HEIGHT;
    }

    /// 绘制表格，跨页时在新页重复表头
    fn table(&mut self, columns: &[(&str, f32)], rows: Vec<Vec<Cell>>) {
        let header: Vec<Cell> = columns.iter().map(|(title, _)| Cell::plain(*title)).collect();

        self.ensure_space(ROW_HEIGHT * 2.0);
        self.row(columns, &header, true);
        for cells in rows {
            if self.ensure_space(ROW_HEIGHT) {
                self.row(columns, &header, true);
            }
            self.row(columns, &cells, false);
        }
    }

    fn save(self, output_path: &Path) -> AppResult<()> {
        let file = File::create(output_path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| AppError::pdf_error(format!("保存PDF文件失败: {}", e)))
    }
}

/// 报告生成服务实现
pub struct ReportGenerationService {
    config: ReportConfig,
}

impl ReportGenerationService {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn export_dir(&self) -> &Path {
        &self.config.export_dir
    }

    /// 报告文件名：`<前缀>_<YYYYmmdd_HHMMSS>.pdf`，时间取报告生成时间（本地时区）
    pub fn pdf_file_name(&self, report: &ServiceReport) -> String {
        let stamp = time_utils::file_stamp(&report.generated_at.with_timezone(&Local));
        format!("{}_{}.pdf", self.config.file_prefix, stamp)
    }

    fn detail_rows(entry: &MachineReportEntry) -> Vec<Vec<Cell>> {
        entry
            .results
            .iter()
            .map(|result| {
                vec![
                    Cell::plain(result.title.clone()),
                    Cell::status(result.status()),
                    Cell::plain(result.details()),
                    Cell::plain(result.note.clone()),
                ]
            })
            .collect()
    }

    /// 排版并写出PDF文件
    fn render_pdf(&self, report: &ServiceReport, output_path: &Path) -> AppResult<()> {
        let mut canvas = PdfCanvas::new(&self.config.report_title)?;

        canvas.line(&self.config.report_title, TITLE_SIZE, true, BLACK);
        canvas.space(4.0);
        for (label, value) in report.header.fields() {
            canvas.line(&format!("{}: {}", label, value), BODY_SIZE + 1.0, false, BLACK);
        }
        let generated = report.generated_at.with_timezone(&Local).format(time_utils::DISPLAY_FORMAT);
        canvas.line(&format!("Generated: {}", generated), BODY_SIZE + 1.0, false, BLACK);
        canvas.space(6.0);

        let summary = report
            .machines
            .iter()
            .map(|entry| vec![Cell::plain(entry.machine.clone()), Cell::status(entry.status)])
            .collect();
        canvas.table(&SUMMARY_COLUMNS, summary);

        if !report.unconfigured_machines.is_empty() {
            canvas.space(4.0);
            canvas.line(
                &format!("Not configured: {}", report.unconfigured_machines.join(", ")),
                BODY_SIZE,
                false,
                GRID_GREY,
            );
        }

        for (index, entry) in report.machines.iter().enumerate() {
            if index == 0 {
                canvas.new_page();
            } else {
                canvas.space(8.0);
            }
            canvas.line(
                &format!("{} - {}", entry.machine, entry.status.label()),
                HEADING_SIZE,
                true,
                entry.status.rgb(),
            );
            canvas.space(3.0);
            canvas.table(&DETAIL_COLUMNS, Self::detail_rows(entry));
        }

        canvas.save(output_path)
    }
}

#[async_trait]
impl IReportGenerationService for ReportGenerationService {
    async fn export_pdf(&self, report: &ServiceReport) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.export_dir).await.map_err(|e| {
            AppError::io_error(
                format!("创建导出目录 {:?} 失败: {}", self.config.export_dir, e),
                e.kind().to_string(),
            )
        })?;

        let output_path = self.config.export_dir.join(self.pdf_file_name(report));
        self.render_pdf(report, &output_path)
            .map_err(|e| AppError::report_generation_error(format!("生成PDF报告失败: {}", e)))?;

        log::info!("PDF报告已生成: {:?}", output_path);
        Ok(output_path)
    }

    async fn export_json(&self, report: &ServiceReport, output_path: &Path) -> AppResult<PathBuf> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(report)?;
        tokio::fs::write(output_path, content).await?;

        log::info!("JSON报告已生成: {:?}", output_path);
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::CheckKind;
    use crate::models::structs::{EvaluationResult, ReportHeader, SubmittedValue};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_report(machines: usize) -> ServiceReport {
        let results = |n: usize| -> Vec<EvaluationResult> {
            (0..n)
                .map(|i| EvaluationResult {
                    check_id: format!("check_{}", i),
                    title: format!("A rather long check title number {} for truncation", i),
                    kind: CheckKind::Numeric,
                    passed: i % 5 != 0,
                    warning: i % 3 == 0,
                    value: SubmittedValue::Numeric(i as f64),
                    min: Some(0.0),
                    max: Some(40.0),
                    unit: Some("mm".to_string()),
                    note: "ok".to_string(),
                })
                .collect()
        };

        ServiceReport {
            header: ReportHeader {
                service_date: "2026-10-19".to_string(),
                engineer: "R. Okafor".to_string(),
                job_id: "WO-118".to_string(),
                customer: "Plant 4".to_string(),
            },
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap(),
            machines: (0..machines)
                .map(|m| crate::services::domain::aggregate(&format!("Machine {}", m), results(45)))
                .collect(),
            unconfigured_machines: vec!["Spare".to_string()],
        }
    }

    fn service(temp_dir: &TempDir) -> ReportGenerationService {
        ReportGenerationService::new(ReportConfig {
            export_dir: temp_dir.path().join("exports").join("nested"),
            ..ReportConfig::default()
        })
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("PASS", 25.0, BODY_SIZE), "PASS");
        let long = "x".repeat(200);
        let fitted = fit_text(&long, 25.0, BODY_SIZE);
        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() < 20);
    }

    /// 超长的机器名称与客户名称截断在页面正文宽度之内
    #[test]
    fn test_fit_line_stays_on_page() {
        assert_eq!(fit_line("Customer: Plant 4", BODY_SIZE + 1.0), "Customer: Plant 4");

        let heading = format!("{} - WARNING", "Very Long Machine Name ".repeat(10));
        let fitted = fit_line(&heading, HEADING_SIZE);
        assert!(fitted.ends_with("..."));
        let estimated_width = fitted.chars().count() as f32 * HEADING_SIZE * 0.5 * PT_TO_MM;
        assert!(estimated_width <= PAGE_WIDTH - 2.0 * MARGIN);
    }

    #[test]
    fn test_pdf_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let report = sample_report(1);
        let name = service(&temp_dir).pdf_file_name(&report);
        assert!(name.starts_with("service_report_2026101"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), "service_report_YYYYmmdd_HHMMSS.pdf".len());
    }

    /// 导出目录不存在时自动创建，生成合法的PDF文件（含分页）
    #[tokio::test]
    async fn test_export_pdf_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);
        assert!(!service.export_dir().exists());

        let path = service.export_pdf(&sample_report(3)).await.unwrap();
        assert!(path.starts_with(service.export_dir()));

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_export_pdf_without_machines() {
        let temp_dir = TempDir::new().unwrap();
        let path = service(&temp_dir).export_pdf(&sample_report(0)).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_export_json() {
        let temp_dir = TempDir::new().unwrap();
        let report = sample_report(2);
        let output = temp_dir.path().join("out").join("report.json");

        service(&temp_dir).export_json(&report, &output).await.unwrap();

        let parsed: ServiceReport = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
