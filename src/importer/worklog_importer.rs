// ==========================================
// 作业日志追踪系统 - 作业日志导入器实现
// ==========================================
// 职责: 驱动整个导入流程, 从工作簿到逐条持久化
// 流程: 校验工作表 → 解析上下文 (基准日期/产品代码/范围)
//       → 逐行处理 → 完成
// 错误: 工作表/文件错误整批中止; 行/单元格错误收集后继续
// ==========================================

use crate::config::ImportLayoutReader;
use crate::domain::import::{ImportOutcome, SheetTally};
use crate::domain::work_log::NewWorkLog;
use crate::importer::base_date::resolve_base_date;
use crate::importer::datetime_combiner::extract_work_datetime;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::extent::detect_extent;
use crate::importer::layout::{RowScanMode, SheetLayout};
use crate::importer::product_code_map::ProductCodeMap;
use crate::importer::workbook::{column_letter, load_sheets, LoadedSheets, SheetGrid};
use crate::importer::worklog_importer_trait::{WorkLogImporter, WorkLogSink};
use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportPhase - 导入阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    ValidatingSheets,
    ResolvingContext,
    ProcessingRows,
    Completed,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::ValidatingSheets => "ValidatingSheets",
            ImportPhase::ResolvingContext => "ResolvingContext",
            ImportPhase::ProcessingRows => "ProcessingRows",
            ImportPhase::Completed => "Completed",
        }
    }
}

// ==========================================
// 行处理结果 (每行独立产生, 最后归并)
// ==========================================
#[derive(Debug, Default)]
struct RowOutcome {
    created: usize,
    errors: Vec<String>,
}

impl RowOutcome {
    fn failed(message: String) -> Self {
        Self {
            created: 0,
            errors: vec![message],
        }
    }

    fn merge(mut self, other: RowOutcome) -> Self {
        self.created += other.created;
        self.errors.extend(other.errors);
        self
    }
}

enum RowDisposition {
    /// 时间或颜色为空
    Blank,
    Evaluated(RowOutcome),
}

impl RowDisposition {
    fn into_outcome(self) -> Option<RowOutcome> {
        match self {
            RowDisposition::Blank => None,
            RowDisposition::Evaluated(outcome) => Some(outcome),
        }
    }
}

/// 单个主数据表的处理上下文 (只读)
struct SheetContext<'a> {
    layout: &'a SheetLayout,
    main: &'a SheetGrid,
    names: &'a SheetGrid,
    base_date: NaiveDate,
    codes: ProductCodeMap,
    rows: RangeInclusive<u32>,
    columns: RangeInclusive<u32>,
    car_model: &'a str,
}

// ==========================================
// WorkLogImporterImpl - 作业日志导入器实现
// ==========================================
pub struct WorkLogImporterImpl<S, C>
where
    S: WorkLogSink,
    C: ImportLayoutReader,
{
    // 持久化接口
    sink: S,

    // 布局读取器
    config: C,
}

impl<S, C> WorkLogImporterImpl<S, C>
where
    S: WorkLogSink,
    C: ImportLayoutReader,
{
    /// 创建新的导入器实例
    ///
    /// # 参数
    /// - sink: 作业日志持久化接口
    /// - config: 表格布局读取器
    pub fn new(sink: S, config: C) -> Self {
        Self { sink, config }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 读取并校验布局 (配置错误为整批错误)
    fn load_layout(&self) -> ImportResult<SheetLayout> {
        let layout = self.config.get_sheet_layout().map_err(|e| {
            error!(error = %e, "表格布局读取失败");
            e
        })?;
        layout.validate()?;
        Ok(layout)
    }

    /// 对已加载的工作表执行导入
    ///
    /// # 参数
    /// - sheets: 已加载的工作表
    /// - layout: 表格布局
    /// - car_model: 车型标签
    /// - today: 基准日期缺失时的回退日期
    pub fn import_loaded(
        &self,
        sheets: &LoadedSheets,
        layout: &SheetLayout,
        car_model: &str,
        today: NaiveDate,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let import_id = Uuid::new_v4().to_string();

        // === 阶段 1: 校验工作表 ===
        enter_phase(&import_id, ImportPhase::ValidatingSheets);
        sheets.ensure_present(&layout.required_sheet_indices())?;
        let names = sheets.require(layout.product_name_sheet_index)?;

        // === 阶段 2: 解析上下文 ===
        enter_phase(&import_id, ImportPhase::ResolvingContext);
        let base_date = resolve_base_date(
            Some(names),
            layout.base_date_row,
            layout.base_date_col,
            today,
        );
        let mut warnings: Vec<String> = base_date.warning.iter().cloned().collect();
        info!(base_date = %base_date.date, fallback = base_date.is_fallback(), "基准日期已确定");

        let mut tallies = Vec::with_capacity(layout.main_sheet_indices.len());
        let mut errors = Vec::new();

        for &index in &layout.main_sheet_indices {
            let main = sheets.require(index)?;
            let context =
                resolve_sheet_context(layout, main, names, base_date.date, car_model, &mut warnings);

            // === 阶段 3: 逐行处理 ===
            enter_phase(&import_id, ImportPhase::ProcessingRows);
            let outcome = self.process_rows(&context);
            info!(
                sheet = %main.name(),
                created = outcome.created,
                errors = outcome.errors.len(),
                "工作表处理完成"
            );

            tallies.push(SheetTally {
                sheet_index: index,
                sheet_name: main.name().to_string(),
                processed: outcome.created,
                error_count: outcome.errors.len(),
            });
            errors.extend(outcome.errors);
        }

        // === 阶段 4: 完成 ===
        enter_phase(&import_id, ImportPhase::Completed);
        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let result = ImportOutcome::completed(import_id, tallies, errors, warnings, elapsed_ms);

        info!(
            import_id = %result.import_id,
            total_processed = result.total_processed,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            elapsed_ms,
            "作业日志导入完成"
        );
        Ok(result)
    }

    fn process_rows(&self, ctx: &SheetContext<'_>) -> RowOutcome {
        match ctx.layout.row_scan_mode {
            RowScanMode::StopAtFirstBlank => {
                let mut total = RowOutcome::default();
                for row in ctx.rows.clone() {
                    match self.evaluate_row(ctx, row) {
                        RowDisposition::Blank => {
                            debug!(row = row + 1, "时间或颜色为空, 视为数据结束");
                            break;
                        }
                        RowDisposition::Evaluated(outcome) => total = total.merge(outcome),
                    }
                }
                total
            }
            RowScanMode::DetectExtent if ctx.layout.parallel_rows => ctx
                .rows
                .clone()
                .into_par_iter()
                .filter_map(|row| self.evaluate_row(ctx, row).into_outcome())
                .reduce(RowOutcome::default, RowOutcome::merge),
            RowScanMode::DetectExtent => ctx
                .rows
                .clone()
                .filter_map(|row| self.evaluate_row(ctx, row).into_outcome())
                .fold(RowOutcome::default(), RowOutcome::merge),
        }
    }

    /// 处理单行: 每个数量 > 0 的单元格生成一条记录
    fn evaluate_row(&self, ctx: &SheetContext<'_>, row: u32) -> RowDisposition {
        let layout = ctx.layout;
        let time_cell = ctx.main.cell(row, layout.datetime_col);
        let color_cell = ctx.main.cell(row, layout.color_col);
        if time_cell.is_blank() || color_cell.is_blank() {
            return RowDisposition::Blank;
        }

        let display_row = row + 1;
        let Some(work_datetime) = extract_work_datetime(time_cell, ctx.base_date) else {
            warn!(
                row = display_row,
                value = %time_cell.as_display_string(),
                "时间数据提取失败"
            );
            return RowDisposition::Evaluated(RowOutcome::failed(format!(
                "行 {}: 时间数据提取失败",
                display_row
            )));
        };

        let product_color = layout.normalize_color(&color_cell.as_display_string());
        let product_name = ctx.names.cell(row, layout.product_name_col).as_display_string();
        let mut outcome = RowOutcome::default();

        for col in ctx.columns.clone() {
            let quantity_cell = ctx.main.cell(row, col);
            if quantity_cell.is_empty() {
                continue;
            }
            let quantity = quantity_cell.as_quantity();
            if quantity <= 0 {
                continue;
            }

            let position = format!("行 {}, 列 {}", display_row, column_letter(col));
            let Some(product_code) = ctx.codes.get(col) else {
                warn!(row = display_row, column = %column_letter(col), quantity, "找不到产品代码");
                outcome
                    .errors
                    .push(format!("{}: 找不到该位置的产品代码", position));
                continue;
            };

            let record = NewWorkLog {
                work_datetime,
                car_model: ctx.car_model.to_string(),
                product_color: product_color.clone(),
                product_code: product_code.to_string(),
                product_name: product_name.clone(),
                quantity,
            };

            match self.sink.create_record(&record) {
                Ok(Some(id)) => {
                    debug!(id, row = display_row, column = %column_letter(col), "记录已保存");
                    outcome.created += 1;
                }
                Ok(None) => {
                    error!(row = display_row, column = %column_letter(col), "记录保存失败: 未返回主键");
                    outcome.errors.push(format!("{}: 保存失败", position));
                }
                Err(e) => {
                    error!(row = display_row, column = %column_letter(col), error = %e, "记录保存失败");
                    outcome.errors.push(format!("{}: {}", position, e));
                }
            }
        }

        RowDisposition::Evaluated(outcome)
    }
}

impl<S, C> WorkLogImporter for WorkLogImporterImpl<S, C>
where
    S: WorkLogSink,
    C: ImportLayoutReader,
{
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn import_workbook(&self, file_name: &str, bytes: &[u8], car_model: &str) -> ImportResult<ImportOutcome> {
        info!("开始导入作业日志");
        if bytes.is_empty() {
            warn!("上传的文件为空");
            return Err(ImportError::EmptyUpload);
        }

        let layout = self.load_layout()?;
        debug!(layout = %layout.version, mode = ?layout.row_scan_mode, "使用表格布局");

        let sheets = load_sheets(bytes, &layout.required_sheet_indices()).map_err(|e| {
            warn!(error = %e, "工作簿校验失败");
            e
        })?;

        self.import_loaded(&sheets, &layout, car_model, Local::now().date_naive())
    }

    fn import_from_path(&self, path: &Path, car_model: &str) -> ImportResult<ImportOutcome> {
        let bytes = std::fs::read(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "文件读取失败");
            ImportError::from(e)
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.import_workbook(&file_name, &bytes, car_model)
    }
}

fn enter_phase(import_id: &str, phase: ImportPhase) {
    debug!(import_id, phase = phase.as_str(), "进入导入阶段");
}

/// 解析单个主数据表的上下文: 产品代码映射与处理范围
fn resolve_sheet_context<'a>(
    layout: &'a SheetLayout,
    main: &'a SheetGrid,
    names: &'a SheetGrid,
    base_date: NaiveDate,
    car_model: &'a str,
    warnings: &mut Vec<String>,
) -> SheetContext<'a> {
    let codes = ProductCodeMap::build(main, layout);
    if codes.is_empty() {
        warnings.push(format!("工作表 {} 未找到任何产品代码", main.name()));
    }

    let (rows, columns) = match layout.row_scan_mode {
        RowScanMode::StopAtFirstBlank => (layout.start_row..=layout.end_row, layout.quantity_columns()),
        RowScanMode::DetectExtent => {
            let extent = detect_extent(main, layout);
            let rows = match extent.last_row {
                Some(last_row) => layout.start_row..=last_row,
                None => {
                    warnings.push(format!("工作表 {} 没有可处理的数据行", main.name()));
                    empty_range()
                }
            };
            let last_col = extent
                .last_header_col
                .max(codes.last_column())
                .unwrap_or(layout.quantity_end_col)
                .min(layout.quantity_end_col);
            (rows, layout.quantity_start_col..=last_col)
        }
    };

    SheetContext {
        layout,
        main,
        names,
        base_date,
        codes,
        rows,
        columns,
        car_model,
    }
}

#[allow(clippy::reversed_empty_ranges)]
fn empty_range() -> RangeInclusive<u32> {
    1..=0
}
