// ==========================================
// 作业日志追踪系统 - 导入层
// ==========================================
// 职责: 固定布局的生产表格 -> 作业日志记录
// 支持: xlsx (calamine)
// ==========================================

// 模块声明
pub mod base_date;
pub mod cell_value;
pub mod datetime_combiner;
pub mod error;
pub mod extent;
pub mod layout;
pub mod product_code_map;
pub mod workbook;
pub mod worklog_importer;
pub mod worklog_importer_trait;

// 重导出核心类型
pub use base_date::{resolve_base_date, BaseDate};
pub use cell_value::SheetCell;
pub use datetime_combiner::{combine_excel_date_time, excel_serial_to_date};
pub use error::{ImportError, ImportResult};
pub use extent::{detect_extent, DataExtent};
pub use layout::{RowScanMode, SheetLayout};
pub use product_code_map::ProductCodeMap;
pub use workbook::{load_sheets, LoadedSheets, SheetGrid};
pub use worklog_importer::{ImportPhase, WorkLogImporterImpl};

// 重导出 Trait 接口
pub use worklog_importer_trait::{WorkLogImporter, WorkLogSink};
