// ==========================================
// 作业日志追踪系统 - 工作簿加载
// ==========================================
// 职责: 使用 calamine 读取 xlsx, 转换为稀疏单元格网格
// 说明: 仅加载布局需要的工作表; 行列坐标为绝对 0 基索引
// ==========================================

use crate::importer::cell_value::{SheetCell, EMPTY_CELL};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, Range, Reader, Xlsx};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::{debug, info};

// ==========================================
// SheetGrid - 稀疏单元格网格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    name: String,
    cells: BTreeMap<(u32, u32), SheetCell>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 写入单元格 (Empty 即删除)
    pub fn set_cell(&mut self, row: u32, col: u32, cell: SheetCell) {
        if cell == SheetCell::Empty {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), cell);
        }
    }

    pub fn with_cell(mut self, row: u32, col: u32, cell: SheetCell) -> Self {
        self.set_cell(row, col, cell);
        self
    }

    /// 读取单元格, 不存在时返回空单元格
    pub fn cell(&self, row: u32, col: u32) -> &SheetCell {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY_CELL)
    }

    /// 物理最后一行 (有任意单元格的行)
    pub fn last_row(&self) -> Option<u32> {
        self.cells.last_key_value().map(|((row, _), _)| *row)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 由 calamine 的值区域和公式区域构建
    pub fn from_ranges(name: &str, values: &Range<Data>, formulas: Option<&Range<String>>) -> Self {
        let mut grid = SheetGrid::new(name);

        if let Some((row0, col0)) = values.start() {
            for (row, col, data) in values.used_cells() {
                grid.set_cell(row0 + row as u32, col0 + col as u32, data_to_cell(data));
            }
        }

        if let Some(formulas) = formulas {
            if let Some((row0, col0)) = formulas.start() {
                for (row, col, text) in formulas.used_cells() {
                    if text.trim().is_empty() {
                        continue;
                    }
                    let key = (row0 + row as u32, col0 + col as u32);
                    let cached = grid.cells.remove(&key).unwrap_or_default();
                    grid.cells.insert(
                        key,
                        SheetCell::Formula {
                            text: text.clone(),
                            cached: Box::new(cached),
                        },
                    );
                }
            }
        }

        grid
    }
}

/// calamine 单元格 -> SheetCell
pub fn data_to_cell(data: &Data) -> SheetCell {
    match data {
        Data::Empty => SheetCell::Empty,
        Data::String(s) => SheetCell::Text(s.clone()),
        Data::Float(f) => SheetCell::Number(*f),
        Data::Int(i) => SheetCell::Number(*i as f64),
        Data::Bool(b) => SheetCell::Bool(*b),
        Data::DateTime(dt) => SheetCell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
        Data::Error(e) => SheetCell::Error(e.to_string()),
    }
}

/// 0 基列索引 -> 列字母 (0 -> A, 26 -> AA)
pub fn column_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

// ==========================================
// LoadedSheets - 已加载的工作表集合
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LoadedSheets {
    /// 工作簿中工作表总数
    pub sheet_count: usize,
    sheets: BTreeMap<usize, SheetGrid>,
}

impl LoadedSheets {
    pub fn from_grids(sheet_count: usize, grids: Vec<(usize, SheetGrid)>) -> Self {
        Self {
            sheet_count,
            sheets: grids.into_iter().collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&SheetGrid> {
        self.sheets.get(&index)
    }

    /// 获取必需工作表
    pub fn require(&self, index: usize) -> ImportResult<&SheetGrid> {
        self.sheets.get(&index).ok_or_else(|| ImportError::SheetMissing {
            required: vec![index],
            actual: self.sheet_count,
        })
    }

    /// 检查必需工作表是否齐全
    pub fn ensure_present(&self, required: &[usize]) -> ImportResult<()> {
        if required.iter().all(|index| self.sheets.contains_key(index)) {
            Ok(())
        } else {
            Err(ImportError::SheetMissing {
                required: required.to_vec(),
                actual: self.sheet_count,
            })
        }
    }
}

/// 从内存字节加载工作簿中的指定工作表
///
/// # 参数
/// - bytes: xlsx 文件内容
/// - required: 需要加载的工作表索引
///
/// # 返回
/// - Err(EmptyUpload): 内容为空
/// - Err(UnreadableWorkbook): 不是有效的 xlsx
/// - Err(SheetMissing): 工作表数量不足
pub fn load_sheets(bytes: &[u8], required: &[usize]) -> ImportResult<LoadedSheets> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyUpload);
    }

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let names = workbook.sheet_names();
    let sheet_count = names.len();
    debug!(sheet_count, sheets = ?names, "工作簿已打开");

    if required.iter().any(|index| *index >= sheet_count) {
        return Err(ImportError::SheetMissing {
            required: required.to_vec(),
            actual: sheet_count,
        });
    }

    let mut sheets = BTreeMap::new();
    for &index in required {
        if sheets.contains_key(&index) {
            continue;
        }
        let name = names.get(index).cloned().unwrap_or_default();

        let values = workbook
            .worksheet_range_at(index)
            .ok_or_else(|| ImportError::SheetReadError {
                index,
                message: "工作表不存在".to_string(),
            })?
            .map_err(|e| ImportError::SheetReadError {
                index,
                message: e.to_string(),
            })?;

        let formulas = match workbook.worksheet_formula(&name) {
            Ok(range) => Some(range),
            Err(e) => {
                debug!(sheet = %name, error = %e, "公式区域读取失败, 仅使用缓存值");
                None
            }
        };

        let grid = SheetGrid::from_ranges(&name, &values, formulas.as_ref());
        info!(index, sheet = %name, last_row = ?grid.last_row(), "工作表已加载");
        sheets.insert(index, grid);
    }

    Ok(LoadedSheets {
        sheet_count,
        sheets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(8), "I");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(191), "GJ");
    }

    #[test]
    fn test_grid_sparse_access() {
        let grid = SheetGrid::new("生产")
            .with_cell(7, 2, SheetCell::Number(0.5))
            .with_cell(12, 1, SheetCell::Text("RED".into()));

        assert_eq!(grid.name(), "生产");
        assert_eq!(grid.cell(7, 2), &SheetCell::Number(0.5));
        assert_eq!(grid.cell(100, 100), &SheetCell::Empty);
        assert_eq!(grid.last_row(), Some(12));

        let mut grid = grid;
        grid.set_cell(12, 1, SheetCell::Empty);
        assert_eq!(grid.last_row(), Some(7));
    }

    #[test]
    fn test_data_to_cell() {
        assert_eq!(data_to_cell(&Data::Int(3)), SheetCell::Number(3.0));
        assert_eq!(
            data_to_cell(&Data::String("A1".into())),
            SheetCell::Text("A1".into())
        );
        assert_eq!(data_to_cell(&Data::Empty), SheetCell::Empty);
    }

    #[test]
    fn test_from_ranges_absolute_positions() {
        let mut values: Range<Data> = Range::new((6, 8), (7, 9));
        values.set_value((6, 8), Data::String("A1".into()));
        values.set_value((7, 9), Data::Float(4.0));

        let mut formulas: Range<String> = Range::new((7, 9), (7, 9));
        formulas.set_value((7, 9), "B8*2".to_string());

        let grid = SheetGrid::from_ranges("Sheet4", &values, Some(&formulas));
        assert_eq!(grid.cell(6, 8), &SheetCell::Text("A1".into()));
        assert_eq!(
            grid.cell(7, 9),
            &SheetCell::Formula {
                text: "B8*2".into(),
                cached: Box::new(SheetCell::Number(4.0)),
            }
        );
    }

    #[test]
    fn test_load_rejects_empty_and_garbage() {
        assert!(matches!(load_sheets(&[], &[0]), Err(ImportError::EmptyUpload)));
        assert!(matches!(
            load_sheets(b"not a workbook", &[0]),
            Err(ImportError::UnreadableWorkbook(_))
        ));
    }

    #[test]
    fn test_ensure_present() {
        let sheets = LoadedSheets::from_grids(4, vec![(2, SheetGrid::new("a")), (3, SheetGrid::new("b"))]);
        assert!(sheets.ensure_present(&[2, 3]).is_ok());
        assert!(matches!(
            sheets.ensure_present(&[2, 5]),
            Err(ImportError::SheetMissing { actual: 4, .. })
        ));
    }
}
