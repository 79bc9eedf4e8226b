// ==========================================
// 表格导入端到端测试
// ==========================================
// 真实 xlsx 内容 -> ImportApi -> SQLite -> 查询/推送

use worklog_tracker::api::ApiError;
use worklog_tracker::domain::types::{SortDirection, SortField};
use worklog_tracker::domain::work_log::{WorkLogQuery, WorkLogSort};

use test_helpers::{
    create_test_state, production_workbook, FixtureCell, FixtureRow, WorkbookFixture, MAIN_SHEET,
    NAME_SHEET, ROW_CODE_COL,
};

fn sample_rows() -> Vec<FixtureRow> {
    vec![
        FixtureRow {
            color: "RED",
            time: Some(0.375),
            product_name: "FRONT DOOR",
            quantities: vec![(0, 2.0), (1, 1.0)],
        },
        // 时间为空: 跳过 (v2) / 数据结束 (v1)
        FixtureRow {
            color: "BLUE",
            time: None,
            product_name: "REAR DOOR",
            quantities: vec![(0, 5.0)],
        },
        FixtureRow {
            color: "RED",
            time: Some(0.5),
            product_name: "HOOD",
            quantities: vec![(2, 3.0), (1, 0.0)],
        },
    ]
}

fn by_datetime() -> WorkLogSort {
    WorkLogSort {
        field: SortField::WorkDatetime,
        direction: SortDirection::Asc,
    }
}

#[tokio::test]
async fn test_upload_skips_blank_rows_and_persists_records() {
    let (_temp, state) = create_test_state();
    let mut sub = state.hub.subscribe();
    assert_eq!(sub.receiver.recv().await.unwrap().name, "connect");

    let bytes = production_workbook(&sample_rows()).to_bytes();
    let outcome = state
        .import_api
        .upload("line-a.xlsx".to_string(), bytes, "SONATA".to_string())
        .await
        .expect("导入失败");

    assert!(outcome.success);
    assert_eq!(outcome.total_processed, 3);
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert!(outcome.warnings.is_empty(), "warnings: {:?}", outcome.warnings);
    assert!(outcome.sheet_counts.is_empty());

    let logs = state
        .work_log_api
        .list_by_car_model("SONATA", by_datetime())
        .unwrap();
    assert_eq!(logs.len(), 3);

    let hood = logs
        .iter()
        .find(|v| v.work_log.product_code == "C3")
        .expect("缺少 C3 记录");
    assert_eq!(hood.work_log.quantity, 3);
    assert_eq!(hood.work_log.product_name, "HOOD");
    assert_eq!(hood.formatted_work_datetime, "24.03.15 12:00");

    let door_codes: Vec<&str> = logs
        .iter()
        .filter(|v| v.work_log.product_name == "FRONT DOOR")
        .map(|v| v.work_log.product_code.as_str())
        .collect();
    assert_eq!(door_codes.len(), 2);
    assert!(door_codes.contains(&"A1") && door_codes.contains(&"B2"));
    assert!(logs.iter().all(|v| v.work_log.product_color == "RED"));

    let event = sub.receiver.recv().await.unwrap();
    assert_eq!(event.name, "worklog-imported");
    assert_eq!(event.data["totalProcessed"], 3);
    assert_eq!(event.data["carModel"], "SONATA");
}

#[tokio::test]
async fn test_v1_layout_stops_at_first_blank_row() {
    let (_temp, state) = create_test_state();
    state.config_api.set_import_layout_version("v1").unwrap();

    let bytes = production_workbook(&sample_rows()).to_bytes();
    let outcome = state
        .import_api
        .upload("line-a.xlsx".to_string(), bytes, "K5".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.total_processed, 2);
    let page = state.work_log_api.list_work_logs(WorkLogQuery::default()).unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn test_unmapped_column_is_collected_error() {
    let (_temp, state) = create_test_state();
    // J 列表头为空且备用区无代码
    let bytes = WorkbookFixture::new(4)
        .cell(NAME_SHEET, 5, 11, FixtureCell::Date(test_helpers::BASE_DATE_SERIAL))
        .text(MAIN_SHEET, 6, 8, "A1")
        .text(MAIN_SHEET, 6, 10, "C3")
        .text(MAIN_SHEET, 7, 1, "WHITE")
        .text(MAIN_SHEET, 7, ROW_CODE_COL, "P8")
        .cell(MAIN_SHEET, 7, 2, FixtureCell::Time(0.25))
        .number(MAIN_SHEET, 7, 8, 1.0)
        .number(MAIN_SHEET, 7, 9, 4.0)
        .to_bytes();

    let outcome = state
        .import_api
        .upload("x.xlsx".to_string(), bytes, "K5".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.total_processed, 1);
    assert_eq!(outcome.errors, vec!["行 8, 列 J: 找不到该位置的产品代码".to_string()]);
}

#[tokio::test]
async fn test_missing_base_date_falls_back_with_warning() {
    let (_temp, state) = create_test_state();
    let bytes = WorkbookFixture::new(4)
        .text(MAIN_SHEET, 6, 8, "A1")
        .text(MAIN_SHEET, 7, 1, "RED")
        .text(MAIN_SHEET, 7, ROW_CODE_COL, "P8")
        .cell(MAIN_SHEET, 7, 2, FixtureCell::Time(0.5))
        .number(MAIN_SHEET, 7, 8, 2.0)
        .to_bytes();

    let outcome = state
        .import_api
        .upload("x.xlsx".to_string(), bytes, "K5".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.total_processed, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("L6"));
}

#[tokio::test]
async fn test_trailing_rows_without_row_code_are_ignored() {
    let (_temp, state) = create_test_state();
    // 第 9 行有时间和颜色, 但 G 列无代码
    let bytes = production_workbook(&sample_rows()[..1])
        .text(MAIN_SHEET, 8, 1, "BLUE")
        .cell(MAIN_SHEET, 8, 2, FixtureCell::Time(0.75))
        .number(MAIN_SHEET, 8, 8, 4.0)
        .to_bytes();

    let outcome = state
        .import_api
        .upload("tail.xlsx".to_string(), bytes, "K5".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.total_processed, 2);
    let logs = state.work_log_api.list_by_car_model("K5", by_datetime()).unwrap();
    assert!(logs.iter().all(|v| v.work_log.product_color == "RED"));
}

#[tokio::test]
async fn test_missing_sheet_is_rejected() {
    let (_temp, state) = create_test_state();
    let bytes = WorkbookFixture::new(3).text(2, 0, 0, "only three sheets").to_bytes();

    let result = state
        .import_api
        .upload("short.xlsx".to_string(), bytes, "K5".to_string())
        .await;

    assert!(matches!(result, Err(ApiError::UploadRejected(_))));
    let page = state.work_log_api.list_work_logs(WorkLogQuery::default()).unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn test_garbage_and_empty_uploads_are_rejected() {
    let (_temp, state) = create_test_state();

    let result = state
        .import_api
        .upload("junk.xlsx".to_string(), b"not a workbook".to_vec(), "K5".to_string())
        .await;
    assert!(matches!(result, Err(ApiError::UploadRejected(_))));

    let result = state
        .import_api
        .upload("empty.xlsx".to_string(), Vec::new(), "K5".to_string())
        .await;
    assert!(matches!(result, Err(ApiError::UploadRejected(_))));
}

#[tokio::test]
async fn test_import_from_missing_path_is_server_error() {
    let (_temp, state) = create_test_state();
    let result = state
        .import_api
        .import_from_path("/nonexistent/dir/production.xlsx".into(), "K5".to_string())
        .await;
    assert!(matches!(result, Err(ApiError::ImportError(_))));
}
