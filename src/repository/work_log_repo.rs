// ==========================================
// 作业日志追踪系统 - 作业日志数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化; 排序列来自白名单
// 存储: 日期时间以 TEXT (yyyy-MM-dd HH:MM:SS) 存储
// ==========================================

use crate::domain::datetime_fmt::{format_storage, STORAGE_FORMAT};
use crate::domain::types::WorkStatus;
use crate::domain::work_log::{NewWorkLog, WorkLog, WorkLogFilter, WorkLogSort};
use crate::importer::worklog_importer_trait::WorkLogSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::debug;

const SELECT_COLUMNS: &str = "wl_id, wl_work_datetime, wl_car_model, wl_product_color, \
    wl_product_code, wl_product_name, wl_quantity, wl_completed_at, wl_completed_by, wl_created_at";

// ==========================================
// WorkLogRepository - 作业日志仓储
// ==========================================

/// 作业日志仓储
/// 职责: 管理 work_logs 表的 CRUD 操作 (删除为软删除)
pub struct WorkLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkLogRepository {
    /// 创建新的作业日志仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增作业日志
    ///
    /// # 返回
    /// - Ok(id): 新记录主键
    pub fn insert(&self, record: &NewWorkLog) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_storage(&Local::now().naive_local());

        conn.execute(
            r#"
            INSERT INTO work_logs (
                wl_work_datetime, wl_car_model, wl_product_color, wl_product_code,
                wl_product_name, wl_quantity, wl_created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                format_storage(&record.work_datetime),
                record.car_model,
                record.product_color,
                record.product_code,
                record.product_name,
                record.quantity,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, product_code = %record.product_code, "作业日志已写入");
        Ok(id)
    }

    /// 按主键查询 (不含已删除)
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<WorkLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_logs WHERE wl_id = ?1 AND wl_is_deleted = 0",
            SELECT_COLUMNS
        );
        let log = conn
            .query_row(&sql, params![id], map_row)
            .optional()?;
        Ok(log)
    }

    /// 条件查询
    ///
    /// # 参数
    /// - filter: 过滤条件
    /// - sort: 排序字段与方向
    /// - limit: None 表示不分页
    /// - offset: 偏移量
    pub fn find(
        &self,
        filter: &WorkLogFilter,
        sort: &WorkLogSort,
        limit: Option<u32>,
        offset: u32,
    ) -> RepositoryResult<Vec<WorkLog>> {
        let conn = self.get_conn()?;
        let (where_clause, mut values) = build_where_clause(filter);

        let mut sql = format!(
            "SELECT {} FROM work_logs WHERE {} ORDER BY {} {}, wl_id {}",
            SELECT_COLUMNS,
            where_clause,
            sort.field.column(),
            sort.direction.as_sql(),
            sort.direction.as_sql()
        );
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Box::new(limit));
            values.push(Box::new(offset));
        }

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params_from_iter(values.iter()), map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// 条件计数
    pub fn count(&self, filter: &WorkLogFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (where_clause, values) = build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM work_logs WHERE {}", where_clause);
        let count: i64 = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(count)
    }

    /// 更新业务字段
    ///
    /// # 返回
    /// - 受影响行数 (0 表示不存在或已删除)
    pub fn update(&self, log: &WorkLog) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = format_storage(&Local::now().naive_local());
        let affected = conn.execute(
            r#"
            UPDATE work_logs SET
                wl_work_datetime = ?1, wl_car_model = ?2, wl_product_color = ?3,
                wl_product_code = ?4, wl_product_name = ?5, wl_quantity = ?6,
                wl_updated_at = ?7
            WHERE wl_id = ?8 AND wl_is_deleted = 0
            "#,
            params![
                format_storage(&log.work_datetime),
                log.car_model,
                log.product_color,
                log.product_code,
                log.product_name,
                log.quantity,
                now,
                log.id,
            ],
        )?;
        Ok(affected)
    }

    /// 更新完成状态
    ///
    /// # 参数
    /// - completed_at: None 表示恢复为未完成
    /// - completed_by: 完成操作的客户端标识
    pub fn update_completion(
        &self,
        id: i64,
        completed_at: Option<NaiveDateTime>,
        completed_by: Option<&str>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = format_storage(&Local::now().naive_local());
        let affected = conn.execute(
            r#"
            UPDATE work_logs SET wl_completed_at = ?1, wl_completed_by = ?2, wl_updated_at = ?3
            WHERE wl_id = ?4 AND wl_is_deleted = 0
            "#,
            params![completed_at.as_ref().map(format_storage), completed_by, now, id],
        )?;
        Ok(affected)
    }

    /// 软删除
    pub fn soft_delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE work_logs SET wl_is_deleted = 1 WHERE wl_id = ?1 AND wl_is_deleted = 0",
            params![id],
        )?;
        Ok(affected)
    }

    /// 清空全部记录 (物理删除)
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM work_logs", [])?;
        Ok(affected)
    }
}

impl WorkLogSink for WorkLogRepository {
    fn create_record(&self, record: &NewWorkLog) -> Result<Option<i64>, Box<dyn Error + Send + Sync>> {
        self.insert(record).map(Some).map_err(Into::into)
    }
}

/// 构建 WHERE 子句与参数 (始终排除已删除记录)
fn build_where_clause(filter: &WorkLogFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = vec!["wl_is_deleted = 0".to_string()];
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(car_model) = filter.car_model.as_ref().filter(|v| !v.is_empty()) {
        conditions.push("wl_car_model = ?".to_string());
        values.push(Box::new(car_model.clone()));
    }
    if let Some(product_code) = filter.product_code.as_ref().filter(|v| !v.is_empty()) {
        conditions.push("wl_product_code = ?".to_string());
        values.push(Box::new(product_code.clone()));
    }
    match filter.status {
        Some(WorkStatus::Completed) => conditions.push("wl_completed_at IS NOT NULL".to_string()),
        Some(WorkStatus::Incomplete) => conditions.push("wl_completed_at IS NULL".to_string()),
        None => {}
    }
    if let Some(start) = filter.start {
        conditions.push("wl_work_datetime >= ?".to_string());
        values.push(Box::new(format_storage(&start)));
    }
    if let Some(end) = filter.end {
        conditions.push("wl_work_datetime <= ?".to_string());
        values.push(Box::new(format_storage(&end)));
    }

    (conditions.join(" AND "), values)
}

fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkLog> {
    let work_datetime: String = row.get(1)?;
    let completed_at: Option<String> = row.get(7)?;
    let created_at: String = row.get(9)?;

    Ok(WorkLog {
        id: row.get(0)?,
        work_datetime: parse_datetime(1, &work_datetime)?,
        car_model: row.get(2)?,
        product_color: row.get(3)?,
        product_code: row.get(4)?,
        product_name: row.get(5)?,
        quantity: row.get(6)?,
        completed_at: completed_at
            .as_deref()
            .map(|raw| parse_datetime(7, raw))
            .transpose()?,
        completed_by: row.get(8)?,
        created_at: parse_datetime(9, &created_at)?,
    })
}
