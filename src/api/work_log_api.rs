// ==========================================
// 作业日志追踪系统 - 作业日志 API
// ==========================================
// 职责: 作业日志增删改查、条件查询、完成状态变更
// 约定: 每个写操作成功后发布一次推送事件
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::datetime_fmt::{day_range, parse_flexible};
use crate::domain::types::WorkStatus;
use crate::domain::work_log::{
    CreateWorkLogRequest, NewWorkLog, UpdateWorkLogRequest, WorkLog, WorkLogFilter, WorkLogPage,
    WorkLogQuery, WorkLogSort, WorkLogView,
};
use crate::notify::events::{WorkLogEvent, WorkLogEventPublisher};
use crate::repository::work_log_repo::WorkLogRepository;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_QUANTITY: i32 = 1;

// ==========================================
// WorkLogApi - 作业日志 API
// ==========================================

/// 作业日志API
pub struct WorkLogApi {
    repo: Arc<WorkLogRepository>,
    publisher: Arc<dyn WorkLogEventPublisher>,
}

impl WorkLogApi {
    /// 创建新的WorkLogApi实例
    ///
    /// # 参数
    /// - repo: 作业日志仓储
    /// - publisher: 事件发布者 (推送中心)
    pub fn new(repo: Arc<WorkLogRepository>, publisher: Arc<dyn WorkLogEventPublisher>) -> Self {
        Self { repo, publisher }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 新建作业日志
    ///
    /// # 参数
    /// - request: 作业时间为字符串 (ISO / 显示格式); 无法解析时使用当前时间
    ///
    /// # 返回
    /// - Ok(WorkLog): 新建后的记录
    /// - Err(ApiError::InvalidInput): 数量为负
    pub fn create_work_log(&self, request: CreateWorkLogRequest) -> ApiResult<WorkLog> {
        let quantity = request.quantity.unwrap_or(DEFAULT_QUANTITY);
        if quantity < 0 {
            return Err(ApiError::InvalidInput(format!("数量不能为负: {}", quantity)));
        }

        let work_datetime = match request.work_datetime.as_deref() {
            Some(raw) => parse_flexible(raw).unwrap_or_else(|| {
                warn!(raw, "作业时间无法解析, 使用当前时间");
                now()
            }),
            None => now(),
        };

        let record = NewWorkLog {
            work_datetime,
            car_model: request.car_model,
            product_color: request.product_color,
            product_code: request.product_code,
            product_name: request.product_name,
            quantity,
        };

        let id = self.repo.insert(&record)?;
        let created = self.require(id)?;
        info!(id, product_code = %created.product_code, "作业日志已创建");

        self.publisher.publish(WorkLogEvent::Created(created.clone()));
        Ok(created)
    }

    /// 更新作业日志
    ///
    /// # 参数
    /// - request: None 字段保持原值; 作业时间无法解析时保持原值
    pub fn update_work_log(&self, id: i64, request: UpdateWorkLogRequest) -> ApiResult<WorkLog> {
        let mut log = self.require(id)?;

        if let Some(raw) = request.work_datetime.as_deref() {
            match parse_flexible(raw) {
                Some(dt) => log.work_datetime = dt,
                None => warn!(id, raw, "作业时间无法解析, 保持原值"),
            }
        }
        if let Some(quantity) = request.quantity {
            if quantity < 0 {
                return Err(ApiError::InvalidInput(format!("数量不能为负: {}", quantity)));
            }
            log.quantity = quantity;
        }
        if let Some(car_model) = request.car_model {
            log.car_model = car_model;
        }
        if let Some(product_color) = request.product_color {
            log.product_color = product_color;
        }
        if let Some(product_code) = request.product_code {
            log.product_code = product_code;
        }
        if let Some(product_name) = request.product_name {
            log.product_name = product_name;
        }

        if self.repo.update(&log)? == 0 {
            return Err(not_found(id));
        }
        let updated = self.require(id)?;
        info!(id, "作业日志已更新");

        self.publisher.publish(WorkLogEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 更新完成状态
    ///
    /// # 参数
    /// - completed: true 记录完成时间; false 清除完成时间与完成者
    /// - completed_by: 完成操作的客户端标识
    pub fn update_completion_status(
        &self,
        id: i64,
        completed: bool,
        completed_by: Option<&str>,
    ) -> ApiResult<WorkLog> {
        let affected = if completed {
            self.repo.update_completion(id, Some(now()), completed_by)?
        } else {
            self.repo.update_completion(id, None, None)?
        };
        if affected == 0 {
            return Err(not_found(id));
        }

        let updated = self.require(id)?;
        info!(id, completed, completed_by = ?completed_by, "完成状态已更新");

        self.publisher.publish(WorkLogEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// 删除作业日志 (软删除)
    pub fn delete_work_log(&self, id: i64) -> ApiResult<()> {
        if self.repo.soft_delete(id)? == 0 {
            return Err(not_found(id));
        }
        info!(id, "作业日志已删除");

        self.publisher.publish(WorkLogEvent::Deleted { id });
        Ok(())
    }

    /// 清空全部作业日志
    ///
    /// # 返回
    /// - 删除的记录数
    pub fn delete_all(&self) -> ApiResult<usize> {
        let count = self.repo.delete_all()?;
        warn!(count, "已清空全部作业日志");

        self.publisher.publish(WorkLogEvent::Cleared { count });
        Ok(count)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按ID查询
    pub fn get_work_log(&self, id: i64) -> ApiResult<WorkLogView> {
        self.require(id).map(WorkLogView::from)
    }

    /// 分页条件查询
    ///
    /// # 参数
    /// - query: page 为 1 基页码 (0 视为 1); size 为 0 时取默认值, 超过上限时截断
    pub fn list_work_logs(&self, query: WorkLogQuery) -> ApiResult<WorkLogPage> {
        let page = query.page.max(1);
        let size = match query.size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let offset = (page - 1).saturating_mul(size);

        let total = self.repo.count(&query.filter)?;
        let logs = self.repo.find(&query.filter, &query.sort, Some(size), offset)?;

        Ok(WorkLogPage::new(logs, total, page, size))
    }

    /// 按日期查询 (当日 00:00:00 ~ 23:59:59)
    pub fn list_by_exact_date(
        &self,
        date: NaiveDate,
        status: Option<WorkStatus>,
        sort: WorkLogSort,
    ) -> ApiResult<Vec<WorkLogView>> {
        let (start, end) = day_range(date);
        let filter = WorkLogFilter {
            status,
            start: Some(start),
            end: Some(end),
            ..WorkLogFilter::default()
        };
        self.list_all(&filter, &sort)
    }

    /// 按时间区间查询 (闭区间)
    pub fn list_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        sort: WorkLogSort,
    ) -> ApiResult<Vec<WorkLogView>> {
        if start > end {
            return Err(ApiError::InvalidInput(format!(
                "开始时间晚于结束时间: {} > {}",
                start, end
            )));
        }
        let filter = WorkLogFilter {
            start: Some(start),
            end: Some(end),
            ..WorkLogFilter::default()
        };
        self.list_all(&filter, &sort)
    }

    /// 按车型查询
    pub fn list_by_car_model(&self, car_model: &str, sort: WorkLogSort) -> ApiResult<Vec<WorkLogView>> {
        let filter = WorkLogFilter {
            car_model: Some(car_model.to_string()),
            ..WorkLogFilter::default()
        };
        self.list_all(&filter, &sort)
    }

    /// 按产品代码查询
    pub fn list_by_product_code(
        &self,
        product_code: &str,
        sort: WorkLogSort,
    ) -> ApiResult<Vec<WorkLogView>> {
        let filter = WorkLogFilter {
            product_code: Some(product_code.to_string()),
            ..WorkLogFilter::default()
        };
        self.list_all(&filter, &sort)
    }

    /// 按完成状态查询
    ///
    /// # 参数
    /// - status: "completed" / "incomplete" (大小写不敏感)
    pub fn list_by_status(&self, status: &str, sort: WorkLogSort) -> ApiResult<Vec<WorkLogView>> {
        let status = WorkStatus::from_str(status)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知的作业状态: {}", status)))?;
        let filter = WorkLogFilter {
            status: Some(status),
            ..WorkLogFilter::default()
        };
        self.list_all(&filter, &sort)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn list_all(&self, filter: &WorkLogFilter, sort: &WorkLogSort) -> ApiResult<Vec<WorkLogView>> {
        let logs = self.repo.find(filter, sort, None, 0)?;
        Ok(logs.into_iter().map(WorkLogView::from).collect())
    }

    fn require(&self, id: i64) -> ApiResult<WorkLog> {
        self.repo.find_by_id(id)?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("作业日志(id={})不存在", id))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{SortDirection, SortField};
    use crate::notify::hub::NotificationHub;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn api_with_hub() -> (WorkLogApi, Arc<NotificationHub>) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let repo = Arc::new(WorkLogRepository::from_connection(Arc::new(Mutex::new(conn))));
        let hub = Arc::new(NotificationHub::default());
        (WorkLogApi::new(repo, hub.clone()), hub)
    }

    fn request(code: &str, when: &str, quantity: Option<i32>) -> CreateWorkLogRequest {
        CreateWorkLogRequest {
            work_datetime: Some(when.to_string()),
            car_model: "SONATA".to_string(),
            product_color: "RED".to_string(),
            product_code: code.to_string(),
            product_name: format!("{} 부품", code),
            quantity,
        }
    }

    #[test]
    fn test_create_defaults() {
        let (api, _) = api_with_hub();

        let log = api.create_work_log(request("A1", "24.03.15 09:30", None)).unwrap();
        assert_eq!(log.quantity, 1);
        assert_eq!(log.work_datetime.to_string(), "2024-03-15 09:30:00");

        let before = Local::now().naive_local() - chrono::Duration::seconds(5);
        let log = api.create_work_log(request("A1", "not a date", Some(2))).unwrap();
        assert!(log.work_datetime >= before);

        assert!(matches!(
            api.create_work_log(request("A1", "2024-03-15T09:30:00", Some(-1))),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_update_keeps_datetime_on_parse_failure() {
        let (api, _) = api_with_hub();
        let log = api.create_work_log(request("A1", "2024-03-15T09:30:00", Some(2))).unwrap();

        let updated = api
            .update_work_log(
                log.id,
                UpdateWorkLogRequest {
                    work_datetime: Some("garbage".to_string()),
                    quantity: Some(5),
                    ..UpdateWorkLogRequest::default()
                },
            )
            .unwrap();
        assert_eq!(updated.work_datetime, log.work_datetime);
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.product_code, "A1");

        assert!(matches!(
            api.update_work_log(999, UpdateWorkLogRequest::default()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_completion_roundtrip() {
        let (api, _) = api_with_hub();
        let log = api.create_work_log(request("A1", "2024-03-15T09:30:00", None)).unwrap();

        let done = api.update_completion_status(log.id, true, Some("tablet-3")).unwrap();
        assert!(done.is_completed());
        assert_eq!(done.completed_by.as_deref(), Some("tablet-3"));

        let undone = api.update_completion_status(log.id, false, None).unwrap();
        assert!(!undone.is_completed());
        assert!(undone.completed_by.is_none());
    }

    #[test]
    fn test_paging_clamps() {
        let (api, _) = api_with_hub();
        for hour in 0..12 {
            api.create_work_log(request("A1", &format!("2024-03-15T{:02}:00:00", hour), None))
                .unwrap();
        }

        let page = api.list_work_logs(WorkLogQuery::default()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.work_logs.len(), 10);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 2);

        let page = api
            .list_work_logs(WorkLogQuery {
                page: 2,
                size: 500,
                ..WorkLogQuery::default()
            })
            .unwrap();
        assert_eq!(page.size, MAX_PAGE_SIZE);
        assert!(page.work_logs.is_empty());
    }

    #[test]
    fn test_list_variants() {
        let (api, _) = api_with_hub();
        let a = api.create_work_log(request("A1", "2024-03-15T09:00:00", None)).unwrap();
        api.create_work_log(request("B2", "2024-03-15T23:59:59", None)).unwrap();
        api.create_work_log(request("A1", "2024-03-16T00:00:00", None)).unwrap();
        api.update_completion_status(a.id, true, None).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let sort = WorkLogSort {
            field: SortField::WorkDatetime,
            direction: SortDirection::Desc,
        };
        let logs = api.list_by_exact_date(day, None, sort).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].work_log.product_code, "B2");

        let done = api
            .list_by_exact_date(day, Some(WorkStatus::Completed), sort)
            .unwrap();
        assert_eq!(done.len(), 1);

        assert_eq!(api.list_by_product_code("A1", sort).unwrap().len(), 2);
        assert_eq!(api.list_by_car_model("SONATA", sort).unwrap().len(), 3);
        assert_eq!(api.list_by_status("INCOMPLETE", sort).unwrap().len(), 2);
        assert!(matches!(
            api.list_by_status("pending", sort),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let (api, hub) = api_with_hub();
        let mut sub = hub.subscribe();
        assert_eq!(sub.receiver.recv().await.unwrap().name, "connect");

        let log = api.create_work_log(request("A1", "2024-03-15T09:00:00", None)).unwrap();
        api.update_completion_status(log.id, true, None).unwrap();
        api.delete_work_log(log.id).unwrap();
        api.delete_all().unwrap();

        let mut names = Vec::new();
        for _ in 0..4 {
            names.push(sub.receiver.recv().await.unwrap().name);
        }
        assert_eq!(
            names,
            vec!["worklog-created", "worklog-updated", "worklog-deleted", "worklog-deleted"]
        );
        assert!(matches!(api.get_work_log(log.id), Err(ApiError::NotFound(_))));
    }
}
