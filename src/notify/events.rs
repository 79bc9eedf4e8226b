// ==========================================
// 作业日志追踪系统 - 作业日志事件发布
// ==========================================
// 职责: 定义作业日志事件发布 trait，实现依赖倒置
// 说明: API 层只依赖 trait，推送中心实现该 trait
// ==========================================

use crate::domain::work_log::{WorkLog, WorkLogView};
use serde_json::{json, Value};
use std::sync::Arc;

// ==========================================
// 作业日志事件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum WorkLogEvent {
    Created(WorkLog),
    Updated(WorkLog),
    Deleted { id: i64 },
    /// 全部清空
    Cleared { count: usize },
    Imported {
        import_id: String,
        car_model: String,
        total_processed: usize,
        error_count: usize,
    },
}

impl WorkLogEvent {
    pub const CREATED: &'static str = "worklog-created";
    pub const UPDATED: &'static str = "worklog-updated";
    pub const DELETED: &'static str = "worklog-deleted";
    pub const IMPORTED: &'static str = "worklog-imported";

    /// 推送事件名
    pub fn name(&self) -> &'static str {
        match self {
            WorkLogEvent::Created(_) => Self::CREATED,
            WorkLogEvent::Updated(_) => Self::UPDATED,
            WorkLogEvent::Deleted { .. } | WorkLogEvent::Cleared { .. } => Self::DELETED,
            WorkLogEvent::Imported { .. } => Self::IMPORTED,
        }
    }

    /// 推送内容
    pub fn payload(&self) -> Value {
        match self {
            WorkLogEvent::Created(log) | WorkLogEvent::Updated(log) => {
                serde_json::to_value(WorkLogView::from(log.clone())).unwrap_or(Value::Null)
            }
            WorkLogEvent::Deleted { id } => json!({ "id": id }),
            WorkLogEvent::Cleared { count } => json!({ "all": true, "count": count }),
            WorkLogEvent::Imported {
                import_id,
                car_model,
                total_processed,
                error_count,
            } => json!({
                "importId": import_id,
                "carModel": car_model,
                "totalProcessed": total_processed,
                "errorCount": error_count,
            }),
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 作业日志事件发布者 Trait
///
/// # 实现说明
/// - `NotificationHub` 实现此 trait, 将事件推送给所有订阅者
pub trait WorkLogEventPublisher: Send + Sync {
    /// 发布事件
    ///
    /// # 返回
    /// - 成功送达的订阅者数量
    fn publish(&self, event: WorkLogEvent) -> usize;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl WorkLogEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: WorkLogEvent) -> usize {
        tracing::debug!("NoOpEventPublisher: 跳过事件发布 - {}", event.name());
        0
    }
}

impl<T: WorkLogEventPublisher + ?Sized> WorkLogEventPublisher for Arc<T> {
    fn publish(&self, event: WorkLogEvent) -> usize {
        (**self).publish(event)
    }
}
