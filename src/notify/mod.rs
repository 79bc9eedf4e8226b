// ==========================================
// 作业日志追踪系统 - 推送层
// ==========================================
// 职责: 作业日志变更事件的发布与订阅
// ==========================================

pub mod events;
pub mod hub;

pub use events::{NoOpEventPublisher, WorkLogEvent, WorkLogEventPublisher};
pub use hub::{HubStatus, NotificationHub, ServerEvent, Subscription};
