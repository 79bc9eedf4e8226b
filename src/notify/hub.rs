// ==========================================
// 作业日志追踪系统 - 推送中心
// ==========================================
// 职责: 订阅者登记、事件广播、最近事件缓存
// 约定: 投递失败 (连接已关闭) 的订阅者在本次广播时移除, 不重试
//       新订阅者先收到 connect 事件, 再重放最近 N 条缓存事件
// ==========================================

use crate::notify::events::{WorkLogEvent, WorkLogEventPublisher};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 默认缓存事件数
pub const DEFAULT_CACHE_SIZE: usize = 10;

pub const CONNECT_EVENT: &str = "connect";

/// 推送事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerEvent {
    pub name: String,
    pub data: Value,
}

/// 订阅句柄
pub struct Subscription {
    pub id: u64,
    pub receiver: mpsc::UnboundedReceiver<ServerEvent>,
}

/// 推送中心状态
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStatus {
    pub active_connections: usize,
    pub cached_events: usize,
}

pub struct NotificationHub {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<ServerEvent>>>,
    event_cache: Mutex<VecDeque<ServerEvent>>,
    cache_size: usize,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl NotificationHub {
    pub fn new(cache_size: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
            event_cache: Mutex::new(VecDeque::with_capacity(cache_size)),
            cache_size,
        }
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<ServerEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cache(&self) -> MutexGuard<'_, VecDeque<ServerEvent>> {
        self.event_cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 新增订阅
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::unbounded_channel();

        let connect = ServerEvent {
            name: CONNECT_EVENT.to_string(),
            data: json!({ "clientId": id }),
        };
        // 接收端尚在本函数内, 不会失败
        let _ = sender.send(connect);

        // 加锁顺序: 缓存 -> 订阅者 (与 broadcast 一致), 重放与登记之间不会漏掉事件
        let cache = self.cache();
        for event in cache.iter() {
            let _ = sender.send(event.clone());
        }
        let mut subscribers = self.subscribers();
        subscribers.insert(id, sender);
        drop(cache);
        info!(client_id = id, active = subscribers.len(), "新订阅者已连接");

        Subscription { id, receiver }
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: u64) -> bool {
        let removed = self.subscribers().remove(&id).is_some();
        if removed {
            debug!(client_id = id, "订阅者已移除");
        }
        removed
    }

    /// 广播事件
    ///
    /// # 返回
    /// - 成功送达的订阅者数量
    pub fn broadcast(&self, name: &str, data: Value) -> usize {
        let event = ServerEvent {
            name: name.to_string(),
            data,
        };

        let mut cache = self.cache();
        cache.push_back(event.clone());
        while cache.len() > self.cache_size {
            cache.pop_front();
        }

        let mut subscribers = self.subscribers();
        drop(cache);
        subscribers.retain(|id, sender| match sender.send(event.clone()) {
            Ok(()) => true,
            Err(_) => {
                warn!(client_id = *id, event = name, "事件投递失败, 移除订阅者");
                false
            }
        });

        debug!(event = name, delivered = subscribers.len(), "事件已广播");
        subscribers.len()
    }

    /// 关闭全部订阅 (订阅流随之结束)
    pub fn close_all(&self) -> usize {
        let mut subscribers = self.subscribers();
        let count = subscribers.len();
        subscribers.clear();
        info!(count, "已关闭全部订阅");
        count
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    pub fn status(&self) -> HubStatus {
        HubStatus {
            active_connections: self.subscriber_count(),
            cached_events: self.cache().len(),
        }
    }
}

impl WorkLogEventPublisher for NotificationHub {
    fn publish(&self, event: WorkLogEvent) -> usize {
        self.broadcast(event.name(), event.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_receives_connect_then_events() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe();

        let connect = sub.receiver.recv().await.unwrap();
        assert_eq!(connect.name, CONNECT_EVENT);
        assert_eq!(connect.data["clientId"], sub.id);

        assert_eq!(hub.broadcast("worklog-created", json!({"id": 1})), 1);
        let event = sub.receiver.recv().await.unwrap();
        assert_eq!(event.name, "worklog-created");
        assert_eq!(event.data["id"], 1);
    }

    #[tokio::test]
    async fn test_replays_cached_events() {
        let hub = NotificationHub::new(2);
        hub.broadcast("a", json!(1));
        hub.broadcast("b", json!(2));
        hub.broadcast("c", json!(3));

        let mut sub = hub.subscribe();
        let names: Vec<String> = [
            sub.receiver.recv().await.unwrap(),
            sub.receiver.recv().await.unwrap(),
            sub.receiver.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|e| e.name)
        .collect();
        assert_eq!(names, vec!["connect", "b", "c"]);
        assert_eq!(hub.status().cached_events, 2);
    }

    #[test]
    fn test_closed_subscriber_removed_on_publish() {
        let hub = NotificationHub::default();
        let kept = hub.subscribe();
        let dropped = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(dropped);
        assert_eq!(hub.broadcast("worklog-deleted", json!({"id": 9})), 1);
        assert_eq!(hub.subscriber_count(), 1);
        assert!(hub.unsubscribe(kept.id));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_close_all_ends_streams() {
        let hub = NotificationHub::default();
        let mut sub = hub.subscribe();
        let _ = sub.receiver.recv().await;

        assert_eq!(hub.close_all(), 1);
        assert!(sub.receiver.recv().await.is_none());
    }

    #[test]
    fn test_subscribe_during_broadcast_has_no_gap() {
        const EVENTS: u64 = 2_000;

        for _ in 0..20 {
            let hub = NotificationHub::new(4);
            let mut sub = std::thread::scope(|scope| {
                scope.spawn(|| {
                    for seq in 0..EVENTS {
                        hub.broadcast("seq", json!(seq));
                    }
                });
                std::thread::yield_now();
                hub.subscribe()
            });

            assert_eq!(sub.receiver.try_recv().unwrap().name, CONNECT_EVENT);
            let mut received = Vec::new();
            while let Ok(event) = sub.receiver.try_recv() {
                received.push(event.data.as_u64().unwrap());
            }

            // 重放 + 实时事件必须是连续序列, 直到最后一条
            assert_eq!(received.last(), Some(&(EVENTS - 1)));
            for pair in received.windows(2) {
                assert_eq!(pair[1], pair[0] + 1, "序列出现缺口: {:?}", pair);
            }
        }
    }

    #[test]
    fn test_publisher_trait() {
        let hub = NotificationHub::default();
        let _sub = hub.subscribe();
        assert_eq!(hub.publish(WorkLogEvent::Deleted { id: 1 }), 1);
    }
}
