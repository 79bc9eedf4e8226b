use crate::app::state::AppState;
use crate::notify::hub::{HubStatus, NotificationHub, ServerEvent, Subscription};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;

// ==========================================
// 实时推送接口 (SSE)
// ==========================================

/// 订阅守卫: 流被丢弃 (客户端断开) 时从推送中心移除订阅者
struct SubscriptionGuard {
    hub: Arc<NotificationHub>,
    subscription: Subscription,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.subscription.id);
    }
}

fn to_sse_event(event: ServerEvent) -> Event {
    Event::default().event(event.name).data(event.data.to_string())
}

/// GET /api/sse/subscribe
pub async fn sse_subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = SubscriptionGuard {
        subscription: state.hub.subscribe(),
        hub: state.hub.clone(),
    };
    tracing::debug!(client_id = guard.subscription.id, "SSE 连接已建立");

    let stream = stream::unfold(guard, |mut guard| async move {
        let event = guard.subscription.receiver.recv().await?;
        Some((Ok::<_, Infallible>(to_sse_event(event)), guard))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/sse/status
pub async fn sse_status(State(state): State<AppState>) -> Json<HubStatus> {
    Json(state.hub.status())
}
