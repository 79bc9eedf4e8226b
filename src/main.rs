// ==========================================
// 作业日志追踪系统 - HTTP 服务主入口
// ==========================================

use anyhow::Context;
use worklog_tracker::app::{configure_routes, AppState};
use worklog_tracker::config::AppConfig;
use worklog_tracker::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    logging::init_with(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{}", worklog_tracker::APP_NAME);
    tracing::info!("系统版本: {}", worklog_tracker::VERSION);
    tracing::info!("==================================================");
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(config.db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;
    let hub = state.hub.clone();

    let app = configure_routes(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {}", config.bind_addr))?;
    tracing::info!("服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("无法监听退出信号: {}", e);
            }
            tracing::info!("收到退出信号, 关闭推送连接");
            hub.close_all();
        })
        .await
        .context("服务运行失败")?;

    tracing::info!("服务已停止");
    Ok(())
}
