// ==========================================
// 作业日志追踪系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、导入布局切换
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};
use crate::config::import_config_trait::ImportLayoutReader;
use crate::importer::layout::SheetLayout;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 配置项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================

/// 配置管理API
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有配置
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let configs = self
            .config_manager
            .list_global_configs()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(configs
            .into_iter()
            .map(|(key, value)| ConfigItem { key, value })
            .collect())
    }

    /// 当前生效的导入布局
    pub fn get_import_layout(&self) -> ApiResult<SheetLayout> {
        Ok(self.config_manager.get_sheet_layout()?)
    }

    /// 切换导入布局预设
    ///
    /// # 参数
    /// - version: 预设名 (v1 / v2)
    ///
    /// # 说明
    /// - 同时清除自定义布局, 使预设生效
    pub fn set_import_layout_version(&self, version: &str) -> ApiResult<SheetLayout> {
        let layout = SheetLayout::preset(version)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知的布局版本: {}", version)))?;

        self.config_manager
            .remove_global_config_value(config_keys::IMPORT_LAYOUT_CUSTOM)
            .and_then(|_| {
                self.config_manager
                    .set_global_config_value(config_keys::IMPORT_LAYOUT_VERSION, version)
            })
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        info!(version, "导入布局预设已切换");
        Ok(layout)
    }

    /// 保存自定义导入布局
    pub fn save_custom_import_layout(&self, layout: SheetLayout) -> ApiResult<SheetLayout> {
        layout
            .validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        self.config_manager
            .save_custom_layout(&layout)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        info!(version = %layout.version, "自定义导入布局已保存");
        Ok(layout)
    }
}
