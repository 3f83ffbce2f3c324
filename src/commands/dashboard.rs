use std::sync::Arc;

use crate::context::AppContext;
use crate::database::Store;
use crate::error::Result;
use crate::models::Dashboard;
use crate::services::dashboard_engine;

pub fn build_dashboard(store: &Arc<Store>, user: &str) -> Result<Dashboard> {
    dashboard_engine::build_dashboard(store, user)
}

/// Sync first, then render. A sync that fails outright is reported as an
/// error; per-message failures still yield a dashboard.
pub async fn refresh_dashboard(ctx: &AppContext, user: &str) -> Result<Dashboard> {
    crate::commands::sync::sync_user(ctx, user).await?;
    build_dashboard(&ctx.store, user)
}
