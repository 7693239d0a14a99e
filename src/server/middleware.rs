//! Auth gate
//!
//! Runs before every route. It resolves the caller's identity with the
//! host's [`AuthProvider`](crate::core::auth::AuthProvider) and attaches it
//! to the request. It never rejects: a missing or bad credential just yields
//! an anonymous context.

use super::host::ServerHost;
use crate::core::auth::AuthContext;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

pub async fn auth_gate(
    State(host): State<Arc<ServerHost>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match host.auth.extract_context(req.headers()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::debug!(reason = %e, "credential rejected, continuing anonymously");
            AuthContext::Anonymous
        }
    };

    if let AuthContext::User { user_id, .. } = &ctx {
        tracing::debug!(user_id = %user_id, "request authenticated");
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
