use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/nodes", node_routes())
        .nest("/drawings", drawing_routes())
        .nest("/files", file_routes())
}

fn node_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::node::list_nodes,
            handlers::node::create_node
        ))
        .routes(routes!(
            handlers::node::get_node,
            handlers::node::delete_node
        ))
        .routes(routes!(handlers::drawing::extract_drawings))
}

fn drawing_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::drawing::reconcile_drawings))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::file::issue_signed_url))
        // Undocumented: only reachable through links from `issue_signed_url`.
        .route("/download/{*key}", get(handlers::file::download_object))
}
