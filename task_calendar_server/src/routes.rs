use axum::Router;

/// The todo app keeps all of its state on the client, so there is nothing to
/// route: the router comes back exactly as it was passed in.
pub fn register_routes<S>(app: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    app
}
