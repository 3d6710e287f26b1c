//! App Router

use salvo::Router;

use crate::{healthcheck, observability, orders, vendors};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("orders")
                .get(orders::handlers::index::handler)
                .post(orders::handlers::create::handler)
                .push(Router::with_path("{order}").get(orders::handlers::get::handler)),
        )
        .push(
            Router::with_path("vendors")
                .push(
                    Router::with_path("{vendor}")
                        .get(vendors::handlers::get::handler)
                        .push(
                            Router::with_path("dishes").get(vendors::handlers::dishes::handler),
                        ),
                ),
        )
}
