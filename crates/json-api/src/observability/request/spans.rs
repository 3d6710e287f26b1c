//! Route names for request spans.

use uuid::Uuid;

/// Collapse identifiers in `path` so requests for different orders share one route name.
pub(super) fn route_for_path(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut route = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            route.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            route.push_str("{uuid}");
        } else {
            route.push_str(segment);
        }
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_uuid_segments() {
        let path = format!("/orders/{}", Uuid::nil());

        assert_eq!(route_for_path(&path), "/orders/{uuid}");
    }

    #[test]
    fn keeps_static_segments() {
        assert_eq!(route_for_path("/"), "/");
        assert_eq!(route_for_path("/orders"), "/orders");
        assert_eq!(route_for_path("/healthcheck"), "/healthcheck");
    }
}
