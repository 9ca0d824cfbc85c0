use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

/// Dispatches one request. `path` may carry a query string; it is ignored for matching.
pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", route) if route.starts_with("/api/templates/") => {
            payload_response(api::template_payload(route.trim_start_matches("/api/templates/")), "request")
        }
        ("POST", "/api/balance") => payload_response(api::balance_payload(body), "request body"),
        ("POST", "/api/score") => payload_response(api::score_payload(body), "request body"),
        (_, "/api/health" | "/api/balance" | "/api/score") => {
            error_response(405, "Method Not Allowed", "Method not allowed")
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn payload_response(result: Result<String, api::PayloadError>, what: &str) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(api::PayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid {what}: {err}"))
        }
        Err(api::PayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
