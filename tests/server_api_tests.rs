use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use fairplay::server::routes::route_request;
use tower::ServiceExt;

fn roster_json(count: usize) -> String {
    let players: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "playerId": format!("p{i}"),
                "name": format!("Player {i}"),
                "defending": 1 + (i % 5),
                "goalscoring": 1 + ((i * 3) % 5),
                "staminaPace": 1 + ((i * 2) % 5),
                "control": 1 + ((i * 4) % 5),
            })
        })
        .collect();
    serde_json::to_string(&players).expect("fixture should serialize")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn unknown_route_is_not_found() {
    let response = route_request("GET", "/api/officers", "");
    assert_eq!(response.status_code, 404);
    assert!(response.body.contains("Route not found"));

    let response = route_request("GET", "/api/balance", "");
    assert_eq!(response.status_code, 405);
}

#[test]
fn template_endpoint_reports_configured_template_and_slots() {
    let response = route_request("GET", "/api/templates/9", "");
    assert_eq!(response.status_code, 200);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");

    assert_eq!(payload["team_size"], 9);
    assert_eq!(payload["configured"], true);
    assert_eq!(payload["template"]["defenders"], 3);
    assert_eq!(payload["template"]["midfielders"], 4);
    assert_eq!(payload["template"]["attackers"], 2);
    assert_eq!(payload["team_a_slots"]["first"], 1);
    assert_eq!(payload["team_b_slots"]["first"], 10);
    assert_eq!(payload["team_b_slots"]["last"], 18);

    let groups = payload["groups"].as_array().expect("groups should be an array");
    assert_eq!(groups[0]["position"], "defense");
    assert_eq!(groups[2]["team_b_base"], 17);
}

#[test]
fn template_endpoint_falls_back_for_unlisted_sizes() {
    let response = route_request("GET", "/api/templates/4", "");
    assert_eq!(response.status_code, 200);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["configured"], false);
    assert_eq!(payload["template"]["defenders"], 1);
    assert_eq!(payload["template"]["midfielders"], 2);
    assert_eq!(payload["template"]["attackers"], 1);
}

#[test]
fn template_endpoint_rejects_non_numeric_sizes() {
    let response = route_request("GET", "/api/templates/zero", "");
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["errors"][0]["field"], "team_size");
}

#[test]
fn balance_endpoint_returns_full_report() {
    let body = format!(
        r#"{{"roster":{},"teamSize":5,"seed":21,"max_attempts":300}}"#,
        roster_json(10)
    );
    let response = route_request("POST", "/api/balance", &body);
    assert_eq!(response.status_code, 200, "{}", response.body);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["seed"], 21);
    assert_eq!(payload["team_size"], 5);

    let assignments = payload["slot_assignments"]
        .as_array()
        .expect("slot_assignments should be an array");
    assert_eq!(assignments.len(), 10);
    let mut slots: Vec<u64> = assignments
        .iter()
        .map(|a| a["slot_number"].as_u64().expect("slot number"))
        .collect();
    slots.sort_unstable();
    assert_eq!(slots, (1..=10).collect::<Vec<u64>>());

    let score = payload["balance_score"].as_f64().expect("score");
    assert!(score >= 0.0);
    assert!(payload["attempts"].as_u64().expect("attempts") <= 300);
    assert!(payload["run_id"].as_str().is_some());
    assert_eq!(payload["teams"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["diagnostics"]["degraded"], false);
}

#[test]
fn balance_endpoint_is_reproducible_for_a_seed() {
    let body = format!(
        r#"{{"roster":{},"team_size":6,"seed":5,"max_attempts":200,"early_exit_threshold":0}}"#,
        roster_json(12)
    );
    let first: serde_json::Value =
        serde_json::from_str(&route_request("POST", "/api/balance", &body).body).expect("json");
    let second: serde_json::Value =
        serde_json::from_str(&route_request("POST", "/api/balance", &body).body).expect("json");
    assert_eq!(first["slot_assignments"], second["slot_assignments"]);
    assert_eq!(first["balance_score"], second["balance_score"]);
}

#[test]
fn balance_endpoint_collects_request_validation_errors() {
    let body = r#"{"roster":[{"id":"solo"}],"team_size":0,"max_attempts":0,"workers":500}"#;
    let response = route_request("POST", "/api/balance", body);
    assert_eq!(response.status_code, 400);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["message"], "Validation failed");
    let fields: Vec<&str> = payload["errors"]
        .as_array()
        .expect("errors should be an array")
        .iter()
        .filter_map(|issue| issue["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["team_size", "roster", "max_attempts", "workers"]);
}

#[test]
fn balance_endpoint_maps_engine_rejections_to_fields() {
    let body = format!(
        r#"{{"roster":{},"team_size":5,"template":{{"defenders":1,"midfielders":1,"attackers":1}}}}"#,
        roster_json(10)
    );
    let response = route_request("POST", "/api/balance", &body);
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["errors"][0]["field"], "template");

    let body = r#"{"roster":[{"id":"a"},{"id":"a"}],"team_size":1}"#;
    let response = route_request("POST", "/api/balance", body);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("more than once"));

    let body = r#"{"roster":[{"id":" "},{"id":"b"}],"team_size":1}"#;
    let response = route_request("POST", "/api/balance", body);
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["errors"][0]["field"], "roster");
    assert!(response.body.contains("empty id"));
}

#[test]
fn balance_endpoint_rejects_malformed_json() {
    let response = route_request("POST", "/api/balance", "{not json");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid request body"));
}

#[test]
fn score_endpoint_scores_a_manual_lineup() {
    let body = r#"{
        "roster": [
            {"id": "a", "defending": 5},
            {"id": "b", "defending": 1},
            {"id": "c"},
            {"id": "d"}
        ],
        "team_size": 2,
        "slot_assignments": [
            {"player_id": "a", "team": "A", "slot_number": 1, "position": "defense"},
            {"player_id": "c", "team": "A", "slot_number": 2, "position": "attack"},
            {"playerId": "b", "team": "B", "slotNumber": 3, "position": "defense"},
            {"playerId": "d", "team": "B", "slotNumber": 4, "position": "attack"}
        ],
        "weights": [{"position_group": "defense", "attribute": "defending", "weight": 1.0}]
    }"#;
    let response = route_request("POST", "/api/score", body);
    assert_eq!(response.status_code, 200, "{}", response.body);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    // Only defending differs (5 vs 1) across the three tracked defense attributes.
    let defense = payload["breakdown"]["defense"].as_f64().expect("defense component");
    assert!((defense - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(payload["breakdown"]["attack"].as_f64(), Some(0.0));
    assert_eq!(payload["balance_percent"].as_f64(), Some(0.0));
}

#[test]
fn score_endpoint_reads_positions_from_slots_when_absent() {
    let body = r#"{
        "roster": [
            {"id": "a", "defending": 5},
            {"id": "b", "defending": 1},
            {"id": "c"},
            {"id": "d"}
        ],
        "team_size": 2,
        "slot_assignments": [
            {"player_id": "a", "team": "A", "slot_number": 1},
            {"player_id": "c", "team": "A", "slot_number": 2},
            {"player_id": "b", "team": "B", "slot_number": 3},
            {"player_id": "d", "team": "B", "slot_number": 4}
        ],
        "weights": [{"position_group": "defense", "attribute": "defending", "weight": 1.0}]
    }"#;
    let response = route_request("POST", "/api/score", body);
    assert_eq!(response.status_code, 200, "{}", response.body);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    // Two-a-side falls back to one defender and one attacker: slots 1 and 3 defend.
    let defense = payload["breakdown"]["defense"].as_f64().expect("defense component");
    assert!((defense - 4.0 / 3.0).abs() < 1e-9, "{defense}");
    assert_eq!(payload["breakdown"]["attack"].as_f64(), Some(0.0));
}

#[test]
fn out_of_range_team_sizes_are_rejected_on_every_route() {
    for team_size in ["2147483648", "4294967297", "65"] {
        let body = format!(r#"{{"roster":{},"team_size":{team_size}}}"#, roster_json(10));
        let response = route_request("POST", "/api/balance", &body);
        assert_eq!(response.status_code, 400, "{}", response.body);
        let payload: serde_json::Value =
            serde_json::from_str(&response.body).expect("response should be valid json");
        assert_eq!(payload["errors"][0]["field"], "team_size");

        let body = format!(
            r#"{{"roster":[{{"id":"a"}},{{"id":"b"}}],"team_size":{team_size},
                "slot_assignments":[{{"player_id":"a","team":"A","slot_number":1}}]}}"#
        );
        let response = route_request("POST", "/api/score", &body);
        assert_eq!(response.status_code, 400, "{}", response.body);
        let payload: serde_json::Value =
            serde_json::from_str(&response.body).expect("response should be valid json");
        assert_eq!(payload["errors"][0]["field"], "team_size");

        let response = route_request("GET", &format!("/api/templates/{team_size}"), "");
        assert_eq!(response.status_code, 400, "{}", response.body);
    }
}

#[test]
fn score_endpoint_rejects_unknown_players_and_wrong_sides() {
    let unknown = r#"{
        "roster": [{"id": "a"}, {"id": "b"}],
        "team_size": 1,
        "slot_assignments": [{"player_id": "ghost", "team": "A", "slot_number": 1}]
    }"#;
    let response = route_request("POST", "/api/score", unknown);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("ghost"));

    let wrong_side = r#"{
        "roster": [{"id": "a"}, {"id": "b"}],
        "team_size": 1,
        "slot_assignments": [{"player_id": "a", "team": "B", "slot_number": 1}]
    }"#;
    let response = route_request("POST", "/api/score", wrong_side);
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["errors"][0]["field"], "slot_assignments");
}

#[tokio::test]
async fn axum_router_serves_the_same_routes() {
    let app = fairplay::server::router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/templates/7?verbose=1")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
    assert_eq!(payload["template"]["midfielders"], 3);
}
