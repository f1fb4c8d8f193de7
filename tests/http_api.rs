use std::pin::Pin;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use hrm_attendance::app::Core;
use hrm_attendance::config::Config;
use hrm_attendance::model::employee::{EmployeeRef, EmployeeStatus};
use hrm_attendance::model::role::Role;
use hrm_attendance::models::{Claims, TokenType};
use hrm_attendance::routes;
use hrm_attendance::store::MemoryStore;
use hrm_attendance::time::ManualTime;

const SECRET: &str = "integration-secret";

const ADMIN: (u64, Option<u64>) = (1, None);
const HR: (u64, Option<u64>) = (2, Some(20));
const WORKER: (u64, Option<u64>) = (7, Some(70));

fn config() -> Config {
    Config::from_lookup(|key| match key {
        "SERVER_ADDR" => Some("127.0.0.1:0".into()),
        "JWT_SECRET" => Some(SECRET.into()),
        "STORAGE_BACKEND" => Some("memory".into()),
        _ => None,
    })
    .unwrap()
}

fn token(user: (u64, Option<u64>), role: Role) -> String {
    let claims = Claims {
        user_id: user.0,
        sub: format!("user{}", user.0),
        role: role as u8,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        jti: uuid::Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id: user.1,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn at(date: (i32, u32, u32), hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

struct Harness {
    core: Core,
    time: Arc<ManualTime>,
}

fn harness(now: NaiveDateTime) -> Harness {
    let store = Arc::new(MemoryStore::new());
    for (id, user_id) in [(20, Some(2)), (70, Some(7)), (71, None)] {
        store.put_employee(EmployeeRef {
            id,
            user_id,
            status: EmployeeStatus::Active,
        });
    }
    store.put_employee(EmployeeRef {
        id: 99,
        user_id: None,
        status: EmployeeStatus::Terminated,
    });

    let time = Arc::new(ManualTime::new(now));
    let core = Core::build(store, time.clone());
    Harness { core, time }
}

macro_rules! init_app {
    ($harness:expr) => {{
        let config = config();
        let core = $harness.core.clone();
        test::init_service(
            App::new()
                .app_data(Data::new(config.clone()))
                .configure(|cfg| core.register(cfg))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

macro_rules! call_json {
    ($app:expr, $req:expr $(,)?) => {
        into_json(test::call_service(&$app, $req.to_request()).await).await
    };
}

fn anonymous(req: test::TestRequest, uri: &str) -> test::TestRequest {
    req.uri(uri).peer_addr("127.0.0.1:40000".parse().unwrap())
}

fn get(uri: &str, bearer: &str) -> test::TestRequest {
    anonymous(test::TestRequest::get(), uri)
        .insert_header(("Authorization", format!("Bearer {bearer}")))
}

fn post(uri: &str, bearer: &str) -> test::TestRequest {
    anonymous(test::TestRequest::post(), uri)
        .insert_header(("Authorization", format!("Bearer {bearer}")))
}

async fn into_json<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn next_frame<B: MessageBody>(body: &mut Pin<Box<B>>) -> String {
    match futures::future::poll_fn(|cx| body.as_mut().poll_next(cx)).await {
        Some(Ok(chunk)) => String::from_utf8(chunk.to_vec()).unwrap(),
        _ => panic!("live stream ended"),
    }
}

#[actix_web::test]
async fn full_day_shows_up_in_monthly_hours() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);
    let worker = token(WORKER, Role::Employee);

    let (status, body) = call_json!(app, post("/api/attendance/clock-in", &worker));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["employee_id"], 70);

    h.time.advance(Duration::hours(8));
    let (status, body) = call_json!(app, post("/api/attendance/clock-out", &worker));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["entry"]["worked_hours"]), Decimal::from(8));

    let hr = token(HR, Role::Hr);
    let uri = "/api/attendance/stats/monthly?month=1&year=2026";
    let (status, body) = call_json!(app, get(uri, &hr));
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["day"], 5);
    assert_eq!(days[0]["distinct_employee_count"], 1);
    assert_eq!(decimal(&days[0]["total_hours"]), Decimal::from(8));
}

#[actix_web::test]
async fn clock_errors_map_to_bad_request() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);
    let worker = token(WORKER, Role::Employee);

    let (status, body) = call_json!(app, post("/api/attendance/clock-out", &worker));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No active clock-in found for today");

    call_json!(app, post("/api/attendance/clock-in", &worker));
    let (status, body) = call_json!(app, post("/api/attendance/clock-in", &worker));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already clocked in today");
}

#[actix_web::test]
async fn rejects_missing_token_and_wrong_role() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);

    let req = anonymous(test::TestRequest::get(), "/api/attendance/stats/daily");
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let worker = token(WORKER, Role::Employee);
    let (status, _) = call_json!(app, get("/api/attendance/stats/daily", &worker));
    assert_eq!(status, StatusCode::FORBIDDEN);

    // admin has no employee profile to clock with
    let admin = token(ADMIN, Role::Admin);
    let (status, _) = call_json!(app, post("/api/attendance/clock-in", &admin));
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn daily_stats_count_only_active_employees() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);

    let worker = token(WORKER, Role::Employee);
    call_json!(app, post("/api/attendance/clock-in", &worker));

    let admin = token(ADMIN, Role::Admin);
    let (status, body) = call_json!(app, get("/api/attendance/stats/daily", &admin));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"total_active_employees": 3, "present_count": 1, "absent_count": 2})
    );
}

#[actix_web::test]
async fn own_entries_reject_mixed_filters() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);
    let worker = token(WORKER, Role::Employee);

    call_json!(app, post("/api/attendance/clock-in", &worker));

    let (status, body) = call_json!(app, get("/api/attendance", &worker));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let uri = "/api/attendance?start_date=2026-01-01&end_date=2026-01-04";
    let (status, body) = call_json!(app, get(uri, &worker));
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let uri = "/api/attendance?month=1&start_date=2026-01-01";
    let (status, _) = call_json!(app, get(uri, &worker));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_employee_lookups_are_not_found() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);
    let hr = token(HR, Role::Hr);

    let (status, body) = call_json!(app, get("/api/payroll/employee/404", &hr));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Employee 404 not found");

    let (status, _) = call_json!(app, get("/api/attendance/employee/404", &hr));
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a token pointing at an employee the directory no longer knows
    let orphan = token((8, Some(404)), Role::Employee);
    let (status, _) = call_json!(app, get("/api/attendance/summary", &orphan));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call_json!(app, get("/api/payroll/me", &orphan));
    assert_eq!(status, StatusCode::NOT_FOUND);

    // known employee with nothing recorded yet is an empty history
    let (status, body) = call_json!(app, get("/api/payroll/employee/70", &hr));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn payroll_disbursed_once_per_month() {
    let h = harness(at((2026, 2, 1), 10));
    let app = init_app!(h);
    let admin = token(ADMIN, Role::Admin);
    let payload = json!({
        "employee_id": 70,
        "month": 1,
        "year": 2026,
        "basic_salary": "50000",
        "allowances": "2000",
        "deductions": "500"
    });

    let (status, body) = call_json!(app, post("/api/payroll", &admin).set_json(&payload));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&body["record"]["net_salary"]), Decimal::from(51500));
    assert_eq!(body["record"]["disbursed_by"], 1);

    let (status, _) = call_json!(app, post("/api/payroll", &admin).set_json(&payload));
    assert_eq!(status, StatusCode::CONFLICT);

    let hr = token(HR, Role::Hr);
    let (status, body) = call_json!(app, get("/api/payroll?month=1&year=2026", &hr));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let worker = token(WORKER, Role::Employee);
    let (status, body) = call_json!(app, get("/api/payroll/me/2026/1", &worker));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], 1);

    let (status, _) = call_json!(app, get("/api/payroll/me/2026/2", &worker));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn payroll_rejects_bad_input() {
    let h = harness(at((2026, 2, 1), 10));
    let app = init_app!(h);
    let admin = token(ADMIN, Role::Admin);
    let pay = |employee_id: u64, month: u32, basic_salary: &str| {
        json!({
            "employee_id": employee_id,
            "month": month,
            "year": 2026,
            "basic_salary": basic_salary
        })
    };

    let (status, _) = call_json!(app, post("/api/payroll", &admin).set_json(pay(70, 13, "100")));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json!(app, post("/api/payroll", &admin).set_json(pay(70, 1, "0.005")));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json!(app, post("/api/payroll", &admin).set_json(pay(404, 1, "100")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let hr = token(HR, Role::Hr);
    let (status, _) = call_json!(app, post("/api/payroll", &hr).set_json(pay(70, 1, "100")));
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn live_connection_receives_own_clock_events() {
    let h = harness(at((2026, 1, 5), 9));
    let app = init_app!(h);
    let worker = token(WORKER, Role::Employee);

    let resp = test::call_service(&app, get("/api/live", &worker).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.core.presence.connections_for(7).len(), 1);

    let mut body = Box::pin(resp.into_body());
    let greeting = next_frame(&mut body).await;
    assert!(greeting.starts_with("data: "));
    assert!(greeting.contains("\"type\":\"connected\""));

    call_json!(app, post("/api/attendance/clock-in", &worker));
    let frame = next_frame(&mut body).await;
    assert!(frame.contains("\"type\":\"clockRecorded\""));
    assert!(frame.ends_with("\n\n"));

    drop(body);
    assert_eq!(h.core.presence.connection_count(), 0);
    assert_eq!(h.core.transport.open_count(), 0);
}
