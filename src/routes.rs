use crate::{
    api::{attendance, live, payroll},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Every route authenticates through the `AuthUser` extractor
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::my_entries)))
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    .service(
                        web::resource("/summary").route(web::get().to(attendance::my_summary)),
                    )
                    // /attendance/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(attendance::employee_entries)),
                    )
                    .service(
                        web::resource("/stats/daily").route(web::get().to(attendance::daily_stats)),
                    )
                    .service(
                        web::resource("/stats/monthly")
                            .route(web::get().to(attendance::monthly_stats)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::disburse))
                            .route(web::get().to(payroll::period_status)),
                    )
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(payroll::employee_history)),
                    )
                    .service(web::resource("/me").route(web::get().to(payroll::my_history)))
                    // /payroll/me/{year}/{month}
                    .service(
                        web::resource("/me/{year}/{month}")
                            .route(web::get().to(payroll::my_payslip)),
                    ),
            )
            .service(web::resource("/live").route(web::get().to(live::connect))),
    );
}

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = 60_000 / u64::from(burst);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            tracing::warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        });
    Governor::new(&cfg)
}
