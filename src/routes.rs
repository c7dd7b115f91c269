use crate::{
    api::{employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

impl Limiters {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            refresh: build_limiter(config.rate_refresh_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / u64::from(requests_per_min);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min} per minute"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limiters.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // access token required
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // literal segments before /{id}
                    .service(
                        web::resource("/managers").route(web::get().to(employee::list_managers)),
                    )
                    .service(web::resource("/me").route(web::get().to(employee::get_me)))
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/balance").route(web::get().to(leave_request::leave_balance)),
                    )
                    .service(web::resource("/team").route(web::get().to(leave_request::team_leaves)))
                    // /leaves/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::patch().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with Authorization: Bearer refresh_token
//       └─ returns a new pair, old refresh token revoked

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{TokenSubject, generate_access_token};
    use crate::config::tests::test_config;
    use crate::model::role::Role;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use sqlx::MySqlPool;
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    macro_rules! routed_app {
        () => {{
            let config = test_config();
            let limiters = Limiters::new(&config).unwrap();
            let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
            let routes = config.clone();
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(pool))
                    .app_data(web::Data::new(config))
                    .configure(move |cfg| configure(cfg, &routes, &limiters)),
            )
            .await
        }};
    }

    #[test]
    fn zero_rate_still_builds() {
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(1000).is_ok());
    }

    #[actix_web::test]
    async fn protected_scope_requires_a_token() {
        let app = routed_app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/leaves")
            .peer_addr(peer())
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn team_is_not_routed_as_an_id() {
        let app = routed_app!();
        let config = test_config();
        let token = generate_access_token(
            &TokenSubject {
                email: "ann@pal.tech".into(),
                role: Role::Employee,
                employee_id: Some("PT-1".into()),
            },
            &config.jwt_secret,
            60,
        )
        .unwrap();

        let req = actix_test::TestRequest::get()
            .uri("/api/leaves/team")
            .peer_addr(peer())
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
