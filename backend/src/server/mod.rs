//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use zeroize::Zeroizing;

use recipe_backend::Trace;
use recipe_backend::composition::{Repositories, Services, build_services};
#[cfg(debug_assertions)]
use recipe_backend::doc::ApiDoc;
use recipe_backend::domain::{AccountCreationError, AccountManager};
use recipe_backend::inbound::http;
use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::settings::SuperuserSeed;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(http::configure)
        .configure(http::health::configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Wire services for `config`, choosing Diesel or in-memory storage.
pub fn build_server_services(config: &ServerConfig) -> Services {
    let repositories = match &config.db_pool {
        Some(pool) => Repositories::diesel(pool),
        None => Repositories::in_memory(),
    };
    build_services(repositories, config.policy, config.hashing.clone())
}

/// Create the configured administrator, or elevate the account if the email
/// is already registered.
pub async fn ensure_superuser(manager: &AccountManager, seed: &SuperuserSeed) -> Result<()> {
    let password = Zeroizing::new(seed.password.clone());
    match manager
        .create_superuser(Some(seed.email.as_str()), password.as_str())
        .await
    {
        Ok(account) => {
            info!(account_id = %account.id, "superuser created");
            Ok(())
        }
        Err(AccountCreationError::DuplicateEmail { .. }) => {
            let account = manager
                .grant_superuser(seed.email.as_str())
                .await
                .wrap_err("failed to elevate existing superuser account")?;
            info!(account_id = %account.id, "superuser already present");
            Ok(())
        }
        Err(err) => Err(err).wrap_err("failed to create superuser"),
    }
}

/// Construct an Actix HTTP server over `http_state`.
///
/// Readiness is flagged once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Startup superuser seeding over in-memory storage.

    use std::sync::Arc;

    use recipe_backend::domain::ports::AccountRepository;
    use recipe_backend::domain::{AccountExtras, Email, PasswordHashing};

    use super::*;

    fn seed() -> SuperuserSeed {
        SuperuserSeed {
            email: "admin@example.com".to_owned(),
            password: "password1234".to_owned(),
        }
    }

    fn manager(repositories: &Repositories) -> AccountManager {
        let hashing = PasswordHashing::new(8, 1, 1).expect("cheap argon2 params are valid");
        AccountManager::new(Arc::clone(&repositories.accounts), hashing)
    }

    #[tokio::test]
    async fn seeding_elevates_a_previously_registered_regular_account() {
        let repositories = Repositories::in_memory();
        let manager = manager(&repositories);
        manager
            .create_user(
                Some("admin@example.com"),
                Some("chosen-by-user"),
                AccountExtras::default(),
            )
            .await
            .expect("regular account is created");

        ensure_superuser(&manager, &seed())
            .await
            .expect("seeding succeeds");

        let email = Email::normalize("admin@example.com").expect("valid email");
        let account = repositories
            .accounts
            .find_by_email(&email)
            .await
            .expect("lookup succeeds")
            .expect("account present");
        assert!(account.is_staff);
        assert!(account.is_superuser);
        assert!(account.check_password("chosen-by-user"));
    }

    #[tokio::test]
    async fn seeding_twice_keeps_a_single_superuser() {
        let repositories = Repositories::in_memory();
        let manager = manager(&repositories);

        ensure_superuser(&manager, &seed())
            .await
            .expect("first seeding succeeds");
        ensure_superuser(&manager, &seed())
            .await
            .expect("second seeding succeeds");

        let email = Email::normalize("admin@example.com").expect("valid email");
        let account = repositories
            .accounts
            .find_by_email(&email)
            .await
            .expect("lookup succeeds")
            .expect("account present");
        assert!(account.is_superuser);
    }
}
