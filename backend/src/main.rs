// Main application entry point

#[macro_use]
extern crate rocket;

mod config;
mod db;
mod display_name;
mod error;
mod history;
mod models;
mod routes;
mod schema;
mod store;

use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket_db_pools::Database;

use config::AppConfig;
use db::ElectionsDB;

/// Configuration shared with the request handlers
pub struct AppState {
    /// Admin allow-list in configured order; the viewer's display-name
    /// matching depends on that order being stable.
    pub allowed_admins: Vec<String>,
    pub admin_password_hash: String,
}

#[rocket::launch]
fn rocket() -> _ {
    let app_config = AppConfig::load();

    let figment = rocket::config::Config::figment()
        .merge(("port", app_config.rocket_port))
        .merge((
            "databases.elections_db",
            rocket_db_pools::Config {
                url: app_config.database_url.clone(),
                min_connections: None,
                max_connections: 1024,
                connect_timeout: 3,
                idle_timeout: None,
                extensions: None,
            },
        ));

    let state = AppState {
        allowed_admins: app_config.allowed_admin_list(),
        admin_password_hash: app_config.admin_password_hash.clone(),
    };

    rocket::custom(figment)
        .manage(state)
        .attach(ElectionsDB::init())
        .attach(AdHoc::on_ignite("Database Migrations", db::run_migrations))
        .attach(AdHoc::on_ignite("Roster Seeding", db::run_seeding))
        .mount(
            "/api",
            routes![
                routes::admin::admin_login,
                routes::admin::admin_logout,
                routes::admin::admin_check,
                routes::admin::save_selections,
                routes::admin::current_selections,
                routes::admin::selection_history,
                routes::admin::selection_patterns,
                routes::admin::own_stats,
                routes::admin::delete_history_group,
                routes::admin::delete_all_selections,
                routes::viewer::get_candidates,
                routes::viewer::list_users,
                routes::viewer::user_selections,
                routes::viewer::user_history,
                routes::viewer::user_stats,
                routes::viewer::global_stats,
            ],
        )
        .mount("/", FileServer::from("/app/static"))
        .register("/", catchers![routes::not_found, routes::unauthorized])
}
