use std::sync::Arc;
use subwatch::config::Config;
use subwatch::scheduler::Scheduler;
use subwatch::store::Db;
use subwatch::{catchers, routes};

#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let db = Arc::new(Db::new(&config.database_path).expect("failed to initialize database"));
    let scheduler = Arc::new(Scheduler::new(db.clone(), config.clone(), config.seed_subdomains.clone()));

    let scheduler_for_liftoff = scheduler.clone();

    rocket::build()
        .manage(db)
        .manage(config)
        .manage(scheduler)
        .mount("/api", routes![
            routes::geo_report,
            routes::subdomains,
            routes::non_up_subdomains,
            routes::inactive_subdomains,
            routes::other_dns,
            routes::check_history,
            routes::agent_status,
            routes::health,
            routes::scheduler_start,
            routes::scheduler_stop,
            routes::checks_run,
        ])
        .register("/", catchers![
            catchers::bad_request,
            catchers::forbidden,
            catchers::not_found,
            catchers::unprocessable_entity,
            catchers::internal_error,
        ])
        .attach(rocket::fairing::AdHoc::on_liftoff("Scheduler", move |rocket| {
            Box::pin(async move {
                let shutdown = rocket.shutdown();
                scheduler_for_liftoff.spawn_loops(shutdown);
                tracing::info!("scheduler loops started");
            })
        }))
}
