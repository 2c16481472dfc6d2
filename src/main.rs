use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use npendulum::ui;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let bind = std::env::var("NPENDULUM_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!("serving n-pendulum simulator on http://{bind}");

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .route("/api/simulate", web::post().to(ui::simulate_handler))
            .route("/api/randomize", web::get().to(ui::randomize_handler))
            .service(Files::new("/", "./static").index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}
