mod cli;
mod commands;
mod infra;
mod interactive;
mod routes;
mod server;

use gpai_assess::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
