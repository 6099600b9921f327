use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(vouch_otp_migration::Migrator).await;
}
