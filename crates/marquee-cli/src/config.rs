use clap::{Parser, Subcommand};

use crate::commands::{
    create::CreateCmd, delete::DeleteCmd, healthcheck::HealthcheckCmd, list::ListCmd,
    show::ShowCmd, update::UpdateCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for marquee - create, inspect, edit and search movie records in the catalog database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Healthcheck(HealthcheckCmd),
    Create(CreateCmd),
    Show(ShowCmd),
    Update(UpdateCmd),
    Delete(DeleteCmd),
    List(ListCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Healthcheck(cmd) => cmd.run().await,
            Command::Create(cmd) => cmd.run().await,
            Command::Show(cmd) => cmd.run().await,
            Command::Update(cmd) => cmd.run().await,
            Command::Delete(cmd) => cmd.run().await,
            Command::List(cmd) => cmd.run().await,
        }
    }
}
