use clap::{Parser, Subcommand};
use loco_rs::prelude::*;

use crate::seeders::DatabaseSeeder;

#[derive(Parser)]
pub struct DatabaseCommand {
    #[command(subcommand)]
    pub command: DatabaseSubcommand,
}

#[derive(Subcommand)]
pub enum DatabaseSubcommand {
    /// Seed the database with development data
    Seed {
        /// Force seeding even if data already exists
        #[arg(long)]
        force: bool,
    },
    /// Clear all seeded data
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show database status and statistics
    Status,
}

impl DatabaseCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<()> {
        match &self.command {
            DatabaseSubcommand::Seed { force } => self.seed_database(ctx, *force).await,
            DatabaseSubcommand::Clear { yes } => self.clear_database(ctx, *yes).await,
            DatabaseSubcommand::Status => self.show_status(ctx).await,
        }
    }

    async fn seed_database(&self, ctx: &AppContext, force: bool) -> Result<()> {
        let db = &ctx.db;

        if !force && DatabaseSeeder::is_seeded(db).await? {
            println!("Database is already seeded. Use --force to reseed.");
            return Ok(());
        }

        if force && DatabaseSeeder::is_seeded(db).await? {
            println!("Clearing existing data before reseeding...");
            DatabaseSeeder::clear_all(db).await?;
        }

        println!("Seeding database with development data...");
        DatabaseSeeder::seed_development(db).await?;
        println!("Database seeding completed successfully!");

        Ok(())
    }

    async fn clear_database(&self, ctx: &AppContext, skip_confirmation: bool) -> Result<()> {
        if !skip_confirmation {
            print!("Are you sure you want to clear all database data? This cannot be undone. (y/N): ");
            use std::io::{self, Write};
            io::stdout().flush().ok();

            let mut input = String::new();
            io::stdin().read_line(&mut input).ok();

            if input.trim().to_lowercase() != "y" && input.trim().to_lowercase() != "yes" {
                println!("Operation cancelled.");
                return Ok(());
            }
        }

        let db = &ctx.db;
        println!("Clearing all database data...");
        DatabaseSeeder::clear_all(db).await?;
        println!("Database cleared successfully!");

        Ok(())
    }

    async fn show_status(&self, ctx: &AppContext) -> Result<()> {
        use crate::models::_entities::prelude::{Alerts, Attendance, Devices, Users, Vitals};
        use sea_orm::EntityTrait;

        let db = &ctx.db;

        println!("Database Status");
        println!("===============");

        let is_seeded = DatabaseSeeder::is_seeded(db).await?;
        println!("Seeded: {}", if is_seeded { "Yes" } else { "No" });

        println!("Total Users: {}", Users::find().count(db).await?);
        println!("Total Devices: {}", Devices::find().count(db).await?);
        println!("Total Vitals: {}", Vitals::find().count(db).await?);
        println!("Total Alerts: {}", Alerts::find().count(db).await?);
        println!("Total Attendance Rows: {}", Attendance::find().count(db).await?);

        Ok(())
    }
}
