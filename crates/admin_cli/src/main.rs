use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use engine::{AccountNew, AccountType, Currency, Engine, StateFilter, TrialBalanceFilter};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "contable_admin")]
#[command(about = "Admin utilities for the ledger (schema, chart bootstrap, reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./contable.db?mode=rwc"
    )]
    database_url: String,

    /// Company the command acts on.
    #[arg(long, env = "CONTABLE_COMPANY_ID", default_value_t = 1)]
    company: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    Account(Account),
    /// Print the trial balance of a period as CSV.
    TrialBalance(TrialBalanceArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    description: String,
    #[arg(long = "type")]
    account_type: String,
    #[arg(long)]
    parent: Option<String>,
    #[arg(long, default_value = "BS")]
    currency: String,
    #[arg(long)]
    allows_auxiliary: bool,
    /// Marks a grouping account that cannot receive voucher lines.
    #[arg(long)]
    summary: bool,
}

#[derive(Args, Debug)]
struct TrialBalanceArgs {
    #[arg(long)]
    year: i32,
    #[arg(long)]
    period: i32,
    /// APROBADO, BORRADOR or TODOS.
    #[arg(long, default_value = "APROBADO")]
    state: String,
    #[arg(long)]
    max_level: Option<i32>,
    #[arg(long)]
    skip_zero: bool,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Migrate => {
            println!("database is up to date");
        }
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let currency = match Currency::try_from(args.currency.as_str()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let mut cmd = AccountNew::new(
                args.code,
                args.description,
                AccountType::from(args.account_type.as_str()),
            )
            .currency(currency)
            .allows_auxiliary(args.allows_auxiliary)
            .transactional(!args.summary);
            cmd.parent_code = args.parent;

            let engine = Engine::builder().database(db).build().await?;
            let account = engine.create_account(cli.company, cmd).await?;
            println!(
                "created account: {} {} (level {})",
                account.code, account.description, account.level
            );
        }
        Command::TrialBalance(args) => {
            let state = match StateFilter::try_from(args.state.as_str()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let mut filter = TrialBalanceFilter::new(args.year, args.period)
                .state(state)
                .include_zero(!args.skip_zero)
                .include_totals(true);
            filter.max_level = args.max_level;

            let engine = Engine::builder().database(db).build().await?;
            let balance = engine.trial_balance(cli.company, &filter).await?;
            let data = server::trial_balance_csv(&balance)?;
            std::io::stdout().write_all(&data)?;
        }
    }

    Ok(())
}
