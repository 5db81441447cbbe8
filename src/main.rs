use clap::Parser;
use oath_ticket_monitor::config::cli::{load_file_config, CheckArgs};
use oath_ticket_monitor::utils::{logger, validation::Validate};
use oath_ticket_monitor::{
    ConsoleNotifier, KnownTicketStore, LocalStorage, MonitorConfig, MonitorError, Notifier,
    Result, RunSummary, SmtpNotifier, SmtpSettings, SocrataTicketSource, TicketMonitor,
};

#[tokio::main]
async fn main() {
    let args = CheckArgs::parse();

    logger::init_logger(args.json_logs, args.verbose);
    tracing::info!("Starting oath-ticket-monitor {}", env!("CARGO_PKG_VERSION"));

    match run_check(&args).await {
        Ok(summary) => {
            tracing::info!(
                "Check completed: {} fetched, {} new, {} skipped",
                summary.fetched,
                summary.new_tickets.len(),
                summary.rejected.len()
            );
            if summary.new_tickets.is_empty() {
                println!("No new tickets found.");
            } else {
                println!(
                    "{} new ticket(s): {}",
                    summary.new_tickets.len(),
                    summary.new_tickets.join(", ")
                );
            }
        }
        Err(e) => {
            tracing::error!(
                "Ticket check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run_check(args: &CheckArgs) -> Result<RunSummary> {
    let file_config = load_file_config(args.config.as_ref())?;
    let config = MonitorConfig::from_env(&file_config, &args.overrides())?;
    config.validate()?;
    tracing::debug!("Resolved config: {:?}", config);

    for address in &config.addresses {
        tracing::info!("Monitoring {}", address);
    }

    if args.dry_run {
        tracing::info!("DRY RUN: the notification is printed, nothing is sent or saved");
        execute(&config, ConsoleNotifier, true).await
    } else {
        let smtp = SmtpSettings::from_env(&file_config)?;
        smtp.validate()?;
        tracing::debug!("SMTP settings: {:?}", smtp);
        execute(&config, SmtpNotifier::new(&smtp)?, false).await
    }
}

async fn execute<N: Notifier>(
    config: &MonitorConfig,
    notifier: N,
    dry_run: bool,
) -> Result<RunSummary> {
    let source = SocrataTicketSource::new(&config.dataset_url, config.request_timeout())?
        .with_app_token(config.app_token.clone());

    let (storage, file_name) = LocalStorage::for_file(&config.store_path);
    if file_name.is_empty() {
        return Err(MonitorError::ConfigError {
            message: format!("{} is not a file path", config.store_path.display()),
        });
    }
    let store = KnownTicketStore::new(storage, file_name);

    TicketMonitor::new(source, notifier, store, config.addresses.clone())
        .with_corrupt_store_policy(config.on_corrupt)
        .with_dry_run(dry_run)
        .run()
        .await
}
