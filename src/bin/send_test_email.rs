use anyhow::Context;
use clap::Parser;
use oath_ticket_monitor::config::cli::{load_file_config, TestEmailArgs};
use oath_ticket_monitor::utils::{logger, validation::Validate};
use oath_ticket_monitor::{NotificationPayload, Notifier, SmtpNotifier, SmtpSettings};

const TEST_SUBJECT: &str = "Test OATH Ticket Monitor Notification";
const TEST_BODY: &str = "This is a test email from the OATH Ticket Monitor.\n\n\
If you receive this message, the email notification system is configured correctly.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = TestEmailArgs::parse();

    logger::init_logger(args.json_logs, args.verbose);

    let file_config = load_file_config(args.config.as_ref())?;
    let smtp = SmtpSettings::from_env(&file_config)
        .context("Missing one or more required environment variables for sending email")?;
    smtp.validate()?;
    tracing::info!("Sending test email via {}:{}", smtp.server, smtp.port);

    let notifier = SmtpNotifier::new(&smtp)?;
    let payload = NotificationPayload {
        subject: TEST_SUBJECT.to_string(),
        body: TEST_BODY.to_string(),
    };

    if let Err(e) = notifier.send(&payload).await {
        tracing::error!("Test email failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code());
    }

    println!("✅ Test email sent to {}", smtp.to_email);
    Ok(())
}
