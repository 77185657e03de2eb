use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use travel_link::adapters::{
    HttpMailTransport, InMemoryQueue, ReqwestTransport, UserServiceDirectory,
};
use travel_link::utils::error::ErrorSeverity;
use travel_link::utils::{logger, validation::Validate};
use travel_link::{
    AppConfig, CliArgs, InterserviceCommunicator, NotificationSender, ProviderFactory,
    QueueListener, ServiceError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入配置（日誌尚未初始化，錯誤直接輸出）
    let config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose_logs();
    if args.json_logs || config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting travel-link notification service");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        exit_with(&e);
    }
    tracing::info!("✅ Configuration validated");

    if args.check {
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if let Err(e) = run(config).await {
        exit_with(&e);
    }

    // stdin 的讀取可能仍佔著阻塞執行緒，直接結束程序而不等待 runtime 關閉
    std::process::exit(0);
}

async fn run(config: AppConfig) -> travel_link::Result<()> {
    let timeout = config.request_timeout();
    let transport = Arc::new(ReqwestTransport::new(timeout)?);

    let communicator = InterserviceCommunicator::initialize(
        config.service_addresses()?,
        transport,
        config.service_credential()?,
    )
    .await?;

    let mail = Arc::new(HttpMailTransport::new(
        config.mail_relay_url()?,
        config.notification.sender_address.clone(),
        timeout,
    )?);
    let directory = Arc::new(UserServiceDirectory::new(communicator.users()?));
    let factory = ProviderFactory::new(mail, directory, config.notification_subject());

    let queue = InMemoryQueue::new();
    let mut listener =
        QueueListener::new(Arc::new(queue.clone()), NotificationSender::new(factory));
    if let Some(max) = config.notification.max_delivery_attempts {
        listener = listener.with_max_delivery_attempts(max);
    }
    if let Some(backoff) = config.retry_backoff() {
        listener = listener.with_retry_backoff(backoff);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ctrl-C 觸發關機
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("⏹️ Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    // 每一行 stdin 是一則 JSON 佇列訊息；讀到結尾就關閉佇列
    let feeder = queue.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if let Err(e) = feeder.publish(line.into_bytes()) {
                        tracing::warn!("Failed to enqueue input line: {}", e);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("❌ Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        feeder.close();
    });

    listener.run(shutdown_rx).await?;

    tracing::info!(
        "📊 Delivered: {}, dead-lettered: {}, still queued: {}",
        queue.acknowledged_count(),
        queue.dead_lettered_count(),
        queue.pending_len()
    );
    for dead in queue.drain_dead_letters() {
        tracing::warn!("☠️ Dead letter {}: {}", dead.delivery.id, dead.reason);
    }

    Ok(())
}

fn exit_with(e: &ServiceError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0, // 警告，但成功
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
