use clap::Parser;
use small_raffle::adapters::{export, ConsoleObserver};
use small_raffle::config::cli::{CliConfig, Command};
use small_raffle::config::leagues::LeagueCatalog;
use small_raffle::config::{Settings, StorageSettings};
use small_raffle::domain::model::{assigned_first, HistoryLedger, RaffleKind};
use small_raffle::domain::ports::LedgerStorage;
use small_raffle::utils::error::{RaffleError, Result};
use small_raffle::utils::{logger, validation::Validate};
use small_raffle::{DirLegacyStorage, DrawMachine, DrawReport, FileLedgerStorage, HistoryStore, HttpLedgerStorage};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting small-raffle CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    let settings = match config.validate().and_then(|_| config.settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let result = match settings.storage.clone() {
        StorageSettings::File { path } => {
            tracing::debug!("Using history file: {}", path);
            run(&config, &settings, FileLedgerStorage::new(path)).await
        }
        StorageSettings::Http { endpoint } => {
            tracing::debug!("Using history endpoint: {}", endpoint);
            run(&config, &settings, HttpLedgerStorage::new(&endpoint)).await
        }
    };

    if let Err(e) = result {
        // 輸入錯誤只是警告，不算執行失敗
        if e.is_validation() {
            tracing::warn!("⚠️ Invalid input: {}", e);
        } else {
            tracing::error!(
                "❌ Raffle failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        }

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code != 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run<L: LedgerStorage>(config: &CliConfig, settings: &Settings, storage: L) -> Result<()> {
    let store = HistoryStore::new(storage);

    if let Command::Migrate = config.command {
        let dir = settings
            .legacy_dir
            .as_deref()
            .ok_or_else(|| RaffleError::MissingConfigError {
                field: "legacy_dir".to_string(),
            })?;
        let report = store.migrate_legacy(&DirLegacyStorage::new(dir)).await?;
        if report.is_noop() {
            println!("Nothing to migrate");
        } else {
            println!(
                "✅ Migrated {} regular and {} team matching draws",
                report.regular_migrated, report.team_matching_migrated
            );
        }
        return Ok(());
    }

    // 與舊版相同：每次啟動都先嘗試搬移舊資料，失敗只記錄
    if let Some(dir) = &settings.legacy_dir {
        if let Err(e) = store.migrate_legacy(&DirLegacyStorage::new(dir)).await {
            tracing::error!("❌ Error migrating raffle histories: {}", e);
        }
    }

    match &config.command {
        Command::Draw {
            entries,
            winners,
            csv,
        } => {
            let mut machine = DrawMachine::new(store, ConsoleObserver).with_timing(settings.timing);
            for entry in entries {
                machine.add_entry(entry)?;
            }
            machine.set_winner_count(*winners)?;

            cancel_on_ctrl_c(machine.cancel_token());
            let report = machine.draw_regular().await?;
            finish(&report, csv.as_deref()).await
        }
        Command::Match {
            teams,
            league,
            candidates,
            csv,
        } => {
            let mut machine = DrawMachine::new(store, ConsoleObserver).with_timing(settings.timing);
            match league {
                Some(name) => machine.select_league(&load_catalog(settings)?, name)?,
                None => {
                    for team in teams {
                        machine.add_team(team)?;
                    }
                }
            }
            for candidate in candidates {
                machine.add_candidate(candidate)?;
            }

            cancel_on_ctrl_c(machine.cancel_token());
            let report = machine.draw_matching().await?;
            finish(&report, csv.as_deref()).await
        }
        Command::History { kind, limit } => {
            let ledger = store.load().await?;
            let kinds = match kind {
                Some(kind) => vec![RaffleKind::from(*kind)],
                None => vec![RaffleKind::Regular, RaffleKind::TeamMatching],
            };
            for kind in kinds {
                print_history(&ledger, kind, *limit);
            }
            Ok(())
        }
        Command::Leagues => {
            let catalog = load_catalog(settings)?;
            if catalog.is_empty() {
                println!("No leagues defined");
            }
            for name in catalog.names() {
                let teams = catalog.teams(name)?;
                println!("{} ({} teams)", name, teams.len());
            }
            Ok(())
        }
        Command::Migrate => Ok(()),
    }
}

fn cancel_on_ctrl_c(token: tokio_util::sync::CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

fn load_catalog(settings: &Settings) -> Result<LeagueCatalog> {
    let path = settings
        .leagues_file
        .as_deref()
        .ok_or_else(|| RaffleError::MissingConfigError {
            field: "leagues_file".to_string(),
        })?;
    LeagueCatalog::from_file(path)
}

async fn finish(report: &DrawReport, csv: Option<&Path>) -> Result<()> {
    if let Some(e) = &report.persistence_error {
        eprintln!("⚠️  The draw finished but was not saved to history: {}", e);
    }
    if let Some(path) = csv {
        export::write_csv(path, &report.outcome).await?;
        println!("📁 Output saved to: {}", path.display());
    }
    Ok(())
}

fn print_history(ledger: &HistoryLedger, kind: RaffleKind, limit: usize) {
    println!("== {} draws ({}) ==", kind, ledger.len(kind));
    match kind {
        RaffleKind::Regular => {
            for record in ledger.regular.iter().take(limit) {
                println!(
                    "[{}] {} of {} entries: {}",
                    record.date,
                    record.winner_count,
                    record.items.len(),
                    record.winners.join(", ")
                );
            }
        }
        RaffleKind::TeamMatching => {
            for record in ledger.team_matching.iter().take(limit) {
                let pairs: Vec<String> = assigned_first(&record.results)
                    .into_iter()
                    .map(|r| format!("{} → {}", r.team, r.candidate.as_deref().unwrap_or("-")))
                    .collect();
                println!("[{}] {}", record.date, pairs.join(", "));
            }
        }
    }
}
