use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use probe::session::{DEFAULT_BATCH_SIZE, DEFAULT_DELAY_SECS, DEFAULT_LISTEN_WINDOW_SECS};

use crate::error::LatencyError;

pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:9300";

#[derive(Parser)]
#[command(name = "latency", about = "Измерение end-to-end задержки pub/sub сообщений")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Опубликовать batch sequence-stamped сообщений в канал
    Publish(ProbeArgs),
    /// Слушать канал заданное окно и построить latency-отчёт
    Subscribe(ProbeArgs),
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub relay: Option<String>,
    pub report_dir: Option<String>,
    pub batch: Option<u64>,
    pub delay_secs: Option<u64>,
    pub window_secs: Option<u64>,
    pub seed: Option<i64>,
}

/// `Ok(None)` — файла нет; любая другая ошибка чтения или разбора
/// фатальна.
pub fn load_config(path: &str) -> Result<Option<Config>, LatencyError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LatencyError::Config(format!("cannot read config {path}: {e}")));
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| LatencyError::Config(format!("bad config {path}: {e}")))
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct ProbeArgs {
    /// Путь к config.toml
    #[arg(long, default_value = "latency.toml", env = "LATENCY_CONFIG")]
    pub config: String,

    /// Канал
    #[arg(short = 'c', long)]
    pub channel: String,

    /// Событие канала
    #[arg(short = 'e', long)]
    pub event: String,

    /// Адрес relay-брокера, host:port
    #[arg(long, env = "LATENCY_RELAY")]
    pub relay: Option<String>,

    /// Директория report-файлов
    #[arg(long)]
    pub report_dir: Option<String>,

    /// Сообщений в batch'е
    #[arg(long)]
    pub batch: Option<u64>,

    /// Пауза между сообщениями, секунды
    #[arg(long)]
    pub delay: Option<u64>,

    /// Окно прослушивания, секунды
    #[arg(long)]
    pub window: Option<u64>,

    /// Seed генератора client id (0 = от текущего времени)
    #[arg(long)]
    pub seed: Option<i64>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

/// Итоговая конфигурация после мержа: config.toml < env/CLI.
pub struct Effective {
    pub channel: String,
    pub event: String,
    pub relay: String,
    pub report_dir: String,
    pub batch: u64,
    pub delay: Duration,
    pub window: Duration,
    pub seed: i64,
}

impl Effective {
    pub fn new(args: &ProbeArgs) -> Result<Self, LatencyError> {
        // Отсутствующий конфиг — просто пустой; нечитаемый — ошибка.
        let cfg = load_config(&args.config)?.unwrap_or_default();

        let batch = args.batch.or(cfg.batch).unwrap_or(DEFAULT_BATCH_SIZE);
        if batch == 0 {
            return Err(LatencyError::Config("batch must be positive".into()));
        }

        Ok(Self {
            channel: args.channel.clone(),
            event: args.event.clone(),
            relay: args
                .relay
                .clone()
                .or(cfg.relay)
                .unwrap_or_else(|| DEFAULT_RELAY_ADDR.into()),
            report_dir: args
                .report_dir
                .clone()
                .or(cfg.report_dir)
                .unwrap_or_else(|| ".".into()),
            batch,
            delay: Duration::from_secs(args.delay.or(cfg.delay_secs).unwrap_or(DEFAULT_DELAY_SECS)),
            window: Duration::from_secs(
                args.window.or(cfg.window_secs).unwrap_or(DEFAULT_LISTEN_WINDOW_SECS),
            ),
            seed: args.seed.or(cfg.seed).unwrap_or(0),
        })
    }
}
