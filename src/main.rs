use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info};

use sabbeats::{Config, MusicService};

const USAGE: &str = "uso: sabbeats <info ID | search QUERY | recommend ID | trending | most-viewed | --health-check>";

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sabbeats=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🎵 Iniciando SabBeats v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;
    info!("{}", config.summary());

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        return health_check(&config).await;
    }

    let service = MusicService::from_config(&config).context("Error al crear el servicio")?;

    match args.first().map(String::as_str) {
        Some("info") => {
            let video_id = argument(&args)?;
            match service.audio_info(&video_id).await {
                Ok(info) => print_json(&info)?,
                Err(e) => {
                    error!("❌ Video no encontrado: {}", e);
                    anyhow::bail!("Video no encontrado: {}", video_id);
                }
            }
        }
        Some("search") => {
            let query = argument(&args)?;
            print_json(&service.search(&query).await?)?;
        }
        Some("recommend") => {
            let video_id = argument(&args)?;
            print_json(&service.recommendations(&video_id).await)?;
        }
        Some("trending") => print_json(&service.trending().await?)?,
        Some("most-viewed") => print_json(&service.most_viewed().await?)?,
        _ => anyhow::bail!(USAGE),
    }

    let stats = service.cache_stats();
    info!(
        "📊 Caché: {} entradas, {} hits, {} misses",
        stats.entries, stats.hits, stats.misses
    );

    Ok(())
}

fn argument(args: &[String]) -> Result<String> {
    let rest = args.get(1..).unwrap_or_default().join(" ");
    if rest.trim().is_empty() {
        anyhow::bail!(USAGE);
    }
    Ok(rest)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn health_check(config: &Config) -> Result<()> {
    // Verificar dependencias críticas
    let yt_dlp = async_process::Command::new(&config.ytdlp_path)
        .arg("--version")
        .output()
        .await
        .context("Error al ejecutar yt-dlp")?;

    if !yt_dlp.status.success() {
        anyhow::bail!("yt-dlp no disponible");
    }
    if config.youtube_api_key.is_none() {
        anyhow::bail!("YOUTUBE_API_KEY no configurada");
    }

    info!(
        "✅ yt-dlp versión: {}",
        String::from_utf8_lossy(&yt_dlp.stdout).trim()
    );
    println!("OK");
    Ok(())
}
