use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sentio_core::{
    FrameAnalysisPipeline, OnnxEmotionClassifier, OnnxFaceLocator, PowerMode,
};
use sentio_hw::Camera;
use std::path::PathBuf;

mod draw;

#[zbus::proxy(
    interface = "org.sentio.Perception1",
    default_service = "org.sentio.Perception1",
    default_path = "/org/sentio/Perception1"
)]
trait Perception {
    async fn analyze(&self, mode: &str) -> zbus::Result<(String, f64)>;
    async fn status(&self) -> zbus::Result<String>;
}

#[derive(Parser)]
#[command(name = "sentio", about = "Sentio emotion perception CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one frame via the daemon and print (label, score)
    Analyze {
        /// Power mode: "high" or "low"
        #[arg(short, long, default_value = "high")]
        mode: PowerMode,
    },
    /// Analyze repeatedly via the daemon
    Watch {
        /// Power mode: "high" or "low"
        #[arg(short, long, default_value = "high")]
        mode: PowerMode,
        /// Number of ticks (0 = until interrupted)
        #[arg(short, long, default_value_t = 0)]
        count: u64,
        /// Delay between ticks in milliseconds
        #[arg(short, long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Show daemon status
    Status,
    /// List available camera devices
    Devices,
    /// Run the pipeline in-process on one frame and write an annotated PNG
    Snapshot {
        /// Power mode: "high" or "low"
        #[arg(short, long, default_value = "high")]
        mode: PowerMode,
        /// Output PNG path
        #[arg(short, long, default_value = "snapshot.png")]
        output: PathBuf,
        /// V4L2 device path
        #[arg(short, long, default_value = "/dev/video0")]
        device: String,
        /// Directory containing ONNX model files
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { mode } => {
            let proxy = connect().await?;
            let (label, score) = proxy.analyze(mode.as_str()).await?;
            println!("{label} ({score:.1})");
        }
        Commands::Watch { mode, count, interval_ms } => {
            let proxy = connect().await?;
            let mut tick = 0u64;
            loop {
                let (label, score) = proxy.analyze(mode.as_str()).await?;
                println!("[{tick}] {label} ({score:.1})");
                tick += 1;
                if count > 0 && tick >= count {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(interval_ms)).await;
            }
        }
        Commands::Status => {
            let proxy = connect().await?;
            println!("{}", proxy.status().await?);
        }
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("no capture devices found");
            }
            for d in devices {
                println!("{}  {} ({}, {})", d.path, d.name, d.driver, d.bus);
            }
        }
        Commands::Snapshot { mode, output, device, model_dir } => {
            snapshot(mode, &output, &device, model_dir)?;
        }
    }

    Ok(())
}

async fn connect() -> Result<PerceptionProxy<'static>> {
    let conn = zbus::Connection::session()
        .await
        .context("failed to connect to session bus — is sentiod running?")?;
    PerceptionProxy::new(&conn)
        .await
        .context("failed to create daemon proxy")
}

/// Direct mode: open the camera and models in-process, analyze one frame,
/// draw the annotations, and write a PNG. Bypasses the daemon, mirroring
/// what it does per tick.
fn snapshot(mode: PowerMode, output: &PathBuf, device: &str, model_dir: Option<PathBuf>) -> Result<()> {
    let model_dir = model_dir.unwrap_or_else(sentio_core::default_model_dir);
    let ultraface = model_dir.join("version-RFB-320.onnx");
    let fer = model_dir.join("emotion-fer.onnx");

    let camera = Camera::open(device).context("failed to open camera")?;
    let locator = OnnxFaceLocator::load(
        &ultraface.to_string_lossy(),
        sentio_core::locator::DEFAULT_CONFIDENCE_THRESHOLD,
    )
    .context("failed to load UltraFace model")?;
    let classifier = OnnxEmotionClassifier::load(&fer.to_string_lossy())
        .context("failed to load FER model")?;

    let mut pipeline = FrameAnalysisPipeline::new(Box::new(locator), Box::new(classifier));

    let mut frame = match camera.capture_frame() {
        Ok(f) => Some(f),
        Err(e) => {
            tracing::warn!(error = %e, "frame capture failed");
            None
        }
    };

    let (summary, annotations) = pipeline.analyze(frame.as_mut(), mode);
    println!("{} ({:.1})", summary.label, summary.score);

    let Some(mut frame) = frame else {
        anyhow::bail!("no frame captured; nothing to write");
    };

    draw::draw_annotations(&mut frame, &annotations);

    let img = image::RgbImage::from_raw(frame.width, frame.height, frame.data)
        .context("frame buffer does not match its dimensions")?;
    img.save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("wrote {}", output.display());

    Ok(())
}
