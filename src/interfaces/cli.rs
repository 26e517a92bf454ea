use crate::application::builder::QrBuilder;
use crate::application::simulator::{ConfirmationSimulator, SimulatorConfig, SimulatorEvent};
use crate::domain::address::{Address, DEFAULT_ADDRESS};
use crate::domain::amount::BtcAmount;
use crate::domain::render::{ColorOverrides, Color, ErrorCorrection, ImageFormat, RenderOverrides};
use crate::domain::request::PaymentRequest;
use crate::domain::status::{PaymentStatus, REQUIRED_CONFIRMATIONS};
use crate::error::Result;
use crate::infrastructure::qr_renderer::QrCodeRenderer;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the payment URI
    Uri(PaymentArgs),
    /// Render the payment URI as a QR code
    Generate(GenerateArgs),
    /// Convert between BTC and USD at the fixed demo rate
    Convert(ConvertArgs),
    /// Simulate confirmations, printing one JSON event per line
    Simulate(SimulateArgs),
}

#[derive(Args)]
pub struct PaymentArgs {
    /// Receiving address
    #[arg(long, env = "BTCQR_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: Address,

    /// Amount in BTC
    #[arg(long, allow_hyphen_values = true)]
    pub amount: BtcAmount,
}

impl PaymentArgs {
    pub fn request(&self) -> PaymentRequest {
        PaymentRequest::new(self.address.clone(), self.amount)
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub payment: PaymentArgs,

    /// JSON file with render option overrides
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Output format: png, svg or terminal
    #[arg(long)]
    pub format: Option<ImageFormat>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Quiet zone in modules
    #[arg(long)]
    pub margin: Option<u32>,

    /// Foreground colour, e.g. #000000
    #[arg(long)]
    pub dark: Option<Color>,

    /// Background colour, e.g. #ffffff
    #[arg(long)]
    pub light: Option<Color>,

    /// Error correction level: L, M, Q or H
    #[arg(long)]
    pub ec: Option<ErrorCorrection>,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Emit a base64 data URI instead of raw image bytes
    #[arg(long)]
    pub data_uri: bool,
}

impl GenerateArgs {
    /// Options file first, then flags on top.
    fn overrides(&self) -> Result<RenderOverrides> {
        let mut overrides = match &self.options {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => RenderOverrides::default(),
        };

        if self.format.is_some() {
            overrides.format = self.format;
        }
        if self.width.is_some() {
            overrides.width = self.width;
        }
        if self.margin.is_some() {
            overrides.margin = self.margin;
        }
        if self.ec.is_some() {
            overrides.error_correction = self.ec;
        }
        if self.dark.is_some() || self.light.is_some() {
            let color = overrides.color.get_or_insert_with(ColorOverrides::default);
            color.dark = self.dark.or(color.dark);
            color.light = self.light.or(color.light);
        }
        Ok(overrides)
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ConvertArgs {
    /// Amount in BTC to express in USD
    #[arg(long, allow_hyphen_values = true)]
    pub btc: Option<BtcAmount>,

    /// Amount in USD to express in BTC
    #[arg(long, allow_hyphen_values = true)]
    pub usd: Option<Decimal>,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Milliseconds between confirmations
    #[arg(
        long,
        env = "BTCQR_TICK_MS",
        default_value_t = SimulatorConfig::default().tick_interval_ms,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,

    /// Mark the payment as failed once it has this many confirmations (1 to 5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..i64::from(REQUIRED_CONFIRMATIONS)))]
    pub fail_after: Option<u32>,
}

pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Command::Uri(args) => {
            writeln!(out, "{}", args.request().uri())?;
        }
        Command::Generate(args) => generate(&args, out).await?,
        Command::Convert(args) => convert(&args, out)?,
        Command::Simulate(args) => simulate(&args, out).await?,
    }
    Ok(())
}

async fn generate<W: Write>(args: &GenerateArgs, out: &mut W) -> Result<()> {
    let overrides = args.overrides()?;
    let builder = QrBuilder::new(Box::new(QrCodeRenderer::new()));
    let image = builder
        .build_request(&args.payment.request(), Some(&overrides))
        .await?;

    let bytes = if args.data_uri {
        let mut line = image.to_data_uri();
        line.push('\n');
        line.into_bytes()
    } else {
        image.bytes
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes)?;
            info!(path = %path.display(), payload = %image.payload, "wrote QR code");
        }
        None => out.write_all(&bytes)?,
    }
    Ok(())
}

fn convert<W: Write>(args: &ConvertArgs, out: &mut W) -> Result<()> {
    if let Some(btc) = args.btc {
        writeln!(out, "{}", btc.to_usd().round_dp(2))?;
    } else if let Some(usd) = args.usd {
        writeln!(out, "{}", BtcAmount::from_usd(usd)?)?;
    }
    Ok(())
}

async fn simulate<W: Write>(args: &SimulateArgs, out: &mut W) -> Result<()> {
    let config = SimulatorConfig {
        tick_interval_ms: args.tick_ms,
    };
    let (simulator, mut events) = ConfirmationSimulator::new(config)?;
    simulator.trigger().await;

    while let Some(event) = events.recv().await {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
        out.flush()?;

        match event {
            SimulatorEvent::PaymentConfirmed { .. } => break,
            SimulatorEvent::StatusChanged(state) => match state.status() {
                PaymentStatus::Failed => break,
                PaymentStatus::Processing
                    if args.fail_after == Some(state.confirmations()) =>
                {
                    simulator.fail().await;
                }
                _ => {}
            },
        }
    }
    Ok(())
}
