// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
//   1. `smoke`   — one forward pass on random images
//   2. `init`    — save a freshly initialised checkpoint
//   3. `summary` — stage shapes and parameter counts

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InitArgs, SmokeArgs, SummaryArgs};

#[derive(Parser, Debug)]
#[command(
    name = "trans-unet",
    version = "0.1.0",
    about = "TransUNet segmentation network: build it, inspect it, run a forward pass."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Smoke(args)   => Self::run_smoke(args),
            Commands::Init(args)    => Self::run_init(args),
            Commands::Summary(args) => Self::run_summary(args),
        }
    }

    fn run_smoke(args: SmokeArgs) -> Result<()> {
        use crate::application::smoke_use_case::SmokeUseCase;

        let shape = SmokeUseCase::new(args.into()).execute()?;
        println!("Output shape: {:?}", shape);
        Ok(())
    }

    fn run_init(args: InitArgs) -> Result<()> {
        use crate::application::init_use_case::InitUseCase;

        let dir = args.checkpoint_dir.clone();
        let params = InitUseCase::new(args.into()).execute()?;
        println!("Saved {} parameters to '{}'", params, dir.display());
        Ok(())
    }

    fn run_summary(args: SummaryArgs) -> Result<()> {
        use crate::application::summary_use_case::SummaryUseCase;

        let summary = SummaryUseCase::new(args.model.into(), args.batch_size).execute()?;
        let p = &summary.params;

        println!("Stage shapes:");
        print!("{}", summary.plan);
        println!("Parameters:");
        println!("  {:<12} {:>12}", "cnn encoder", p.encoder_cnn);
        println!("  {:<12} {:>12}", "transformer", p.transformer);
        println!("  {:<12} {:>12}", "projection",  p.projection);
        println!("  {:<12} {:>12}", "decoder",     p.decoder);
        println!("  {:<12} {:>12}", "total",       p.total());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_reference_config() {
        let cli = Cli::try_parse_from(["trans-unet", "smoke"]).unwrap();
        let Commands::Smoke(args) = cli.command else {
            panic!("expected smoke");
        };
        assert_eq!(args.model.img_dim, 128);
        assert_eq!(args.model.out_channels, 128);
        assert_eq!(args.batch_size, 4);
        assert_eq!(args.device, crate::domain::device::DeviceKind::Cpu);
    }

    #[test]
    fn test_parses_device_and_model_flags() {
        let cli = Cli::try_parse_from([
            "trans-unet", "init",
            "--img-dim", "64",
            "--class-num", "3",
            "--device", "wgpu",
            "--checkpoint-dir", "out",
        ])
        .unwrap();
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.model.img_dim, 64);
        assert_eq!(args.model.class_num, 3);
        assert_eq!(args.device, crate::domain::device::DeviceKind::Wgpu);
        assert_eq!(args.checkpoint_dir, std::path::PathBuf::from("out"));
    }

    #[test]
    fn test_unknown_device_is_a_parse_error() {
        assert!(Cli::try_parse_from(["trans-unet", "smoke", "--device", "tpu"]).is_err());
    }
}
