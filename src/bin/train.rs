//! Command line tool to run the training pipeline

use hate_speech_classifier::{pipelines::TrainPipeline, utils::logging, Config, PipelineError};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [OPTIONS]

Options:
  -h, --help           Print help
  -c, --config         A JSON config file (defaults are used otherwise)
  -a, --archive        The dataset archive (defaults to 'data/dataset.zip')
  -d, --artifacts      The root directory for run artifacts (defaults to 'artifacts')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
";

#[derive(Debug)]
struct Args {
    config: Option<String>,
    archive: Option<String>,
    artifacts: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            archive: pargs.opt_value_from_str(["-a", "--archive"])?,
            artifacts: pargs.opt_value_from_str(["-d", "--artifacts"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
        };

        Ok(Some(args))
    }

    fn to_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::from_file(self.config.as_deref())?;

        if let Some(archive) = &self.archive {
            config.ingestion.archive_path = archive.to_string();
        }

        if let Some(artifacts) = &self.artifacts {
            config.artifacts_root = artifacts.to_string();
        }

        if let Some(num_epochs) = self.num_epochs {
            config.trainer.epochs = num_epochs;
        }

        if let Some(batch_size) = self.batch_size {
            config.trainer.batch_size = batch_size;
        }

        config.validate()?;

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    logging::init();

    let config = args.to_config()?;

    match TrainPipeline::new(&config).run() {
        Ok(pushed) => {
            log::info!("Model pushed to {}", pushed.pushed_model_dir.display());

            Ok(())
        }
        Err(PipelineError::ModelNotImproved) => {
            log::warn!("The existing model is kept");

            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
