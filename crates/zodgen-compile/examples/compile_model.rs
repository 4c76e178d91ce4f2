use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use zodgen_compile::{CompileEngine, fingerprint, render_plan};
use zodgen_config::{GeneratorConfig, load_config};
use zodgen_core::DataModel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut model_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model_path = args.next().map(PathBuf::from),
            "--config" => config_path = args.next().map(PathBuf::from),
            _ => {
                if model_path.is_none() {
                    model_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let model_path =
        model_path.ok_or("usage: compile_model --model <model.json> [--config <file>]")?;
    let model: DataModel = serde_json::from_slice(&std::fs::read(model_path)?)?;
    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => GeneratorConfig::default(),
    };

    let plan = CompileEngine::new(config).run(&model)?;
    for file in render_plan(&plan) {
        println!("// ==> {}", file.path);
        print!("{}", file.contents);
    }
    println!("// fingerprint {}", fingerprint(&plan));
    Ok(())
}
