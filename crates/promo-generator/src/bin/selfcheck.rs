use std::path::Path;
use std::process::Command;

use promo_generator::GeneratorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GeneratorConfig::from_env();

    println!(
        "promo-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_tool("ffmpeg", promo_media::check_ffmpeg().is_ok())?;
    ensure_tool("ffprobe", promo_media::check_ffprobe().is_ok())?;
    ensure_env_present(&["FAL_KEY"])?;

    if std::env::var("LLM_GATEWAY_URL").is_err() {
        println!("promo-selfcheck: LLM_GATEWAY_URL not set, page analysis disabled");
    }

    println!("promo-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_tool(name: &str, on_path: bool) -> anyhow::Result<()> {
    if !on_path {
        return Err(anyhow::anyhow!("{} not found in PATH", name));
    }

    let output = Command::new(name)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            name,
            output.status
        ));
    }
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
