use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "thumbsmith", version)]
struct Cli {
    /// Config JSON (defaults apply when omitted; THUMBSMITH_* variables override either way).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an action script and write the canvas as a PNG.
    Render(RenderArgs),
    /// Apply an action script and export the canvas to the gallery.
    Export(ExportArgs),
    /// Apply an action script and print the resulting state as JSON.
    State(ScriptArgs),
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Action script: a JSON array of actions.
    #[arg(long)]
    script: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print diagnostics about text font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Image to pick as the background before exporting.
    #[arg(long)]
    pick: Option<PathBuf>,

    /// Answer to the permission prompt when gallery access is denied.
    #[arg(long, value_enum, default_value_t = thumbsmith::PermissionChoice::Cancel)]
    on_denied: thumbsmith::PermissionChoice,

    /// Print diagnostics about text font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&cfg, args),
        Command::Export(args) => cmd_export(&cfg, args).await,
        Command::State(args) => cmd_state(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<thumbsmith::ThumbConfig> {
    match path {
        Some(p) => Ok(thumbsmith::ThumbConfig::from_path(p)?),
        None => {
            let mut cfg = thumbsmith::ThumbConfig::default();
            cfg.apply_env()?;
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

/// Read a script; relative image paths resolve against the script's directory.
fn read_script(path: &Path) -> anyhow::Result<Vec<thumbsmith::Action>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open script '{}'", path.display()))?;
    let actions = thumbsmith::parse_script(&json)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));

    actions
        .into_iter()
        .map(|action| -> anyhow::Result<thumbsmith::Action> {
            match action {
                thumbsmith::Action::SetBackgroundImage { uri } => {
                    let p = uri.to_path()?;
                    let uri = if p.is_relative() {
                        thumbsmith::ResourceHandle::from(root.join(p))
                    } else {
                        uri
                    };
                    Ok(thumbsmith::Action::SetBackgroundImage { uri })
                }
                other => Ok(other),
            }
        })
        .collect()
}

fn run_script(
    cfg: &thumbsmith::ThumbConfig,
    script: &ScriptArgs,
    mount: bool,
) -> anyhow::Result<thumbsmith::Editor> {
    let actions = read_script(&script.script)?;
    let mut editor = thumbsmith::Editor::from_config(cfg)?;
    editor.dispatch_all(actions)?;
    if mount {
        editor.mount()?;
    }
    Ok(editor)
}

fn cmd_render(cfg: &thumbsmith::ThumbConfig, args: RenderArgs) -> anyhow::Result<()> {
    let editor = run_script(cfg, &args.script, true)?;
    if args.dump_fonts {
        dump_font_diagnostics(cfg)?;
    }
    let surface = editor.surface().context("canvas was not rendered (bug)")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let png = thumbsmith::encode_png(&surface.frame)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_export(cfg: &thumbsmith::ThumbConfig, args: ExportArgs) -> anyhow::Result<()> {
    let mut editor = run_script(cfg, &args.script, true)?;
    if args.dump_fonts {
        dump_font_diagnostics(cfg)?;
    }
    if let Some(path) = args.pick {
        let picker = thumbsmith::PathPicker::new(Some(path));
        editor.pick_background_image(&picker).await?;
    }

    let outcome = editor
        .export(
            &thumbsmith::PngCapture,
            &cfg.gallery(),
            &args.on_denied,
            &thumbsmith::CancelToken::new(),
        )
        .await;

    if let Some(notice) = outcome.notice() {
        eprintln!("{notice}");
    }
    match outcome {
        thumbsmith::ExportOutcome::Saved(saved) => {
            println!("{}", saved.uri);
            Ok(())
        }
        thumbsmith::ExportOutcome::PermissionDenied { settings_opened } => {
            if !settings_opened {
                eprintln!("{}", thumbsmith::PERMISSION_NOTICE.message);
            }
            anyhow::bail!("gallery permission denied")
        }
        thumbsmith::ExportOutcome::Failed { notice } => anyhow::bail!(notice),
        thumbsmith::ExportOutcome::Cancelled => Ok(()),
    }
}

fn cmd_state(cfg: &thumbsmith::ThumbConfig, args: ScriptArgs) -> anyhow::Result<()> {
    let editor = run_script(cfg, &args, false)?;
    let json = serde_json::to_string_pretty(editor.state()).context("serialize state")?;
    println!("{json}");
    Ok(())
}

fn dump_font_diagnostics(cfg: &thumbsmith::ThumbConfig) -> anyhow::Result<()> {
    let fonts = thumbsmith::FontSet::resolve(&cfg.fonts).context("resolve fonts")?;
    eprintln!("text font diagnostics:");
    for (role, face) in [("regular", &fonts.regular), ("bold", &fonts.bold)] {
        eprintln!("  {role}:");
        eprintln!("    family:      {}", face.label);
        eprintln!("    index:       {}", face.index);
        eprintln!("    sha256:      {}", face.sha256_hex());
    }
    Ok(())
}
