use anyhow::{anyhow, bail, Context, Result};
use collider_editor::cli::CliOverrides;
use collider_editor::config::EditorConfig;
use collider_editor::controls::NullSurface;
use collider_editor::ecs_host::{EcsSceneHost, SceneManifest};
use collider_editor::editable::Editable;
use collider_editor::filter::{Choice, FilterQuery};
use collider_editor::preset::PresetLibrary;
use collider_editor::session::{EditorSession, SessionStatusKind};
use std::env;
use std::path::Path;
use std::process;
use std::time::SystemTime;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

struct Tool {
    host: EcsSceneHost,
    ui: NullSurface,
}

impl Tool {
    fn open(config: &EditorConfig, scene_path: &str) -> Result<(Self, EditorSession)> {
        let manifest = SceneManifest::load_from_path(scene_path)?;
        let mut host = EcsSceneHost::from_manifest(&manifest)
            .with_context(|| format!("building scene '{scene_path}'"))?;
        let mut ui = NullSurface::default();
        let session = EditorSession::init(config.clone(), &mut host, &mut ui);
        if session.registry().is_none() {
            let message = session.status().map(|status| status.message.clone()).unwrap_or_default();
            bail!("{message}");
        }
        Ok((Self { host, ui }, session))
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let flag_count = leading_flag_count(&args);
    let overrides = CliOverrides::parse(&args[..flag_count])?;
    let mut config = match overrides.config_path() {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let overrides = overrides.into_config_overrides();
    if !overrides.is_empty() {
        log::info!("[config] command-line overrides: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);

    let mut args = args.into_iter().skip(flag_count);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "list" => {
            let scene_path =
                args.next().ok_or_else(|| anyhow!("list requires a path: collider_tool list <scene> [options]"))?;
            let options: Vec<String> = args.collect();
            cmd_list(&config, &scene_path, &options)
        }
        "groups" => {
            let scene_path =
                args.next().ok_or_else(|| anyhow!("groups requires a path: collider_tool groups <scene>"))?;
            cmd_groups(&config, &scene_path)
        }
        "types" => {
            let scene_path =
                args.next().ok_or_else(|| anyhow!("types requires a path: collider_tool types <scene>"))?;
            cmd_types(&config, &scene_path)
        }
        "snapshot" => {
            let scene_path = args
                .next()
                .ok_or_else(|| anyhow!("snapshot requires arguments: collider_tool snapshot <scene> <output>"))?;
            let output = args.next().ok_or_else(|| anyhow!("snapshot missing output path argument"))?;
            cmd_snapshot(&config, &scene_path, &output)
        }
        "apply" => {
            let scene_path = args
                .next()
                .ok_or_else(|| anyhow!("apply requires arguments: collider_tool apply <scene> <preset>"))?;
            let preset = args.next().ok_or_else(|| anyhow!("apply missing preset path argument"))?;
            cmd_apply(&config, &scene_path, &preset)
        }
        "save-as" => {
            let scene_path = args
                .next()
                .ok_or_else(|| anyhow!("save-as requires arguments: collider_tool save-as <scene> <name>"))?;
            let name = args.next().ok_or_else(|| anyhow!("save-as missing preset name argument"))?;
            cmd_save_as(&config, &scene_path, &name)
        }
        "presets" => cmd_presets(&config),
        "suggest-name" => {
            let path = config
                .presets
                .directory
                .join(collider_editor::preset::suggested_file_name(SystemTime::now(), &config.presets.extension));
            println!("{}", path.display());
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

/// Global `--flag value` pairs come before the command.
fn leading_flag_count(args: &[String]) -> usize {
    let mut count = 0;
    while count < args.len() && args[count].starts_with("--") && !matches!(args[count].as_str(), "--help") {
        count += 2;
    }
    count.min(args.len())
}

fn print_usage() {
    eprintln!(
        "Collider Tool

Usage:
  collider_tool [--config <file>] [--preset-dir <dir>] [--xray on|off] [--show-previews on|off] <command>

Commands:
  list <scene> [--group G] [--type T] [--modified] [--search TEXT] [--preset P]
                                       List editables matching the filters (default: all)
  groups <scene>                       List group names available to the group filter
  types <scene>                        List type names present in the scene
  snapshot <scene> <output>            Write every editable's state to a preset
  save-as <scene> <name>               Write a preset into the preset directory under a name
  presets                              List presets in the preset directory
  apply <scene> <preset>               Load a preset and report what changed or was skipped
  suggest-name                         Print a timestamped preset path
  help                                 Show this message
"
    );
}

fn cmd_list(config: &EditorConfig, scene_path: &str, options: &[String]) -> Result<()> {
    let (mut tool, mut session) = Tool::open(config, scene_path)?;
    let mut query = FilterQuery::everything();
    let mut preset = None;
    let mut options = options.iter();
    while let Some(option) = options.next() {
        let mut value = |name: &str| options.next().cloned().ok_or_else(|| anyhow!("{name} expects a value"));
        match option.as_str() {
            "--group" => query.group = Choice::parse(&value("--group")?),
            "--type" => query.type_name = Choice::parse(&value("--type")?),
            "--search" => query.search = value("--search")?,
            "--preset" => preset = Some(value("--preset")?),
            "--modified" => query.modified_only = true,
            other => bail!("unknown list option '{other}'"),
        }
    }
    if let Some(preset) = preset {
        load_into(&mut tool, &mut session, &preset)?;
    }
    session.set_query(query, &mut tool.host, &mut tool.ui);

    let Some(registry) = session.registry() else {
        return Ok(());
    };
    println!("{:<3} {:<44} {:<14} {:<14} {}", "Mod", "Id", "Type", "Group", "Label");
    println!("{}", "-".repeat(110));
    for row in session.rows() {
        let Some(entity) = registry.get(row.id.as_str()) else {
            continue;
        };
        let modified = if entity.deviates_from_initial() { "*" } else { "" };
        let group = registry.group_name(entity).unwrap_or("-");
        println!("{:<3} {:<44} {:<14} {:<14} {}", modified, row.id, entity.type_name(), group, row.label);
    }
    println!("{} of {} top-level editables shown", session.rows().len(), registry.entries().count());
    Ok(())
}

fn cmd_groups(config: &EditorConfig, scene_path: &str) -> Result<()> {
    let (_, session) = Tool::open(config, scene_path)?;
    for name in session.group_choices() {
        println!("{name}");
    }
    Ok(())
}

fn cmd_types(config: &EditorConfig, scene_path: &str) -> Result<()> {
    let (_, session) = Tool::open(config, scene_path)?;
    for name in session.type_choices() {
        println!("{name}");
    }
    Ok(())
}

fn cmd_snapshot(config: &EditorConfig, scene_path: &str, output: &str) -> Result<()> {
    let (_, mut session) = Tool::open(config, scene_path)?;
    match session.save_preset(output) {
        Some(path) => {
            println!("Wrote {} editables to '{}'", session.registry().map_or(0, |r| r.len()), path.display());
            Ok(())
        }
        None => Err(status_error(&session, "snapshot failed")),
    }
}

fn cmd_save_as(config: &EditorConfig, scene_path: &str, name: &str) -> Result<()> {
    let (_, mut session) = Tool::open(config, scene_path)?;
    match session.save_preset_named(name) {
        Some(path) => {
            println!("Wrote preset '{}'", path.display());
            Ok(())
        }
        None => Err(status_error(&session, "save failed")),
    }
}

fn cmd_presets(config: &EditorConfig) -> Result<()> {
    let mut library = PresetLibrary::new(config.presets.directory.clone(), config.presets.extension.clone());
    library.refresh()?;
    if library.entries().is_empty() {
        println!("No presets under '{}'", library.root().display());
        return Ok(());
    }
    for entry in library.entries() {
        println!("{:<32} {}", entry.name, entry.path.display());
    }
    Ok(())
}

fn cmd_apply(config: &EditorConfig, scene_path: &str, preset: &str) -> Result<()> {
    let (mut tool, mut session) = Tool::open(config, scene_path)?;
    load_into(&mut tool, &mut session, preset)?;
    let Some(registry) = session.registry() else {
        return Ok(());
    };
    let modified: Vec<_> =
        registry.every_entity().into_iter().filter(|entity| entity.deviates_from_initial()).collect();
    println!("{} editables differ from the scene after applying '{}':", modified.len(), preset);
    for entity in modified {
        println!("  {:<44} {}", entity.id(), entity.label());
    }
    Ok(())
}

fn load_into(tool: &mut Tool, session: &mut EditorSession, preset: &str) -> Result<()> {
    let preset_path = Path::new(preset);
    let Some(report) = session.load_preset(preset_path, &mut tool.host, &mut tool.ui) else {
        return Err(status_error(session, "preset load failed"));
    };
    for id in &report.unknown_ids {
        println!("skipped unknown id '{id}'");
    }
    for (id, key) in &report.mismatched {
        println!("skipped '{id}' field '{key}': wrong value type");
    }
    for id in &report.malformed {
        println!("skipped '{id}': entry is not an object");
    }
    Ok(())
}

fn status_error(session: &EditorSession, fallback: &str) -> anyhow::Error {
    match session.status() {
        Some(status) if status.kind == SessionStatusKind::Error || status.kind == SessionStatusKind::Warning => {
            anyhow!("{}", status.message)
        }
        _ => anyhow!("{fallback}"),
    }
}
