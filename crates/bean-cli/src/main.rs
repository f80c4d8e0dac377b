//! beanctl: inspect bean manifests and effective definitions

use anyhow::{anyhow, Context, Result};
use bean_config::Manifest;
use bean_core::{merge, BeanDefinition, DefinitionRegistry, Overrides, Value};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("beanctl")
        .version(bean_core::VERSION)
        .about("Inspect bean manifests and effective bean definitions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Load and validate a manifest")
                .arg(
                    Arg::new("manifest")
                        .required(true)
                        .help("Manifest file (.toml, .yaml, .yml or .json)"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print the effective definition of one bean")
                .arg(Arg::new("manifest").required(true).help("Manifest file"))
                .arg(Arg::new("name").required(true).help("Bean name"))
                .arg(
                    Arg::new("arg")
                        .long("arg")
                        .action(ArgAction::Append)
                        .value_name("SLOT=VALUE")
                        .help("Override a constructor argument; null leaves the slot unchanged"),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .action(ArgAction::Append)
                        .value_name("NAME=VALUE")
                        .help("Override a field value"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("check", args)) => check(args),
        Some(("show", args)) => show(args),
        _ => Err(anyhow!("unknown subcommand")),
    }
}

fn load(args: &ArgMatches) -> Result<Manifest> {
    let path = args
        .get_one::<String>("manifest")
        .ok_or_else(|| anyhow!("missing manifest path"))?;
    Manifest::load(path).with_context(|| format!("failed to load {path}"))
}

fn check(args: &ArgMatches) -> Result<()> {
    let manifest = load(args)?;
    let report = manifest.validate().context("manifest is invalid")?;

    println!("{} bean(s), duplicates: {:?}", report.beans.len(), manifest.context.duplicates);
    for (name, type_handle, scope) in &report.beans {
        println!("  {name:<24} {type_handle:<24} {scope}");
    }
    for name in &report.duplicates {
        println!("  warning: '{name}' is declared more than once; the last declaration wins");
    }
    println!("manifest ok");
    Ok(())
}

fn show(args: &ArgMatches) -> Result<()> {
    let manifest = load(args)?;
    manifest.validate().context("manifest is invalid")?;

    let registry = DefinitionRegistry::with_policy(manifest.definitions(), manifest.context.duplicates)?;
    let name = args
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("missing bean name"))?;
    let definition = registry.get(name)?;
    let overrides = overrides_from(args)?;
    tracing::debug!(
        "Merging {} field and {} argument override(s) into '{}'",
        overrides.fields().len(),
        overrides.args().len(),
        name
    );
    let effective = merge(definition, &overrides);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&definition_json(&effective))?);
    } else {
        print!("{}", definition_text(&effective));
    }
    Ok(())
}

fn overrides_from(args: &ArgMatches) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    for raw in args.get_many::<String>("arg").into_iter().flatten() {
        let (slot, value) = split_assignment(raw)?;
        let slot: usize = slot
            .parse()
            .with_context(|| format!("argument slot '{slot}' is not a number"))?;
        overrides = overrides.arg(slot, parse_value(value));
    }
    for raw in args.get_many::<String>("field").into_iter().flatten() {
        let (field, value) = split_assignment(raw)?;
        overrides = overrides.field(field, parse_value(value));
    }
    Ok(overrides)
}

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))
}

/// JSON literal if it parses as one, plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw).map_or_else(|_| Value::from(raw), Value::from)
}

fn definition_json(definition: &BeanDefinition) -> serde_json::Value {
    let to_json = |v: &Value| v.to_json().unwrap_or(serde_json::Value::Null);
    serde_json::json!({
        "name": definition.name(),
        "type": definition.type_handle(),
        "scope": definition.scope(),
        "init": definition.init_method(),
        "args": definition.constructor_args().iter().map(to_json).collect::<Vec<_>>(),
        "fields": definition
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), to_json(v)))
            .collect::<serde_json::Map<_, _>>(),
    })
}

fn definition_text(definition: &BeanDefinition) -> String {
    let mut out = format!(
        "name:  {}\ntype:  {}\nscope: {}\ninit:  {}\n",
        definition.name(),
        definition.type_handle(),
        definition.scope(),
        definition.init_method().unwrap_or("-"),
    );
    out.push_str("args:\n");
    for (slot, value) in definition.constructor_args().iter().enumerate() {
        out.push_str(&format!("  [{slot}] {value}\n"));
    }
    out.push_str("fields:\n");
    for (field, value) in definition.fields() {
        out.push_str(&format!("  {field} = {value}\n"));
    }
    out
}
