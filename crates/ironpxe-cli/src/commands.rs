use ironpxe_compose::{Composer, MergePolicy, PathKeys, RewriteObserver};
use ironpxe_server::{default_path_keys, IronpxeServer, ServerConfig};

use crate::cli::{Cli, Command, ComposeArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Compose(args) => cmd_compose(args, cli.verbose),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        bind_addr: args.bind,
        config_dir: args.config_dir,
        image_dir: args.image_dir,
        ..ServerConfig::default()
    };
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(IronpxeServer::new(config).serve())?;
    Ok(())
}

/// Prints each file-reference rewrite to stderr, keeping stdout clean for
/// the composed document.
struct StderrObserver;

impl RewriteObserver for StderrObserver {
    fn rewrote(&self, layer: &str, context_path: &str, from: &str, to: &str) {
        eprintln!("{layer}: {context_path}: {from} -> {to}");
    }
}

fn cmd_compose(args: ComposeArgs, verbose: bool) -> anyhow::Result<()> {
    let mut keys = args.path_keys;
    if args.default_path_keys {
        keys.extend(default_path_keys());
    }

    let mut composer = Composer::new(args.base_dir)
        .with_policy(MergePolicy {
            overwrite: args.overwrite,
            append: args.append,
        })
        .with_path_keys(PathKeys::new(keys));
    if verbose {
        composer = composer.with_observer(Box::new(StderrObserver));
    }

    let document = composer.compose(&args.layers)?;
    print!("{document}");
    Ok(())
}
