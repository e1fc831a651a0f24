use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use fixture_tree::fs_op::stat;
use fixture_tree::{DirArgs, FileArgs, FixtureConfig, RootFixture};

/// Build a small example project tree under the temp directory, show what
/// was created, then remove it again.
#[derive(Debug, Parser)]
#[command(name = "fixture-demo", version)]
struct Cli {
    /// Prefix for the generated directory name.
    #[arg(long, default_value = "example-project")]
    prefix: String,

    /// Leave the tree on disk instead of removing it.
    #[arg(long)]
    keep: bool,

    /// Log each created entry.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();

    let mut root = RootFixture::new(cli.prefix.as_str()).with_config(FixtureConfig {
        keep_on_drop: cli.keep,
    });

    let config = root.add_file(
        "config.json",
        FileArgs::new().content(r#"{"app": "example", "version": "1.0"}"#),
    );

    let app = root.add_repo("myapp", DirArgs::new());
    let src = root.within(app).add_dir("src", DirArgs::new());
    let main_rs = root.within(src).add_file(
        "main.rs",
        FileArgs::new().content("fn main() {\n    println!(\"Hello from the fixture demo!\");\n}\n"),
    );
    let util_rs = root.within(src).add_file(
        "util.rs",
        FileArgs::new().content("pub fn helper() -> &'static str {\n    \"utility function\"\n}\n"),
    );
    let tests = root.within(app).add_dir("tests", DirArgs::new());
    root.within(tests).add_file(
        "smoke.rs",
        FileArgs::new().content_fn(|ff| format!("// generated for {}\n", ff.relative_path().display())),
    );

    root.create().context("failed to create fixture tree")?;

    println!("Created temporary test structure:");
    println!("  Root directory: {}", root.dir().display());
    println!("  Repository marker: {}", root[app].git_path().display());
    println!("  Files created:");
    for id in [config, main_rs, util_rs] {
        println!("    - {}", root[id].path().display());
    }

    println!("  Verifying files exist:");
    let git = root[app].git_path();
    let mark = if stat::is_dir(&git) { "ok" } else { "MISSING" };
    println!("    [{mark}] {}", git.display());
    for id in [config, main_rs, util_rs] {
        let path = root[id].path();
        let mark = if stat::is_file(path) { "ok" } else { "MISSING" };
        println!("    [{mark}] {}", path.display());
    }

    let content = fs::read_to_string(root[main_rs].path())
        .with_context(|| format!("failed to read {}", root[main_rs].path().display()))?;
    println!("  Content of main.rs:");
    for line in content.lines() {
        println!("    {line}");
    }

    println!("  Manifest:");
    for entry in root.manifest().context("failed to list fixture tree")? {
        println!("    {}", entry.display());
    }

    if cli.keep {
        println!("Kept {}", root.dir().display());
    } else {
        let dir = root.dir().to_path_buf();
        root.cleanup();
        if stat::exists(&dir) {
            anyhow::bail!("failed to remove {}", dir.display());
        }
        println!("Removed {}", dir.display());
    }
    Ok(())
}
