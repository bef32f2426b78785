#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "fbxdoc", about = "FBX scene inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// File header, settings and element counts.
	Info(cmd::info::Args),
	/// Raw document tree.
	Dom(cmd::dom::Args),
	/// Node hierarchy with transforms.
	Nodes(cmd::nodes::Args),
	/// Elements by type.
	Elements(cmd::elements::Args),
	/// Properties of one element.
	Props(cmd::props::Args),
	/// Node transforms posed at a point in time.
	Eval(cmd::eval::Args),
	/// Geometry cache channels and samples.
	Cache(cmd::cache::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> fbxdoc::fbx::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Dom(args) => cmd::dom::run(args),
		Commands::Nodes(args) => cmd::nodes::run(args),
		Commands::Elements(args) => cmd::elements::run(args),
		Commands::Props(args) => cmd::props::run(args),
		Commands::Eval(args) => cmd::eval::run(args),
		Commands::Cache(args) => cmd::cache::run(args),
	}
}
