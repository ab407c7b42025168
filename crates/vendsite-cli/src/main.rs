//! vendsite CLI
//!
//! Inspect what the site would render: test the Contentful connection,
//! list and look up content, and show how slugs are resolved. Every
//! command reports whether its data came from the CMS or from fallback
//! content.
//!
//! ## Usage
//!
//! ```bash
//! vendsite check
//! vendsite goals
//! vendsite goal expand-footprint-scalability
//! vendsite machines --featured
//! vendsite --json post going-cashless
//! vendsite -vv resolve footprint-expansion
//! ```

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use output::Output;
use std::process;
use tracing_subscriber::EnvFilter;
use vendsite_conf::ContentfulSettings;
use vendsite_content::{ContentError, ContentRepository};
use vendsite_contentful::ClientHandle;

/// Exit code for content that does not exist
const EXIT_NOT_FOUND: i32 = 2;

/// Exit code for every other failure
const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "vendsite")]
#[command(about = "Inspect the vendsite content layer", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Print machine-readable JSON
	#[arg(long, global = true)]
	json: bool,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Test the Contentful connection and print the report
	Check,

	/// List business goals
	Goals,

	/// Show one business goal
	Goal {
		#[arg(value_name = "SLUG")]
		slug: String,
	},

	/// List machines
	Machines {
		/// Only featured machines
		#[arg(long)]
		featured: bool,

		/// Only machines of this kind, e.g. smart-fridge
		#[arg(long, value_name = "KIND")]
		kind: Option<String>,
	},

	/// Show one machine
	Machine {
		#[arg(value_name = "SLUG")]
		slug: String,
	},

	/// List product types
	Products,

	/// Show one product type
	Product {
		#[arg(value_name = "SLUG")]
		slug: String,
	},

	/// List blog posts, newest first
	Posts,

	/// Show one blog post
	Post {
		#[arg(value_name = "SLUG")]
		slug: String,
	},

	/// List testimonials
	Testimonials,

	/// List technology pages
	Technologies,

	/// Show one technology page
	Technology {
		#[arg(value_name = "SLUG")]
		slug: String,
	},

	/// Print the lookup plan for a slug
	Resolve {
		#[arg(value_name = "SLUG")]
		slug: String,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	if let Err(e) = run(cli).await {
		eprintln!("{} {:#}", "Error:".red(), e);
		process::exit(exit_code(&e));
	}
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from `warn`
fn init_tracing(verbosity: u8) {
	let default_level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"vendsite_conf={lvl},vendsite_contentful={lvl},vendsite_content={lvl},vendsite={lvl}",
			lvl = default_level
		))
	});
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn exit_code(error: &anyhow::Error) -> i32 {
	match error.downcast_ref::<ContentError>() {
		Some(e) if e.is_not_found() => EXIT_NOT_FOUND,
		_ => EXIT_FAILURE,
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let settings = ContentfulSettings::load().context("failed to load Contentful settings")?;
	let handle = ClientHandle::new(settings);
	let repository = ContentRepository::new(handle.clone());
	let out = Output::new(cli.json);
	tracing::debug!(command = ?cli.command, configured = handle.is_configured(), "running command");

	match cli.command {
		Commands::Check => {
			let summary = handle.settings().summary();
			let report = handle.test_connection().await;
			out.check(&summary, &report, handle.state().warning().as_ref())?;
			if !report.success {
				anyhow::bail!("connection test failed");
			}
		}
		Commands::Goals => out.list(&repository.business_goals().await?)?,
		Commands::Goal { slug } => out.item(&repository.business_goal(&slug).await?)?,
		Commands::Machines { featured, kind } => {
			let machines = match (featured, kind) {
				(_, Some(kind)) => {
					let mut outcome = repository.machines_by_type(&kind).await?;
					if featured {
						outcome.data.retain(|m| m.featured);
					}
					outcome
				}
				(true, None) => repository.featured_machines().await?,
				(false, None) => repository.machines().await?,
			};
			out.list(&machines)?;
		}
		Commands::Machine { slug } => out.item(&repository.machine(&slug).await?)?,
		Commands::Products => out.list(&repository.product_types().await?)?,
		Commands::Product { slug } => out.item(&repository.product_type(&slug).await?)?,
		Commands::Posts => out.list(&repository.blog_posts().await?)?,
		Commands::Post { slug } => out.item(&repository.blog_post(&slug).await?)?,
		Commands::Testimonials => out.list(&repository.testimonials().await?)?,
		Commands::Technologies => out.list(&repository.technologies().await?)?,
		Commands::Technology { slug } => out.item(&repository.technology(&slug).await?)?,
		Commands::Resolve { slug } => out.resolution(&slug, repository.resolver())?,
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_machines_filters() {
		let cli = Cli::parse_from(["vendsite", "--json", "machines", "--featured", "--kind", "combo"]);

		assert!(cli.json);
		match cli.command {
			Commands::Machines { featured, kind } => {
				assert!(featured);
				assert_eq!(kind.as_deref(), Some("combo"));
			}
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[rstest]
	fn test_verbosity_is_counted_after_subcommand() {
		let cli = Cli::parse_from(["vendsite", "goal", "expand-footprint", "-vv"]);

		assert_eq!(cli.verbosity, 2);
		assert!(matches!(cli.command, Commands::Goal { ref slug } if slug == "expand-footprint"));
	}

	#[rstest]
	fn test_slug_argument_is_required() {
		assert!(Cli::try_parse_from(["vendsite", "machine"]).is_err());
	}

	#[rstest]
	#[case(ContentError::NotFound { content_type: "machine", slug: "x".into(), tried: vec!["x".into()] }, EXIT_NOT_FOUND)]
	#[case(ContentError::Unavailable("timeout".into()), EXIT_FAILURE)]
	#[case(ContentError::Configuration("missing token".into()), EXIT_FAILURE)]
	fn test_exit_code(#[case] error: ContentError, #[case] expected: i32) {
		assert_eq!(exit_code(&anyhow::Error::new(error)), expected);
	}

	#[rstest]
	fn test_other_errors_exit_with_failure() {
		assert_eq!(exit_code(&anyhow::anyhow!("connection test failed")), EXIT_FAILURE);
	}
}
