//! Text and JSON rendering for CLI results

use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use vendsite_conf::SettingsSummary;
use vendsite_content::{
	BlogPost, BusinessGoal, DataSource, Machine, ProductType, QueryOutcome, SlugResolver,
	Technology, Testimonial,
};
use vendsite_contentful::{ConnectionReport, ConnectionWarning};

/// Something the CLI can print as a heading plus labelled lines
pub(crate) trait Summary {
	fn headline(&self) -> String;

	fn details(&self) -> Vec<(&'static str, String)> {
		Vec::new()
	}
}

pub(crate) struct Output {
	json: bool,
}

impl Output {
	pub(crate) fn new(json: bool) -> Self {
		Self { json }
	}

	pub(crate) fn list<T: Serialize + Summary>(
		&self,
		outcome: &QueryOutcome<Vec<T>>,
	) -> anyhow::Result<()> {
		if self.json {
			return print_json(outcome);
		}
		println!("{}", source_label(&outcome.source));
		if outcome.data.is_empty() {
			println!("{}", "(nothing to show)".dimmed());
		}
		for item in &outcome.data {
			println!("  {} {}", "-".dimmed(), item.headline());
		}
		Ok(())
	}

	pub(crate) fn item<T: Serialize + Summary>(
		&self,
		outcome: &QueryOutcome<T>,
	) -> anyhow::Result<()> {
		if self.json {
			return print_json(outcome);
		}
		println!("{}", source_label(&outcome.source));
		println!("{}", outcome.data.headline().bold());
		for (label, value) in outcome.data.details() {
			println!("  {:<12} {}", format!("{}:", label).cyan(), value);
		}
		Ok(())
	}

	pub(crate) fn check(
		&self,
		summary: &SettingsSummary,
		report: &ConnectionReport,
		warning: Option<&ConnectionWarning>,
	) -> anyhow::Result<()> {
		if self.json {
			return print_json(&json!({
				"settings": summary,
				"report": report,
				"warning": warning,
			}));
		}

		println!(
			"{} {}",
			"Space:".cyan(),
			summary.space_id.as_deref().unwrap_or("(not set)")
		);
		println!("{} {}", "Environment:".cyan(), summary.environment);
		println!("{} {}", "Host:".cyan(), summary.base_url);
		println!(
			"{} {}",
			"Token:".cyan(),
			if summary.token_present { "present" } else { "missing" }
		);

		let status = if report.success {
			"OK".green()
		} else {
			"FAILED".red()
		};
		match report.latency_ms {
			Some(ms) => println!("{} {} ({} ms)", status, report.message, ms),
			None => println!("{} {}", status, report.message),
		}

		if let Some(warning) = warning {
			println!("{} {}", "Warning:".yellow(), warning.message);
			if let Some(url) = &warning.help_url {
				println!("  {} {}", "See".dimmed(), url);
			}
		}
		Ok(())
	}

	pub(crate) fn resolution(&self, slug: &str, resolver: &SlugResolver) -> anyhow::Result<()> {
		let canonical = resolver.resolve(slug);
		let candidates = resolver.candidates(slug);
		if self.json {
			return print_json(&json!({
				"slug": slug,
				"canonical": canonical,
				"candidates": candidates,
			}));
		}

		println!("{} {}", "Canonical:".cyan(), canonical);
		for (i, candidate) in candidates.iter().enumerate() {
			println!("  {}. {}", i + 1, candidate);
		}
		Ok(())
	}
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn source_label(source: &DataSource) -> String {
	match source {
		DataSource::Cms => format!("{} {}", "source:".dimmed(), "cms".green()),
		DataSource::Fallback(reason) => format!(
			"{} {} ({})",
			"source:".dimmed(),
			"fallback".yellow(),
			reason
		),
	}
}

fn join(values: &[String]) -> String {
	values.join(", ")
}

impl Summary for BusinessGoal {
	fn headline(&self) -> String {
		format!("{} [{}]", self.title, self.slug)
	}

	fn details(&self) -> Vec<(&'static str, String)> {
		let mut lines = vec![("summary", self.short_description.clone())];
		if !self.benefits.is_empty() {
			lines.push(("benefits", join(&self.benefits)));
		}
		if !self.features.is_empty() {
			let titles: Vec<_> = self.features.iter().map(|f| f.title.clone()).collect();
			lines.push(("features", join(&titles)));
		}
		if !self.recommended_machines.is_empty() {
			lines.push(("machines", join(&self.recommended_machines)));
		}
		lines
	}
}

impl Summary for Machine {
	fn headline(&self) -> String {
		let star = if self.featured { " *" } else { "" };
		format!("{} [{}] {}{}", self.title, self.slug, self.kind, star)
	}

	fn details(&self) -> Vec<(&'static str, String)> {
		let mut lines = vec![("kind", self.kind.clone())];
		if let Some(temperature) = &self.temperature {
			lines.push(("temperature", temperature.clone()));
		}
		lines.push(("description", self.description.clone()));
		for spec in &self.specs {
			lines.push(("spec", format!("{}: {}", spec.label, spec.value)));
		}
		if let Some(image) = self.primary_image() {
			lines.push(("image", image.url.clone()));
		}
		lines
	}
}

impl Summary for ProductType {
	fn headline(&self) -> String {
		format!("{} [{}]", self.title, self.slug)
	}

	fn details(&self) -> Vec<(&'static str, String)> {
		let mut lines = vec![("description", self.description.clone())];
		if !self.benefits.is_empty() {
			lines.push(("benefits", join(&self.benefits)));
		}
		if let Some(kind) = &self.recommended_machine_type {
			lines.push(("machines", kind.clone()));
		}
		lines
	}
}

impl Summary for BlogPost {
	fn headline(&self) -> String {
		match self.published_at {
			Some(date) => format!("{} [{}] {}", self.title, self.slug, date.format("%Y-%m-%d")),
			None => format!("{} [{}]", self.title, self.slug),
		}
	}

	fn details(&self) -> Vec<(&'static str, String)> {
		let mut lines = vec![
			("excerpt", self.excerpt.clone()),
			("reading", format!("{} min", self.reading_minutes)),
		];
		if let Some(author) = &self.author {
			lines.push(("author", author.clone()));
		}
		if !self.tags.is_empty() {
			lines.push(("tags", join(&self.tags)));
		}
		lines
	}
}

impl Summary for Testimonial {
	fn headline(&self) -> String {
		let attribution = match &self.company {
			Some(company) => format!("{}, {}", self.name, company),
			None => self.name.clone(),
		};
		format!("\"{}\" ({}) {}/5", self.quote, attribution, self.rating)
	}
}

impl Summary for Technology {
	fn headline(&self) -> String {
		format!("{} [{}]", self.title, self.slug)
	}

	fn details(&self) -> Vec<(&'static str, String)> {
		let mut lines = vec![("description", self.description.clone())];
		for section in &self.sections {
			lines.push(("section", section.title.clone()));
		}
		lines
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use vendsite_content::{Fallback, FallbackReason};

	#[rstest]
	#[case(DataSource::Cms, "source: cms")]
	#[case(DataSource::Fallback(FallbackReason::Unconfigured), "source: fallback (CMS not configured)")]
	#[case(DataSource::Fallback(FallbackReason::Empty), "source: fallback (CMS returned no content)")]
	fn test_source_label(#[case] source: DataSource, #[case] expected: &str) {
		colored::control::set_override(false);

		assert_eq!(source_label(&source), expected);
	}

	#[rstest]
	fn test_machine_headline_marks_featured() {
		let machine = Machine::fallback_all()
			.into_iter()
			.find(|m| m.featured)
			.unwrap();

		let headline = machine.headline();

		assert!(headline.ends_with(" *"));
		assert!(headline.contains(&machine.slug));
	}

	#[rstest]
	fn test_goal_details_list_features() {
		let goal = BusinessGoal::fallback_all().remove(0);

		let details = goal.details();

		assert_eq!(details[0], ("summary", goal.short_description.clone()));
		assert_eq!(
			details.iter().any(|(label, _)| *label == "features"),
			!goal.features.is_empty()
		);
	}
}
