//! Fallback content
//!
//! Static records served when the CMS is unconfigured, unreachable, or
//! (by policy) empty. They satisfy the same contracts as transformed data:
//! non-empty titles and slugs, absolute https image URLs.

use crate::models::{
	BlogPost, BusinessGoal, Feature, ImageAsset, Machine, ProductType, Slugged, Spec, Technology,
	TechnologySection, Testimonial,
};
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;

/// Where fallback images are served from
pub const FALLBACK_IMAGE_BASE: &str = "https://assets.vendsite.example/fallback";

/// View-models with static substitute records
pub trait Fallback: Clone + Sized + 'static {
	fn records() -> &'static [Self];

	fn fallback_all() -> Vec<Self> {
		Self::records().to_vec()
	}
}

/// First record matching any candidate slug, in candidate order
pub fn find_by_slug<T: Fallback + Slugged>(candidates: &[String]) -> Option<T> {
	candidates
		.iter()
		.find_map(|candidate| T::records().iter().find(|r| r.slug() == candidate.as_str()))
		.cloned()
}

fn image(file: &str, alt: &str) -> Option<ImageAsset> {
	Some(ImageAsset {
		id: None,
		url: format!("{}/{}", FALLBACK_IMAGE_BASE, file),
		alt: alt.to_string(),
		width: Some(1200),
		height: Some(800),
	})
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| s.to_string()).collect()
}

fn feature(title: &str, description: &str, icon: &str) -> Feature {
	Feature {
		id: None,
		title: title.to_string(),
		description: description.to_string(),
		icon: Some(icon.to_string()),
	}
}

fn spec(label: &str, value: &str) -> Spec {
	Spec {
		label: label.to_string(),
		value: value.to_string(),
	}
}

static BUSINESS_GOALS: Lazy<Vec<BusinessGoal>> = Lazy::new(|| {
	vec![
		BusinessGoal {
			id: "fallback-expand-footprint".to_string(),
			slug: "expand-footprint".to_string(),
			title: "Expand Your Footprint".to_string(),
			short_description: "Add locations without adding staff.".to_string(),
			description: "Remote monitoring and route planning let a small team serve more \
			              sites, so growth is limited by demand rather than headcount."
				.to_string(),
			icon: Some("map".to_string()),
			image: image("expand-footprint.jpg", "Vending machines across several locations"),
			benefits: strings(&[
				"Serve more locations with the same team",
				"Plan routes from live stock levels",
				"Open new sites in days, not weeks",
			]),
			features: vec![
				feature("Remote monitoring", "Stock and health of every machine in one dashboard.", "activity"),
				feature("Route optimization", "Visit only the machines that need restocking.", "truck"),
			],
			recommended_machines: strings(&["smart-fridge-500", "combo-unit"]),
			display_order: 1,
			visible: true,
		},
		BusinessGoal {
			id: "fallback-reduce-costs".to_string(),
			slug: "reduce-costs".to_string(),
			title: "Reduce Operating Costs".to_string(),
			short_description: "Fewer wasted trips, less spoilage.".to_string(),
			description: "Telemetry tells drivers what to bring before they leave the \
			              warehouse, and temperature alerts catch failures before stock spoils."
				.to_string(),
			icon: Some("piggy-bank".to_string()),
			image: image("reduce-costs.jpg", "Technician restocking a machine"),
			benefits: strings(&["Fewer service visits", "Less expired inventory"]),
			features: vec![feature(
				"Temperature alerts",
				"Get notified the moment a cooler drifts out of range.",
				"thermometer",
			)],
			recommended_machines: strings(&["combo-unit"]),
			display_order: 2,
			visible: true,
		},
		BusinessGoal {
			id: "fallback-employee-satisfaction".to_string(),
			slug: "employee-satisfaction".to_string(),
			title: "Improve Employee Satisfaction".to_string(),
			short_description: "Fresh food and drinks, around the clock.".to_string(),
			description: "Give every shift access to healthy meals and snacks with \
			              cashless checkout and no line at the cafeteria."
				.to_string(),
			icon: Some("smile".to_string()),
			image: image("employee-satisfaction.jpg", "Employees at a break-room micro market"),
			benefits: strings(&["24/7 access", "Healthy options", "Cashless checkout"]),
			features: vec![feature(
				"Fresh food",
				"Refrigerated machines stocked with meals and salads.",
				"coffee",
			)],
			recommended_machines: strings(&["smart-fridge-500"]),
			display_order: 3,
			visible: true,
		},
	]
});

static MACHINES: Lazy<Vec<Machine>> = Lazy::new(|| {
	vec![
		Machine {
			id: "fallback-smart-fridge-500".to_string(),
			slug: "smart-fridge-500".to_string(),
			title: "Smart Fridge 500".to_string(),
			kind: "smart-fridge".to_string(),
			temperature: Some("Refrigerated".to_string()),
			description: "Tap a card, open the door, take what you want. Weight sensors \
			              charge for exactly what leaves the shelf."
				.to_string(),
			images: image("smart-fridge-500.jpg", "Smart Fridge 500").into_iter().collect(),
			specs: vec![
				spec("Capacity", "500 items"),
				spec("Dimensions", "39 x 35 x 80 in"),
				spec("Payments", "Card, mobile wallet"),
			],
			features: strings(&["Weight-sensing shelves", "Remote temperature monitoring"]),
			display_order: 1,
			featured: true,
			visible: true,
		},
		Machine {
			id: "fallback-combo-unit".to_string(),
			slug: "combo-unit".to_string(),
			title: "Combo Snack & Beverage".to_string(),
			kind: "combo".to_string(),
			temperature: Some("Ambient and chilled".to_string()),
			description: "Snacks and cold drinks in a single cabinet for sites with \
			              limited floor space."
				.to_string(),
			images: image("combo-unit.jpg", "Combo snack and beverage machine").into_iter().collect(),
			specs: vec![spec("Capacity", "400 items"), spec("Selections", "30")],
			features: strings(&["Cashless reader", "LED lighting"]),
			display_order: 2,
			featured: true,
			visible: true,
		},
		Machine {
			id: "fallback-classic-snack".to_string(),
			slug: "classic-snack".to_string(),
			title: "Classic Snack".to_string(),
			kind: "snack".to_string(),
			temperature: Some("Ambient".to_string()),
			description: "A dependable spiral snack machine with a cashless upgrade.".to_string(),
			images: image("classic-snack.jpg", "Classic snack machine").into_iter().collect(),
			specs: vec![spec("Capacity", "600 items")],
			features: strings(&["Cashless reader"]),
			display_order: 3,
			featured: false,
			visible: true,
		},
		Machine {
			id: "fallback-cold-beverage".to_string(),
			slug: "cold-beverage".to_string(),
			title: "Cold Beverage".to_string(),
			kind: "beverage".to_string(),
			temperature: Some("Chilled".to_string()),
			description: "Glass-front cooler for bottles and cans.".to_string(),
			images: image("cold-beverage.jpg", "Cold beverage machine").into_iter().collect(),
			specs: vec![spec("Capacity", "350 bottles")],
			features: strings(&["Energy-saving mode"]),
			display_order: 4,
			featured: false,
			visible: true,
		},
	]
});

static PRODUCT_TYPES: Lazy<Vec<ProductType>> = Lazy::new(|| {
	vec![
		ProductType {
			id: "fallback-snacks-beverages".to_string(),
			slug: "snacks-and-beverages".to_string(),
			title: "Snacks & Beverages".to_string(),
			description: "Classic vending for offices, schools and warehouses.".to_string(),
			image: image("snacks-and-beverages.jpg", "Snacks and beverages"),
			benefits: strings(&["Zero upfront cost", "Full-service restocking"]),
			features: vec![feature("Local favorites", "Stocked to match what your team buys.", "star")],
			recommended_machine_type: Some("combo".to_string()),
			display_order: 1,
			visible: true,
		},
		ProductType {
			id: "fallback-fresh-food".to_string(),
			slug: "fresh-food".to_string(),
			title: "Fresh Food".to_string(),
			description: "Salads, sandwiches and meals delivered daily.".to_string(),
			image: image("fresh-food.jpg", "Fresh food in a smart fridge"),
			benefits: strings(&["Healthy choices", "Daily rotation"]),
			features: vec![feature("Daily delivery", "Fresh stock every morning.", "sunrise")],
			recommended_machine_type: Some("smart-fridge".to_string()),
			display_order: 2,
			visible: true,
		},
		ProductType {
			id: "fallback-micro-markets".to_string(),
			slug: "micro-markets".to_string(),
			title: "Micro Markets".to_string(),
			description: "Open shelving and self-checkout kiosks for larger sites.".to_string(),
			image: image("micro-markets.jpg", "Micro market with self-checkout"),
			benefits: strings(&["Hundreds of products", "Self-checkout"]),
			features: vec![feature("Self-checkout", "Scan, pay and go.", "shopping-cart")],
			recommended_machine_type: None,
			display_order: 3,
			visible: true,
		},
	]
});

static BLOG_POSTS: Lazy<Vec<BlogPost>> = Lazy::new(|| {
	vec![
		BlogPost {
			id: "fallback-smart-fridges".to_string(),
			slug: "why-smart-fridges".to_string(),
			title: "Why Smart Fridges Are Replacing Break-Room Vending".to_string(),
			excerpt: "Open-door fridges sell more, spoil less and need fewer visits.".to_string(),
			body_html: "<p>Open-door fridges sell more, spoil less and need fewer visits.</p>"
				.to_string(),
			body_text: "Open-door fridges sell more, spoil less and need fewer visits.".to_string(),
			reading_minutes: 1,
			featured_image: image("blog-smart-fridges.jpg", "Smart fridge in a break room"),
			published_at: Utc.with_ymd_and_hms(2024, 5, 14, 0, 0, 0).single(),
			author: Some("Vendsite Team".to_string()),
			tags: strings(&["smart-fridge", "break-room"]),
		},
		BlogPost {
			id: "fallback-cashless".to_string(),
			slug: "going-cashless".to_string(),
			title: "Going Cashless: What Operators Should Know".to_string(),
			excerpt: "Card and mobile payments now make up most vending sales.".to_string(),
			body_html: "<p>Card and mobile payments now make up most vending sales.</p>".to_string(),
			body_text: "Card and mobile payments now make up most vending sales.".to_string(),
			reading_minutes: 1,
			featured_image: image("blog-cashless.jpg", "Customer tapping a card reader"),
			published_at: Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).single(),
			author: Some("Vendsite Team".to_string()),
			tags: strings(&["payments"]),
		},
	]
});

static TESTIMONIALS: Lazy<Vec<Testimonial>> = Lazy::new(|| {
	vec![
		Testimonial {
			id: "fallback-testimonial-1".to_string(),
			name: "Maria Gonzales".to_string(),
			title: Some("Facilities Manager".to_string()),
			company: Some("Northside Logistics".to_string()),
			quote: "Our night shift finally has real food. Setup took one afternoon.".to_string(),
			rating: 5,
			image: None,
			featured: true,
			visible: true,
		},
		Testimonial {
			id: "fallback-testimonial-2".to_string(),
			name: "James Okafor".to_string(),
			title: Some("Office Manager".to_string()),
			company: Some("Brightline Dental".to_string()),
			quote: "The machines are always stocked and we never have to call anyone.".to_string(),
			rating: 5,
			image: None,
			featured: false,
			visible: true,
		},
		Testimonial {
			id: "fallback-testimonial-3".to_string(),
			name: "Priya Shah".to_string(),
			title: Some("Operations Lead".to_string()),
			company: Some("Harbor Fitness".to_string()),
			quote: "Members love the protein shakes in the smart fridge.".to_string(),
			rating: 4,
			image: None,
			featured: false,
			visible: true,
		},
	]
});

static TECHNOLOGIES: Lazy<Vec<Technology>> = Lazy::new(|| {
	vec![
		Technology {
			id: "fallback-telemetry".to_string(),
			slug: "telemetry".to_string(),
			title: "Telemetry".to_string(),
			description: "Every machine reports stock, sales and health in real time.".to_string(),
			image: image("telemetry.jpg", "Telemetry dashboard"),
			sections: vec![TechnologySection {
				title: "Live stock levels".to_string(),
				description: "Know what sold and what to bring before the truck leaves.".to_string(),
				image: None,
				bullets: strings(&["Per-slot counts", "Sales by hour"]),
			}],
			display_order: 1,
			visible: true,
		},
		Technology {
			id: "fallback-cashless-payments".to_string(),
			slug: "cashless-payments".to_string(),
			title: "Cashless Payments".to_string(),
			description: "Card, mobile wallet and campus card readers on every machine.".to_string(),
			image: image("cashless-payments.jpg", "Card reader on a vending machine"),
			sections: vec![TechnologySection {
				title: "Accepted payments".to_string(),
				description: "All major cards and mobile wallets.".to_string(),
				image: None,
				bullets: strings(&["Tap to pay", "Mobile wallets", "Campus cards"]),
			}],
			display_order: 2,
			visible: true,
		},
	]
});

macro_rules! fallback_records {
	($($model:ty => $records:ident),* $(,)?) => {
		$(
			impl Fallback for $model {
				fn records() -> &'static [Self] {
					$records.as_slice()
				}
			}
		)*
	};
}

fallback_records!(
	BusinessGoal => BUSINESS_GOALS,
	Machine => MACHINES,
	ProductType => PRODUCT_TYPES,
	BlogPost => BLOG_POSTS,
	Testimonial => TESTIMONIALS,
	Technology => TECHNOLOGIES,
);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::slugs::SlugResolver;
	use rstest::rstest;

	fn assert_image(image: &Option<ImageAsset>) {
		if let Some(image) = image {
			assert!(image.url.starts_with("https://"), "{}", image.url);
			assert!(!image.alt.is_empty());
		}
	}

	#[rstest]
	fn test_records_satisfy_view_model_contracts() {
		for goal in BusinessGoal::records() {
			assert!(!goal.title.is_empty() && !goal.slug.is_empty());
			assert_image(&goal.image);
		}
		for machine in Machine::records() {
			assert!(!machine.title.is_empty() && !machine.slug.is_empty());
			machine.images.iter().for_each(|i| assert_image(&Some(i.clone())));
		}
		for product in ProductType::records() {
			assert!(!product.title.is_empty() && !product.slug.is_empty());
			assert_image(&product.image);
		}
		for post in BlogPost::records() {
			assert!(!post.title.is_empty() && !post.slug.is_empty());
			assert_image(&post.featured_image);
		}
		for technology in Technology::records() {
			assert!(!technology.title.is_empty() && !technology.slug.is_empty());
			assert_image(&technology.image);
		}
		for testimonial in Testimonial::records() {
			assert!((1..=5).contains(&testimonial.rating));
		}
	}

	#[rstest]
	fn test_slugs_are_canonical() {
		let resolver = SlugResolver::default();

		for goal in BusinessGoal::records() {
			assert_eq!(resolver.resolve(&goal.slug), goal.slug);
		}
	}

	#[rstest]
	fn test_find_by_slug_goes_through_candidates() {
		let resolver = SlugResolver::default();

		let goal: BusinessGoal =
			find_by_slug(&resolver.candidates("expand-footprint-scalability")).unwrap();
		let missing: Option<Machine> = find_by_slug(&resolver.candidates("no-such-machine"));

		assert_eq!(goal.slug, "expand-footprint");
		assert!(missing.is_none());
	}
}
