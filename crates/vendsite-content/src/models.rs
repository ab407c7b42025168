//! View-models
//!
//! Flat, typed shapes the pages render. Every text field is a plain
//! `String` (empty when the CMS had nothing), images are fully resolved
//! https URLs, and nested entries are already transformed.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Content type ids as configured in the CMS
pub mod content_types {
	pub const BUSINESS_GOAL: &str = "businessGoal";
	pub const FEATURE: &str = "feature";
	pub const MACHINE: &str = "machine";
	pub const PRODUCT_TYPE: &str = "productType";
	pub const BLOG_POST: &str = "blogPost";
	pub const TESTIMONIAL: &str = "testimonial";
	pub const TECHNOLOGY: &str = "technology";
	pub const TECHNOLOGY_SECTION: &str = "technologySection";
}

/// View-models addressable by slug
pub trait Slugged {
	fn slug(&self) -> &str;
}

/// View-models shown in lists
pub trait Listed: Sized {
	/// Hidden records are dropped from lists
	fn is_visible(&self) -> bool {
		true
	}

	fn display_order(&self) -> i64 {
		0
	}

	/// Drop hidden records and order the rest for display
	///
	/// The default sort is stable on `display_order`, so records with equal
	/// order keep the order the CMS returned them in.
	fn arrange(mut items: Vec<Self>) -> Vec<Self> {
		items.retain(Self::is_visible);
		items.sort_by_key(Self::display_order);
		items
	}
}

/// A resolved image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
	/// Asset id; `None` for fallback images
	pub id: Option<String>,
	/// Absolute https URL
	pub url: String,
	/// Never empty when the owning record has a title
	pub alt: String,
	pub width: Option<u32>,
	pub height: Option<u32>,
}

/// A feature callout on a business goal or product type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
	pub id: Option<String>,
	pub title: String,
	pub description: String,
	pub icon: Option<String>,
}

/// A business goal landing page (`/business-goals/{slug}`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessGoal {
	pub id: String,
	pub slug: String,
	pub title: String,
	pub short_description: String,
	pub description: String,
	pub icon: Option<String>,
	pub image: Option<ImageAsset>,
	pub benefits: Vec<String>,
	pub features: Vec<Feature>,
	/// Slugs of recommended machines
	pub recommended_machines: Vec<String>,
	pub display_order: i64,
	pub visible: bool,
}

/// A labelled machine specification, e.g. "Capacity: 400 items"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spec {
	pub label: String,
	pub value: String,
}

/// A vending machine model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Machine {
	pub id: String,
	pub slug: String,
	pub title: String,
	/// Machine category, e.g. `snack`, `beverage`, `combo`, `smart-fridge`
	pub kind: String,
	pub temperature: Option<String>,
	pub description: String,
	pub images: Vec<ImageAsset>,
	pub specs: Vec<Spec>,
	pub features: Vec<String>,
	pub display_order: i64,
	pub featured: bool,
	pub visible: bool,
}

impl Machine {
	/// First image, used for cards
	pub fn primary_image(&self) -> Option<&ImageAsset> {
		self.images.first()
	}
}

/// A product category page (`/products/{slug}`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductType {
	pub id: String,
	pub slug: String,
	pub title: String,
	pub description: String,
	pub image: Option<ImageAsset>,
	pub benefits: Vec<String>,
	pub features: Vec<Feature>,
	/// Machine `kind` recommended for this product type
	pub recommended_machine_type: Option<String>,
	pub display_order: i64,
	pub visible: bool,
}

/// A blog article
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPost {
	pub id: String,
	pub slug: String,
	pub title: String,
	/// Explicit excerpt, or the start of the body
	pub excerpt: String,
	pub body_html: String,
	pub body_text: String,
	pub reading_minutes: u32,
	pub featured_image: Option<ImageAsset>,
	pub published_at: Option<DateTime<Utc>>,
	pub author: Option<String>,
	pub tags: Vec<String>,
}

/// A customer quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Testimonial {
	pub id: String,
	pub name: String,
	/// Job title of the person quoted
	pub title: Option<String>,
	pub company: Option<String>,
	pub quote: String,
	/// 1 to 5
	pub rating: u8,
	pub image: Option<ImageAsset>,
	pub featured: bool,
	pub visible: bool,
}

/// One section of a technology page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologySection {
	pub title: String,
	pub description: String,
	pub image: Option<ImageAsset>,
	pub bullets: Vec<String>,
}

/// A technology page (`/technology/{slug}`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Technology {
	pub id: String,
	pub slug: String,
	pub title: String,
	pub description: String,
	pub image: Option<ImageAsset>,
	pub sections: Vec<TechnologySection>,
	pub display_order: i64,
	pub visible: bool,
}

macro_rules! slugged {
	($($model:ty),* $(,)?) => {
		$(
			impl Slugged for $model {
				fn slug(&self) -> &str {
					&self.slug
				}
			}
		)*
	};
}

slugged!(BusinessGoal, Machine, ProductType, BlogPost, Technology);

macro_rules! ordered_listing {
	($($model:ty),* $(,)?) => {
		$(
			impl Listed for $model {
				fn is_visible(&self) -> bool {
					self.visible
				}

				fn display_order(&self) -> i64 {
					self.display_order
				}
			}
		)*
	};
}

ordered_listing!(BusinessGoal, Machine, ProductType, Technology);

impl Listed for Testimonial {
	fn is_visible(&self) -> bool {
		self.visible
	}

	/// Featured quotes first, otherwise CMS order
	fn arrange(mut items: Vec<Self>) -> Vec<Self> {
		items.retain(Self::is_visible);
		items.sort_by_key(|t| !t.featured);
		items
	}
}

impl Listed for BlogPost {
	/// Newest first; undated posts last
	fn arrange(mut items: Vec<Self>) -> Vec<Self> {
		items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
		items
	}
}
