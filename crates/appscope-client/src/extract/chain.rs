//! Ordered, per-field strategy chains.
//!
//! Every output field owns a [`FieldChain`]: a list of independent
//! [`Strategy`] objects tried in order. The first one that yields a present
//! value wins and the rest are skipped, so a record can mix values drawn
//! from different tiers.

use std::fmt;

use super::context::ExtractionContext;

/// Where a strategy reads its value from, in descending order of trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Embedded JSON-LD metadata.
    Structured,
    /// Accessibility attributes such as `aria-label`.
    Accessibility,
    /// Class- or attribute-tagged DOM nodes.
    Markup,
    /// Regular expressions over page text or script payloads.
    Pattern,
    /// Generic `<meta>` / `<link>` page metadata.
    Meta,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Structured => "structured",
            Tier::Accessibility => "accessibility",
            Tier::Markup => "markup",
            Tier::Pattern => "pattern",
            Tier::Meta => "meta",
        };
        write!(f, "{s}")
    }
}

/// Output fields resolved through a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Identifier,
    Title,
    Icon,
    Developer,
    DeveloperEmail,
    DeveloperWebsite,
    Category,
    Rating,
    RatingCount,
    Installs,
    LastUpdated,
    CurrentVersion,
    MinPlatformVersion,
    Summary,
    Description,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::Title => "title",
            Field::Icon => "icon",
            Field::Developer => "developer",
            Field::DeveloperEmail => "developer_email",
            Field::DeveloperWebsite => "developer_website",
            Field::Category => "category",
            Field::Rating => "rating",
            Field::RatingCount => "rating_count",
            Field::Installs => "installs",
            Field::LastUpdated => "last_updated",
            Field::CurrentVersion => "current_version",
            Field::MinPlatformVersion => "min_platform_version",
            Field::Summary => "summary",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value a strategy may produce. Strategies returning an absent-looking
/// value (blank text, zero) are treated as having missed.
pub trait FieldValue {
    fn is_present(&self) -> bool;
}

impl FieldValue for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl FieldValue for f64 {
    fn is_present(&self) -> bool {
        self.is_finite() && *self > 0.0
    }
}

impl FieldValue for u64 {
    fn is_present(&self) -> bool {
        *self > 0
    }
}

/// One way of resolving a field from a document.
pub trait Strategy<T>: Send + Sync {
    fn tier(&self) -> Tier;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn attempt(&self, ctx: &ExtractionContext<'_>) -> Option<T>;
}

/// A [`Strategy`] backed by a plain function.
pub struct FnStrategy<T> {
    tier: Tier,
    name: &'static str,
    resolve: fn(&ExtractionContext<'_>) -> Option<T>,
}

impl<T> FnStrategy<T> {
    pub fn new(
        tier: Tier,
        name: &'static str,
        resolve: fn(&ExtractionContext<'_>) -> Option<T>,
    ) -> Self {
        Self {
            tier,
            name,
            resolve,
        }
    }
}

impl<T> Strategy<T> for FnStrategy<T> {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, ctx: &ExtractionContext<'_>) -> Option<T> {
        (self.resolve)(ctx)
    }
}

/// Ordered strategies for a single field.
pub struct FieldChain<T> {
    field: Field,
    strategies: Vec<Box<dyn Strategy<T>>>,
}

impl<T: FieldValue + 'static> FieldChain<T> {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Append a function strategy.
    pub fn then(
        self,
        tier: Tier,
        name: &'static str,
        resolve: fn(&ExtractionContext<'_>) -> Option<T>,
    ) -> Self {
        self.with(FnStrategy::new(tier, name, resolve))
    }

    /// Append any strategy.
    pub fn with(mut self, strategy: impl Strategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Tiers of the registered strategies, in attempt order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.strategies.iter().map(|s| s.tier()).collect()
    }

    /// Run strategies in order and return the first present value.
    pub fn resolve(&self, ctx: &ExtractionContext<'_>) -> Option<T> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.attempt(ctx)
                && value.is_present()
            {
                tracing::trace!(
                    field = %self.field,
                    tier = %strategy.tier(),
                    strategy = strategy.name(),
                    "Field resolved"
                );
                return Some(value);
            }
        }
        tracing::trace!(field = %self.field, "No strategy resolved field");
        None
    }
}
