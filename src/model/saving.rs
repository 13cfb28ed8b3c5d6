use crate::model::Amount;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// The icon a saving plan is shown with. Unknown names fall back to `Savings`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SavingIcon {
    Laptop,
    Flight,
    Shield,
    Home,
    Car,
    ShoppingBag,
    School,
    Work,
    Favorite,
    Celebration,
    #[default]
    Savings,
}

serde_plain::derive_display_from_serialize!(SavingIcon);

impl SavingIcon {
    const ALL: [SavingIcon; 11] = [
        SavingIcon::Laptop,
        SavingIcon::Flight,
        SavingIcon::Shield,
        SavingIcon::Home,
        SavingIcon::Car,
        SavingIcon::ShoppingBag,
        SavingIcon::School,
        SavingIcon::Work,
        SavingIcon::Favorite,
        SavingIcon::Celebration,
        SavingIcon::Savings,
    ];

    /// Looks up an icon by name, ignoring case, `-`/`_` differences and the legacy
    /// `DirectionsCar` spelling.
    pub fn from_name(name: &str) -> Self {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        if wanted == "directionscar" {
            return SavingIcon::Car;
        }
        Self::ALL
            .into_iter()
            .find(|icon| icon.to_string().replace('_', "") == wanted)
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for SavingIcon {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SavingIcon::from_name(&s))
    }
}

/// A named savings target fed by transfers from the main balance.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SavingPlan {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) target: Amount,
    pub(crate) current: Amount,
    /// Where the money is physically kept, e.g. a bank or an e-wallet.
    pub(crate) location: String,
    pub(crate) icon: SavingIcon,
}

impl SavingPlan {
    /// Creates an empty plan with a freshly generated ID.
    pub fn new(
        name: impl Into<String>,
        target: Amount,
        location: impl Into<String>,
        icon: SavingIcon,
    ) -> Self {
        Self {
            id: crate::utils::generate_id(),
            name: name.into(),
            target,
            current: Amount::ZERO,
            location: location.into(),
            icon,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn current(&self) -> Amount {
        self.current
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn icon(&self) -> SavingIcon {
        self.icon
    }

    /// Fraction of the target reached, clamped to `[0, 1]`. Zero when there is no target.
    pub fn progress(&self) -> f64 {
        self.current.ratio_of(self.target).clamp(0.0, 1.0)
    }

    pub fn is_reached(&self) -> bool {
        self.current >= self.target
    }
}

/// A saving plan together with its derived progress values, used for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingView {
    #[serde(flatten)]
    pub plan: SavingPlan,
    pub progress: f64,
    pub reached: bool,
}

impl From<SavingPlan> for SavingView {
    fn from(plan: SavingPlan) -> Self {
        Self {
            progress: plan.progress(),
            reached: plan.is_reached(),
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(target: i64, current: i64) -> SavingPlan {
        let mut p = SavingPlan::new("Laptop baru", Amount::new(target), "Bank", SavingIcon::Laptop);
        p.current = Amount::new(current);
        p
    }

    #[test]
    fn test_new_plan_is_empty() {
        let p = SavingPlan::new("Liburan", Amount::new(5_000_000), "Dompet", SavingIcon::Flight);
        assert!(p.current().is_zero());
        assert!(!p.id().is_empty());
        assert!(!p.is_reached());
    }

    #[test]
    fn test_progress() {
        assert_eq!(plan(1_000_000, 250_000).progress(), 0.25);
        assert_eq!(plan(1_000_000, 3_000_000).progress(), 1.0);
        assert_eq!(plan(0, 10).progress(), 0.0);
    }

    #[test]
    fn test_reached() {
        assert!(plan(100, 100).is_reached());
        assert!(!plan(100, 99).is_reached());
    }

    #[test]
    fn test_icon_from_name() {
        assert_eq!(SavingIcon::from_name("ShoppingBag"), SavingIcon::ShoppingBag);
        assert_eq!(SavingIcon::from_name("shopping_bag"), SavingIcon::ShoppingBag);
        assert_eq!(SavingIcon::from_name("DirectionsCar"), SavingIcon::Car);
        assert_eq!(SavingIcon::from_name("rocket"), SavingIcon::Savings);
    }

    #[test]
    fn test_icon_deserialize_unknown() {
        let icon: SavingIcon = serde_json::from_str("\"Celebration\"").unwrap();
        assert_eq!(icon, SavingIcon::Celebration);
        let icon: SavingIcon = serde_json::from_str("\"unicorn\"").unwrap();
        assert_eq!(icon, SavingIcon::Savings);
    }
}
